//! Configuration loading
//!
//! Every section and field is optional in the TOML file; anything left out
//! takes the value the shelf view was tuned with.

use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::color::Rgb;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookshelfConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub hover: HoverConfig,
    #[serde(default)]
    pub textures: TextureConfig,
    #[serde(default)]
    pub stage: StageConfig,
}

/// Shelf geometry and book sizing, in world units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub shelf_width: f32,
    pub shelf_height: f32,
    pub shelf_depth: f32,
    pub side_thickness: f32,
    pub plank_thickness: f32,
    pub back_thickness: f32,
    /// Horizontal space between neighbouring shelf columns
    pub column_gap: f32,
    /// Distance from the left interior edge to the first book
    pub leading_inset: f32,
    /// Space kept free at the right interior edge
    pub trailing_inset: f32,
    pub book_gap: f32,
    /// World width per timeframe unit
    pub width_per_unit: f32,
    pub book_height_base: f32,
    pub book_height_jitter: f32,
    pub book_depth_base: f32,
    pub book_depth_jitter: f32,
    /// Maximum lean of a book around the depth axis (radians, either side)
    pub book_tilt: f32,
    /// Filler `[width, height]` presets, cycled in order
    pub filler_presets: Vec<[f32; 2]>,
    pub filler_width_factor: f32,
    pub filler_depth: f32,
    pub filler_tilt: f32,
    pub filler_opacity: f32,
    pub min_fillers: usize,
    /// Fillers wanted on a shelf holding no books; shrinks by one per book
    pub filler_target: usize,
    pub label_width: f32,
    pub label_height: f32,
    pub scene_offset_y: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            shelf_width: 4.5,
            shelf_height: 2.2,
            shelf_depth: 1.2,
            side_thickness: 0.12,
            plank_thickness: 0.1,
            back_thickness: 0.06,
            column_gap: 0.3,
            leading_inset: 0.25,
            trailing_inset: 0.15,
            book_gap: 0.04,
            width_per_unit: 0.012,
            book_height_base: 1.4,
            book_height_jitter: 0.5,
            book_depth_base: 0.85,
            book_depth_jitter: 0.2,
            book_tilt: 0.03,
            filler_presets: default_filler_presets(),
            filler_width_factor: 0.55,
            filler_depth: 0.8,
            filler_tilt: 0.02,
            filler_opacity: 0.15,
            min_fillers: 2,
            filler_target: 5,
            label_width: 1.5,
            label_height: 0.18,
            scene_offset_y: 0.05,
        }
    }
}

fn default_filler_presets() -> Vec<[f32; 2]> {
    vec![
        [0.45, 1.5],
        [0.6, 1.8],
        [0.5, 1.3],
        [0.7, 1.9],
        [0.4, 1.1],
        [0.55, 1.6],
    ]
}

impl LayoutConfig {
    /// Usable width between the leading and trailing insets
    pub fn usable_width(&self) -> f32 {
        self.shelf_width - self.leading_inset - self.trailing_inset
    }
}

/// Orbit camera defaults and limits; angles in radians
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub target: [f32; 3],
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
    /// Radians per pixel of drag
    pub sensitivity: f32,
    pub min_elevation: f32,
    pub max_elevation: f32,
    /// Distance change per wheel pixel
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 35.0,
            near: 0.1,
            far: 100.0,
            target: [0.0, 1.5, 0.0],
            azimuth: 0.65,
            elevation: FRAC_PI_2 - 1.05,
            distance: 14.0,
            sensitivity: 0.005,
            min_elevation: 0.05,
            max_elevation: FRAC_PI_2 - 0.3,
            zoom_speed: 0.01,
            min_distance: 5.0,
            max_distance: 22.0,
        }
    }
}

impl CameraConfig {
    /// Reject limits the orbit math cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("fov_degrees", self.fov_degrees),
            ("near", self.near),
            ("far", self.far),
            ("azimuth", self.azimuth),
            ("elevation", self.elevation),
            ("distance", self.distance),
            ("sensitivity", self.sensitivity),
            ("min_elevation", self.min_elevation),
            ("max_elevation", self.max_elevation),
            ("zoom_speed", self.zoom_speed),
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("camera.{} must be a finite number", name)));
        }
        if self.target.iter().any(|v| !v.is_finite()) {
            return Err(invalid("camera.target must be finite".into()));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid(format!("camera.fov_degrees {} outside (0, 180)", self.fov_degrees)));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(invalid(format!("camera.near {} must be positive and below far {}", self.near, self.far)));
        }
        if self.min_elevation > self.max_elevation {
            return Err(invalid(format!(
                "camera.min_elevation {} exceeds max_elevation {}",
                self.min_elevation, self.max_elevation
            )));
        }
        if self.max_elevation >= FRAC_PI_2 || self.min_elevation <= -FRAC_PI_2 {
            return Err(invalid("camera elevation limits must stay strictly between -pi/2 and pi/2".into()));
        }
        if !(self.min_distance > 0.0 && self.min_distance <= self.max_distance) {
            return Err(invalid(format!(
                "camera.min_distance {} must be positive and at most max_distance {}",
                self.min_distance, self.max_distance
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub lift: f32,
    pub scale: f32,
    /// Pointer travel (px) under which a press and release counts as a click
    pub click_slop: f32,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            lift: 0.15,
            scale: 1.05,
            click_slop: 5.0,
        }
    }
}

/// Raster sizes in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub spine_size: [u32; 2],
    pub wood_size: [u32; 2],
    pub placeholder_size: [u32; 2],
    pub label_size: [u32; 2],
    /// Integer upscale applied to the 8x8 glyphs
    pub glyph_scale: u32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            spine_size: [128, 512],
            wood_size: [512, 512],
            placeholder_size: [64, 256],
            label_size: [256, 32],
            glyph_scale: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub background: Rgb,
    pub fog_start: f32,
    pub fog_end: f32,
    pub floor_size: f32,
    pub floor_color: Rgb,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            background: Rgb::new(0xf5, 0xf0, 0xff),
            fog_start: 18.0,
            fog_end: 35.0,
            floor_size: 20.0,
            floor_color: Rgb::new(0xed, 0xe5, 0xff),
        }
    }
}

/// Load configuration from file, falling back to defaults when it is absent
pub fn load_config(path: &Path) -> Result<BookshelfConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: BookshelfConfig = toml::from_str(&content)?;
        config.camera.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(BookshelfConfig::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&BookshelfConfig::default())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, BookshelfConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"
[layout]
shelf_width = 6.0

[hover]
lift = 0.3

[stage]
background = "#000000"
"##
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.layout.shelf_width, 6.0);
        assert_eq!(config.layout.shelf_height, 2.2);
        assert_eq!(config.hover.lift, 0.3);
        assert_eq!(config.hover.scale, 1.05);
        assert_eq!(config.stage.background, Rgb::BLACK);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[layout\nshelf_width = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_save_default_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookshelf.toml");
        save_default_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), BookshelfConfig::default());
    }

    fn load_str(toml: &str) -> Result<BookshelfConfig, ConfigError> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", toml).unwrap();
        load_config(file.path())
    }

    #[test]
    fn test_inverted_distance_limits_rejected() {
        let result = load_str("[camera]\nmin_distance = 30.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_inverted_elevation_limits_rejected() {
        let result = load_str("[camera]\nmin_elevation = 1.0\nmax_elevation = 0.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_vertical_max_elevation_rejected() {
        let result = load_str("[camera]\nmax_elevation = 1.5707964\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_finite_camera_value_rejected() {
        let result = load_str("[camera]\nsensitivity = nan\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_valid_camera_override_accepted() {
        let config = load_str("[camera]\nmin_distance = 8.0\nmax_distance = 30.0\n").unwrap();
        assert_eq!(config.camera.min_distance, 8.0);
        assert!(CameraConfig::default().validate().is_ok());
    }

    #[test]
    fn test_elevation_limits_below_vertical() {
        let camera = CameraConfig::default();
        assert!(camera.max_elevation < FRAC_PI_2);
        assert!(camera.min_elevation > 0.0);
        assert!(camera.elevation >= camera.min_elevation && camera.elevation <= camera.max_elevation);
    }
}
