//! Orbit camera around a fixed look-at target
//!
//! Azimuth turns around the vertical axis, elevation is the angle above the
//! horizontal plane. Dragging down raises the camera towards the overhead
//! view. Dragging moves the camera only while a drag session is open;
//! releasing stops it immediately.

use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraConfig;
use crate::picking::Ray;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
    pub target: Vec3,
    settings: CameraConfig,
    drag_from: Option<Vec2>,
    viewport: Vec2,
}

impl OrbitCamera {
    pub fn new(settings: CameraConfig) -> Self {
        Self {
            azimuth: settings.azimuth,
            elevation: settings
                .elevation
                .max(settings.min_elevation)
                .min(settings.max_elevation),
            distance: settings
                .distance
                .max(settings.min_distance)
                .min(settings.max_distance),
            target: Vec3::from_array(settings.target),
            settings,
            drag_from: None,
            viewport: Vec2::new(1.0, 1.0),
        }
    }

    pub fn settings(&self) -> &CameraConfig {
        &self.settings
    }

    /// Open a drag session at `pos` (pixels)
    pub fn pointer_down(&mut self, pos: Vec2) {
        self.drag_from = Some(pos);
    }

    /// Rotate by the travel since the last event; returns whether the view moved
    pub fn pointer_move(&mut self, pos: Vec2) -> bool {
        let Some(last) = self.drag_from else {
            return false;
        };
        let delta = pos - last;
        self.drag_from = Some(pos);
        if delta == Vec2::ZERO {
            return false;
        }

        let s = &self.settings;
        self.azimuth -= delta.x * s.sensitivity;
        self.elevation = limit(
            self.elevation + delta.y * s.sensitivity,
            s.min_elevation,
            s.max_elevation,
        );
        true
    }

    pub fn pointer_up(&mut self) {
        self.drag_from = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    /// Zoom by a wheel delta in pixels (positive moves away)
    pub fn wheel(&mut self, delta_y: f32) {
        let s = &self.settings;
        self.distance = limit(self.distance + delta_y * s.zoom_speed, s.min_distance, s.max_distance);
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    /// World position derived from the spherical coordinates
    pub fn position(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        self.target + self.distance * Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let s = &self.settings;
        Mat4::perspective_rh(s.fov_degrees.to_radians(), self.aspect(), s.near, s.far)
    }

    /// Ray from the eye through a pixel of the viewport (origin top-left)
    pub fn ray_through(&self, screen: Vec2) -> Ray {
        let ndc = Vec2::new(
            screen.x / self.viewport.x * 2.0 - 1.0,
            1.0 - screen.y / self.viewport.y * 2.0,
        );
        self.ray_from_ndc(ndc)
    }

    /// Pixel position of a world point, or `None` when it is behind the eye
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.projection_matrix() * self.view_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(clip.x / clip.w, clip.y / clip.w);
        Some(Vec2::new(
            (ndc.x + 1.0) / 2.0 * self.viewport.x,
            (1.0 - ndc.y) / 2.0 * self.viewport.y,
        ))
    }

    /// Ray through normalized device coordinates in `[-1, 1]`, y up
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let eye = self.position();
        let forward = (self.target - eye).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        let tan_half = (self.settings.fov_degrees.to_radians() / 2.0).tan();

        let direction = forward + right * (ndc.x * tan_half * self.aspect()) + up * (ndc.y * tan_half);
        Ray::new(eye, direction)
    }
}

/// Like `f32::clamp` but never panics on inverted or NaN limits
fn limit(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
