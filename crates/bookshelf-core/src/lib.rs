//! Bookshelf Core - Renderer-agnostic model of the 3D task bookshelf
//!
//! This crate provides everything the bookshelf view needs except pixels on screen:
//! - Snapshot model of categories and tasks, plus loading from JSON
//! - Procedural texture synthesis (wood grain, book spines, ghost books, labels)
//! - Deterministic shelf layout producing frames, books and fillers
//! - Orbit camera, ray picking and hover state
//! - Scene lifecycle state machine driving a pluggable render host

pub mod camera;
pub mod color;
pub mod config;
pub mod layout;
pub mod lifecycle;
pub mod model;
pub mod picking;
pub mod raster;
pub mod seed;
pub mod texture;

pub use glam;

pub use camera::OrbitCamera;
pub use color::{ColorError, Rgb, Rgba};
pub use config::{load_config, BookshelfConfig, ConfigError};
pub use layout::{BookVolume, FillerVolume, SceneGraph, ShelfLayoutBuilder, ShelfUnit};
pub use lifecycle::{InputEvent, LifecycleError, Phase, RenderHost, SceneBlueprint, SceneLifecycle};
pub use model::{Category, ShelfSnapshot, SnapshotError, Task, TaskId, Timeframe};
pub use picking::{CursorAffordance, HoverEngine, Pose, Ray};
pub use raster::RasterBuffer;
pub use texture::{MaterialRequest, TextureCache, TextureSynthesizer};
