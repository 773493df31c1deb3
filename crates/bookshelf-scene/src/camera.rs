//! Bevy camera driven by the core orbit camera

use bevy::prelude::*;
use bookshelf_core::OrbitCamera;

/// Marker component for the shelf camera
#[derive(Component)]
pub struct ShelfCamera;

/// Core math types go through arrays so the two glam copies never need to match
pub(crate) fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::from_array(v)
}

/// Transform placing the camera on its orbit, looking at the target
pub fn orbit_transform(orbit: &OrbitCamera) -> Transform {
    let eye = vec3(orbit.position().to_array());
    let target = vec3(orbit.target.to_array());
    Transform::from_translation(eye).looking_at(target, Vec3::Y)
}

/// Perspective projection matching the orbit camera's lens
pub fn orbit_projection(orbit: &OrbitCamera) -> Projection {
    let settings = orbit.settings();
    Projection::Perspective(PerspectiveProjection {
        fov: settings.fov_degrees.to_radians(),
        near: settings.near,
        far: settings.far,
        aspect_ratio: orbit.aspect(),
        ..default()
    })
}
