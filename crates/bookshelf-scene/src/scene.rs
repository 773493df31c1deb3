//! Stage setup - camera, lights, fog and floor
//!
//! The stage is built once per acquired surface and lives until the surface
//! is released; shelf content is spawned separately on top of it.

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use bookshelf_core::config::StageConfig;
use bookshelf_core::OrbitCamera;

use crate::camera::{orbit_projection, orbit_transform, ShelfCamera};
use crate::textures::color;

/// Marker component for stage entities (camera, lights, floor)
#[derive(Component)]
pub struct StageEntity;

/// Stage entities and the assets they own
#[derive(Resource, Debug)]
pub struct ShelfSurface {
    pub camera: Entity,
    pub entities: Vec<Entity>,
    pub meshes: Vec<Handle<Mesh>>,
    pub materials: Vec<Handle<StandardMaterial>>,
}

pub fn spawn_stage(world: &mut World, stage: &StageConfig, orbit: &OrbitCamera) -> ShelfSurface {
    let background = color(stage.background);

    let camera = world
        .spawn((
            Camera3d::default(),
            Camera {
                clear_color: ClearColorConfig::Custom(background),
                ..default()
            },
            orbit_projection(orbit),
            orbit_transform(orbit),
            Tonemapping::AcesFitted,
            DistanceFog {
                color: background,
                falloff: FogFalloff::Linear {
                    start: stage.fog_start,
                    end: stage.fog_end,
                },
                ..default()
            },
            // Warm, soft ambient
            AmbientLight {
                color: Color::srgb_u8(0xff, 0xf5, 0xee),
                brightness: 400.0,
                ..default()
            },
            ShelfCamera,
            StageEntity,
        ))
        .id();

    // Key light casting the shelf shadows
    let key = world
        .spawn((
            DirectionalLight {
                color: Color::srgb_u8(0xff, 0xf8, 0xf0),
                illuminance: 6000.0,
                shadows_enabled: true,
                ..default()
            },
            Transform::from_xyz(5.0, 8.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
            StageEntity,
        ))
        .id();

    let fill = world
        .spawn((
            DirectionalLight {
                color: Color::srgb_u8(0xe8, 0xd5, 0xf5),
                illuminance: 1500.0,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_xyz(-4.0, 4.0, -2.0).looking_at(Vec3::ZERO, Vec3::Y),
            StageEntity,
        ))
        .id();

    let rim = world
        .spawn((
            PointLight {
                color: Color::srgb_u8(0xff, 0xee, 0xdd),
                intensity: 150_000.0,
                range: 20.0,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_xyz(-3.0, 5.0, 5.0),
            StageEntity,
        ))
        .id();

    let floor_mesh = world
        .resource_mut::<Assets<Mesh>>()
        .add(Plane3d::default().mesh().size(stage.floor_size, stage.floor_size));
    let floor_material = world
        .resource_mut::<Assets<StandardMaterial>>()
        .add(StandardMaterial {
            base_color: color(stage.floor_color),
            perceptual_roughness: 0.9,
            ..default()
        });
    let floor = world
        .spawn((
            Mesh3d(floor_mesh.clone()),
            MeshMaterial3d(floor_material.clone()),
            Transform::IDENTITY,
            StageEntity,
        ))
        .id();

    ShelfSurface {
        camera,
        entities: vec![camera, key, fill, rim, floor],
        meshes: vec![floor_mesh],
        materials: vec![floor_material],
    }
}

/// Despawn the stage and drop its assets
pub fn despawn_stage(world: &mut World, surface: ShelfSurface) {
    for entity in surface.entities {
        world.despawn(entity);
    }
    let mut meshes = world.resource_mut::<Assets<Mesh>>();
    for handle in &surface.meshes {
        meshes.remove(handle);
    }
    let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
    for handle in &surface.materials {
        materials.remove(handle);
    }
}
