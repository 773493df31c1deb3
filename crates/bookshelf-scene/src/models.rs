//! Shelf content entities - frames, labels, books and fillers

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use bookshelf_core::layout::{WoodTone, PAGE_EDGE};
use bookshelf_core::picking::Pose;
use bookshelf_core::{MaterialRequest, Rgb, SceneBlueprint, TaskId, TextureCache};
use tracing::warn;

use crate::camera::vec3;
use crate::textures::{color, raster_to_image, raster_to_tiling_image};

/// Parent of everything spawned for one scene build
#[derive(Component)]
pub struct ShelfRoot;

/// Marker component for frame panel entities
#[derive(Component)]
pub struct FramePanelEntity;

/// Marker component for category label planes
#[derive(Component)]
pub struct ShelfLabel {
    pub category: String,
}

/// A pickable book; `index` matches the hover engine's target order
#[derive(Component)]
pub struct BookEntity {
    pub task_id: TaskId,
    pub index: usize,
}

/// Marker component for decorative filler entities
#[derive(Component)]
pub struct FillerEntity;

/// Handles of one uploaded scene
#[derive(Debug)]
pub struct SpawnedScene {
    pub root: Entity,
    pub books: Vec<Entity>,
    pub images: Vec<Handle<Image>>,
    pub meshes: Vec<Handle<Mesh>>,
    pub materials: Vec<Handle<StandardMaterial>>,
}

/// Collects asset handles while spawning so they can be freed together
#[derive(Default)]
struct SceneAssets {
    images: HashMap<MaterialRequest, Handle<Image>>,
    meshes: Vec<Handle<Mesh>>,
    materials: Vec<Handle<StandardMaterial>>,
}

impl SceneAssets {
    fn mesh(&mut self, world: &mut World, mesh: impl Into<Mesh>) -> Handle<Mesh> {
        let handle = world.resource_mut::<Assets<Mesh>>().add(mesh);
        self.meshes.push(handle.clone());
        handle
    }

    fn material(&mut self, world: &mut World, material: StandardMaterial) -> Handle<StandardMaterial> {
        let handle = world.resource_mut::<Assets<StandardMaterial>>().add(material);
        self.materials.push(handle.clone());
        handle
    }

    fn image(&mut self, world: &mut World, textures: &TextureCache, request: &MaterialRequest) -> Option<Handle<Image>> {
        if let Some(handle) = self.images.get(request) {
            return Some(handle.clone());
        }
        let Some(raster) = textures.get(request) else {
            warn!(?request, "Texture missing from cache, drawing untextured");
            return None;
        };
        let image = match request {
            MaterialRequest::Wood { .. } => raster_to_tiling_image(&raster),
            _ => raster_to_image(&raster),
        };
        let handle = world.resource_mut::<Assets<Image>>().add(image);
        self.images.insert(request.clone(), handle.clone());
        Some(handle)
    }
}

/// Spawn every shelf, label, book and filler of a blueprint under one root
pub fn spawn_shelf_scene(world: &mut World, blueprint: &SceneBlueprint<'_>) -> SpawnedScene {
    let graph = blueprint.graph;
    let textures = blueprint.textures;
    let mut assets = SceneAssets::default();

    let root = world
        .spawn((Transform::IDENTITY, Visibility::default(), ShelfRoot))
        .id();

    let mut wood = HashMap::new();
    for tone in [WoodTone::Light, WoodTone::Dark] {
        let texture = assets.image(world, textures, &tone.material());
        let (roughness, metallic) = match tone {
            WoodTone::Light => (0.7, 0.05),
            WoodTone::Dark => (0.75, 0.03),
        };
        let material = assets.material(
            world,
            StandardMaterial {
                base_color: color(tone.tint()),
                base_color_texture: texture,
                perceptual_roughness: roughness,
                metallic,
                ..default()
            },
        );
        wood.insert(tone, material);
    }

    for shelf in &graph.shelves {
        for panel in &shelf.panels {
            let mesh = assets.mesh(world, Cuboid::new(panel.size.x, panel.size.y, panel.size.z));
            world.spawn((
                Mesh3d(mesh),
                MeshMaterial3d(wood[&panel.tone].clone()),
                Transform::from_translation(vec3(panel.center.to_array())),
                FramePanelEntity,
                ChildOf(root),
            ));
        }

        let label = &shelf.label;
        let texture = assets.image(world, textures, &label.material());
        let mesh = assets.mesh(world, Rectangle::new(label.size.x, label.size.y));
        let material = assets.material(
            world,
            StandardMaterial {
                base_color_texture: texture,
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            },
        );
        world.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(vec3(label.center.to_array())),
            ShelfLabel {
                category: shelf.category.clone(),
            },
            ChildOf(root),
        ));
    }

    let page_edge = assets.material(
        world,
        StandardMaterial {
            base_color: color(PAGE_EDGE),
            perceptual_roughness: 0.9,
            ..default()
        },
    );
    let mut covers: HashMap<Rgb, Handle<StandardMaterial>> = HashMap::new();
    let mut books = Vec::with_capacity(graph.books.len());

    for (index, book) in graph.books.iter().enumerate() {
        let cover = match covers.get(&book.accent) {
            Some(handle) => handle.clone(),
            None => {
                let handle = assets.material(
                    world,
                    StandardMaterial {
                        base_color: color(book.accent),
                        perceptual_roughness: 0.6,
                        ..default()
                    },
                );
                covers.insert(book.accent, handle.clone());
                handle
            }
        };
        let spine_texture = assets.image(world, textures, &book.spine_material());
        let spine = assets.material(
            world,
            StandardMaterial {
                base_color_texture: spine_texture,
                perceptual_roughness: 0.5,
                ..default()
            },
        );

        let size = book.size;
        let body = assets.mesh(world, Cuboid::new(size.x, size.y, size.z));
        let front = assets.mesh(world, Rectangle::new(size.x, size.y));
        let top = assets.mesh(world, Rectangle::new(size.x, size.z));

        let entity = world
            .spawn((
                Mesh3d(body),
                MeshMaterial3d(cover),
                Transform::from_translation(vec3(book.center.to_array()))
                    .with_rotation(Quat::from_rotation_z(book.tilt)),
                BookEntity {
                    task_id: book.task_id.clone(),
                    index,
                },
                ChildOf(root),
            ))
            .with_children(|parent| {
                // Spine faces the viewer
                parent.spawn((
                    Mesh3d(front),
                    MeshMaterial3d(spine),
                    Transform::from_xyz(0.0, 0.0, size.z / 2.0 + 0.001),
                ));
                parent.spawn((
                    Mesh3d(top),
                    MeshMaterial3d(page_edge.clone()),
                    Transform::from_xyz(0.0, size.y / 2.0 + 0.001, 0.0)
                        .with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
                ));
            })
            .id();
        books.push(entity);
    }

    if !graph.fillers.is_empty() {
        let texture = assets.image(world, textures, &MaterialRequest::Placeholder);
        let ghost = assets.material(
            world,
            StandardMaterial {
                base_color: Color::srgba(1.0, 1.0, 1.0, blueprint.filler_opacity),
                base_color_texture: texture,
                alpha_mode: AlphaMode::Blend,
                perceptual_roughness: 0.9,
                ..default()
            },
        );
        for filler in &graph.fillers {
            let mesh = assets.mesh(world, Cuboid::new(filler.size.x, filler.size.y, filler.size.z));
            world.spawn((
                Mesh3d(mesh),
                MeshMaterial3d(ghost.clone()),
                Transform::from_translation(vec3(filler.center.to_array()))
                    .with_rotation(Quat::from_rotation_z(filler.tilt)),
                FillerEntity,
                ChildOf(root),
            ));
        }
    }

    SpawnedScene {
        root,
        books,
        images: assets.images.into_values().collect(),
        meshes: assets.meshes,
        materials: assets.materials,
    }
}

/// Move a book to a pose, keeping its tilt
pub fn apply_book_pose(world: &mut World, scene: &SpawnedScene, index: usize, pose: &Pose) {
    let Some(&entity) = scene.books.get(index) else {
        return;
    };
    if let Some(mut transform) = world.get_mut::<Transform>(entity) {
        transform.translation = vec3(pose.center.to_array());
        transform.scale = Vec3::splat(pose.scale);
    }
}

/// Despawn a scene (children included) and drop its assets
pub fn despawn_shelf_scene(world: &mut World, scene: SpawnedScene) {
    world.despawn(scene.root);

    let mut images = world.resource_mut::<Assets<Image>>();
    for handle in &scene.images {
        images.remove(handle);
    }
    let mut meshes = world.resource_mut::<Assets<Mesh>>();
    for handle in &scene.meshes {
        meshes.remove(handle);
    }
    let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
    for handle in &scene.materials {
        materials.remove(handle);
    }
}
