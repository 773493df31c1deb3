//! Bevy world as a render host for the scene lifecycle
//!
//! A [`WorldHost`] is a short-lived view over the `World`, created by the
//! lifecycle driver every frame. Host-side bookkeeping that must outlive it
//! (frame loop token, attached listeners) lives in [`HostState`].

use std::collections::HashMap;

use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bookshelf_core::lifecycle::{FrameToken, ListenerId, ListenerKind};
use bookshelf_core::picking::PoseChange;
use bookshelf_core::{CursorAffordance, LifecycleError, OrbitCamera, RenderHost, SceneBlueprint};
use tracing::{debug, info};

use crate::camera::{orbit_projection, orbit_transform};
use crate::models::{apply_book_pose, despawn_shelf_scene, spawn_shelf_scene, SpawnedScene};
use crate::scene::{despawn_stage, spawn_stage, ShelfSurface};
use crate::types::ShelfSettings;

/// Frame loop and listener registrations owned by the host
#[derive(Resource, Debug, Default)]
pub struct HostState {
    next_id: u64,
    frame: Option<FrameToken>,
    listeners: HashMap<ListenerId, ListenerKind>,
}

impl HostState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn frame_loop(&self) -> Option<FrameToken> {
        self.frame
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

pub struct WorldHost<'w> {
    world: &'w mut World,
    window: Option<Entity>,
    viewport: (u32, u32),
}

impl<'w> WorldHost<'w> {
    pub fn new(world: &'w mut World) -> Self {
        let mut windows = world.query_filtered::<(Entity, &Window), With<PrimaryWindow>>();
        let (window, viewport) = match windows.single(world) {
            Ok((entity, window)) => (
                Some(entity),
                (window.width().round() as u32, window.height().round() as u32),
            ),
            Err(_) => (None, (0, 0)),
        };
        Self {
            world,
            window,
            viewport,
        }
    }

    fn state(&mut self) -> Mut<'_, HostState> {
        if !self.world.contains_resource::<HostState>() {
            self.world.init_resource::<HostState>();
        }
        self.world.resource_mut::<HostState>()
    }

    fn sync_camera(&mut self, camera: &OrbitCamera) {
        let Some(entity) = self.world.get_resource::<ShelfSurface>().map(|s| s.camera) else {
            return;
        };
        if let Ok(mut entry) = self.world.get_entity_mut(entity) {
            entry.insert((orbit_transform(camera), orbit_projection(camera)));
        }
    }
}

impl RenderHost for WorldHost<'_> {
    type Scene = SpawnedScene;

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn acquire_surface(&mut self, width: u32, height: u32) -> Result<(), LifecycleError> {
        if self.window.is_none() {
            return Err(LifecycleError::Unsupported("no primary window".into()));
        }
        let has_renderer = self.world.contains_resource::<Assets<Mesh>>()
            && self.world.contains_resource::<Assets<StandardMaterial>>()
            && self.world.contains_resource::<Assets<Image>>();
        if !has_renderer {
            return Err(LifecycleError::Unsupported(
                "3D rendering plugins are not installed".into(),
            ));
        }

        let settings = self
            .world
            .get_resource::<ShelfSettings>()
            .map(|s| s.0.clone())
            .unwrap_or_default();
        let mut orbit = OrbitCamera::new(settings.camera);
        orbit.set_viewport(width as f32, height as f32);

        if let Some(stale) = self.world.remove_resource::<ShelfSurface>() {
            despawn_stage(self.world, stale);
        }
        let surface = spawn_stage(self.world, &settings.stage, &orbit);
        self.world.insert_resource(surface);
        info!(width, height, "Shelf surface acquired");
        Ok(())
    }

    fn upload_scene(&mut self, blueprint: &SceneBlueprint<'_>) -> Result<SpawnedScene, LifecycleError> {
        if !self.world.contains_resource::<ShelfSurface>() {
            return Err(LifecycleError::Unsupported("surface not acquired".into()));
        }
        let scene = spawn_shelf_scene(self.world, blueprint);
        debug!(
            books = scene.books.len(),
            images = scene.images.len(),
            meshes = scene.meshes.len(),
            "Shelf scene uploaded"
        );
        self.sync_camera(blueprint.camera);
        Ok(scene)
    }

    fn start_frame_loop(&mut self) -> FrameToken {
        let mut state = self.state();
        let token = FrameToken(state.next_id());
        state.frame = Some(token);
        token
    }

    fn cancel_frame_loop(&mut self, token: FrameToken) {
        let mut state = self.state();
        if state.frame == Some(token) {
            state.frame = None;
        }
    }

    fn attach_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let mut state = self.state();
        let id = ListenerId(state.next_id());
        state.listeners.insert(id, kind);
        id
    }

    fn detach_listener(&mut self, id: ListenerId) {
        self.state().listeners.remove(&id);
    }

    fn resize_surface(&mut self, width: u32, height: u32, camera: &OrbitCamera) {
        self.viewport = (width, height);
        self.sync_camera(camera);
    }

    fn apply_pose(&mut self, scene: &mut SpawnedScene, change: &PoseChange) {
        apply_book_pose(self.world, scene, change.index, &change.pose);
    }

    fn set_cursor(&mut self, cursor: CursorAffordance) {
        let Some(window) = self.window else {
            return;
        };
        let icon = match cursor {
            CursorAffordance::Pointer => SystemCursorIcon::Pointer,
            CursorAffordance::Default => SystemCursorIcon::Default,
        };
        if let Ok(mut entry) = self.world.get_entity_mut(window) {
            entry.insert(CursorIcon::System(icon));
        }
    }

    fn draw(&mut self, _scene: &SpawnedScene, camera: &OrbitCamera) {
        // Bevy renders every frame; only the camera needs to follow the orbit
        self.sync_camera(camera);
    }

    fn release_scene(&mut self, scene: SpawnedScene) {
        debug!(books = scene.books.len(), "Releasing shelf scene");
        despawn_shelf_scene(self.world, scene);
    }

    fn release_surface(&mut self) {
        if let Some(surface) = self.world.remove_resource::<ShelfSurface>() {
            despawn_stage(self.world, surface);
        }
        self.set_cursor(CursorAffordance::Default);
        info!("Shelf surface released");
    }
}
