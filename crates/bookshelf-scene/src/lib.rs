//! Bookshelf Scene - Bevy rendering host for the 3D task bookshelf
//!
//! This crate wires the renderer-agnostic lifecycle from `bookshelf-core`
//! into a Bevy app: the world acts as the render host, window input is
//! routed to the lifecycle, and book clicks come out as [`TaskSelected`]
//! messages.

pub mod camera;
pub mod host;
pub mod input;
pub mod models;
pub mod scene;
pub mod textures;
pub mod types;
pub mod ui;

use std::sync::Arc;

use bevy::prelude::*;
use bookshelf_core::{BookshelfConfig, SceneLifecycle, ShelfSnapshot};
use tracing::{error, info};

use host::{HostState, WorldHost};
use input::{collect_input, update_pointer_capture, PendingInput, PointerCaptured};
use models::SpawnedScene;

pub use types::*;

/// Lifecycle state kept between frames
#[derive(Resource)]
pub struct ShelfView {
    pub lifecycle: SceneLifecycle<SpawnedScene>,
    /// Snapshot whose build failed; not retried until the source changes
    failed: Option<Arc<ShelfSnapshot>>,
}

impl ShelfView {
    pub fn new(config: &BookshelfConfig) -> Self {
        Self {
            lifecycle: SceneLifecycle::new(config),
            failed: None,
        }
    }
}

/// Plugin that shows [`ShelfSource`] as a 3D bookshelf
#[derive(Default)]
pub struct BookshelfScenePlugin {
    pub config: BookshelfConfig,
}

impl Plugin for BookshelfScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<TaskSelected>()
            .init_resource::<ShelfSource>()
            .init_resource::<SelectedTask>()
            .init_resource::<HostState>()
            .init_resource::<PendingInput>()
            .init_resource::<PointerCaptured>()
            .insert_resource(ShelfSettings(self.config.clone()))
            .insert_resource(ShelfView::new(&self.config))
            .add_systems(PreUpdate, collect_input)
            .add_systems(Update, drive_lifecycle)
            .add_systems(Last, teardown_on_exit);

        if app.is_plugin_added::<bevy_egui::EguiPlugin>() {
            app.add_systems(bevy_egui::EguiPrimaryContextPass, update_pointer_capture);
        }
    }
}

/// Mount or unmount from the source, route input, then run one frame
fn drive_lifecycle(world: &mut World) {
    world.resource_scope(|world, mut view: Mut<ShelfView>| {
        let source = world.resource::<ShelfSource>().0.clone();
        let events = world.resource_mut::<PendingInput>().take();
        let mut selected = Vec::new();

        {
            let mut host = WorldHost::new(world);
            match source.clone() {
                Some(snapshot) => {
                    let failed = view
                        .failed
                        .as_ref()
                        .is_some_and(|f| Arc::ptr_eq(f, &snapshot));
                    if !failed {
                        view.failed = None;
                        if let Err(e) = view.lifecycle.mount(&mut host, snapshot.clone()) {
                            error!(error = %e, "Bookshelf view could not be built");
                            view.failed = Some(snapshot);
                        }
                    }
                }
                None => {
                    view.failed = None;
                    view.lifecycle.unmount(&mut host);
                }
            }

            for event in events {
                selected.extend(view.lifecycle.handle_input(&mut host, event));
            }

            if let Err(e) = view.lifecycle.tick(&mut host) {
                error!(error = %e, "Deferred bookshelf build failed");
                view.failed = source;
            }
        }

        for task_id in selected {
            world.resource_mut::<SelectedTask>().0 = Some(task_id.clone());
            world.write_message(TaskSelected { task_id });
        }
    });
}

fn teardown_on_exit(world: &mut World) {
    let exiting = world
        .get_resource::<Messages<AppExit>>()
        .is_some_and(|messages| !messages.is_empty());
    if !exiting {
        return;
    }
    info!("Application exiting, tearing down bookshelf view");
    world.resource_scope(|world, mut view: Mut<ShelfView>| {
        let mut host = WorldHost::new(world);
        view.lifecycle.unmount(&mut host);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::input::mouse::{MouseButtonInput, MouseWheel};
    use bevy::window::{CursorLeft, CursorMoved, PrimaryWindow, WindowResized};
    use bookshelf_core::{Category, Phase, Rgb, Task, Timeframe};

    use crate::models::{BookEntity, FillerEntity, ShelfRoot};
    use crate::scene::{ShelfSurface, StageEntity};

    fn snapshot() -> ShelfSnapshot {
        let categories = vec![
            Category::new("Work", Rgb::new(0x25, 0x63, 0xEB)),
            Category::new("Home", Rgb::new(0x16, 0xA3, 0x4A)),
        ];
        let tasks = vec![
            Task::new("1", "Report", "Work", Timeframe::Short),
            Task::new("2", "Budget", "Work", Timeframe::Long),
            Task::new("3", "Garden", "Home", Timeframe::Quick),
        ];
        ShelfSnapshot::from_tasks(categories, tasks)
    }

    fn headless_app() -> App {
        let mut app = App::new();
        app.add_message::<CursorMoved>()
            .add_message::<MouseButtonInput>()
            .add_message::<MouseWheel>()
            .add_message::<CursorLeft>()
            .add_message::<WindowResized>()
            .add_plugins(BookshelfScenePlugin::default());
        app
    }

    fn with_renderer(app: &mut App) {
        app.world_mut().init_resource::<Assets<Mesh>>();
        app.world_mut().init_resource::<Assets<StandardMaterial>>();
        app.world_mut().init_resource::<Assets<Image>>();
        app.world_mut().spawn((Window::default(), PrimaryWindow));
    }

    fn count<C: Component>(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<Entity, With<C>>()
            .iter(app.world())
            .count()
    }

    fn phase(app: &App) -> Phase {
        app.world().resource::<ShelfView>().lifecycle.phase()
    }

    #[test]
    fn test_build_deferred_without_window() {
        let mut app = headless_app();
        app.world_mut().resource_mut::<ShelfSource>().set(snapshot());
        app.update();
        let view = app.world().resource::<ShelfView>();
        assert!(view.lifecycle.is_build_pending());
        assert_eq!(view.lifecycle.phase(), Phase::Unmounted);
        assert!(app.world().get_resource::<ShelfSurface>().is_none());
    }

    #[test]
    fn test_missing_renderer_fails_once() {
        let mut app = headless_app();
        app.world_mut().spawn((Window::default(), PrimaryWindow));
        app.world_mut().resource_mut::<ShelfSource>().set(snapshot());
        app.update();
        app.update();
        let view = app.world().resource::<ShelfView>();
        assert_eq!(view.lifecycle.phase(), Phase::Unmounted);
        assert!(view.failed.is_some());
        assert_eq!(app.world().resource::<HostState>().listener_count(), 0);
    }

    #[test]
    fn test_mount_spawns_books_and_stage() {
        let mut app = headless_app();
        with_renderer(&mut app);
        app.world_mut().resource_mut::<ShelfSource>().set(snapshot());
        app.update();

        assert_eq!(phase(&app), Phase::Running);
        assert_eq!(count::<BookEntity>(&mut app), 3);
        assert!(count::<FillerEntity>(&mut app) >= 4);
        assert_eq!(count::<StageEntity>(&mut app), 5);
        assert_eq!(app.world().resource::<HostState>().listener_count(), 6);
        assert!(app.world().resource::<HostState>().frame_loop().is_some());
    }

    #[test]
    fn test_clearing_source_releases_everything() {
        let mut app = headless_app();
        with_renderer(&mut app);
        app.world_mut().resource_mut::<ShelfSource>().set(snapshot());
        app.update();
        app.world_mut().resource_mut::<ShelfSource>().clear();
        app.update();

        assert_eq!(phase(&app), Phase::Unmounted);
        assert_eq!(count::<ShelfRoot>(&mut app), 0);
        assert_eq!(count::<BookEntity>(&mut app), 0);
        assert_eq!(count::<StageEntity>(&mut app), 0);
        assert!(app.world().get_resource::<ShelfSurface>().is_none());
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 0);
        assert_eq!(app.world().resource::<Assets<Image>>().len(), 0);
        assert_eq!(app.world().resource::<HostState>().listener_count(), 0);
    }

    #[test]
    fn test_new_snapshot_rebuilds_single_scene() {
        let mut app = headless_app();
        with_renderer(&mut app);
        app.world_mut().resource_mut::<ShelfSource>().set(snapshot());
        app.update();
        app.world_mut().resource_mut::<ShelfSource>().set(snapshot());
        app.update();

        assert_eq!(phase(&app), Phase::Running);
        assert_eq!(count::<ShelfRoot>(&mut app), 1);
        assert_eq!(count::<BookEntity>(&mut app), 3);
        assert_eq!(count::<StageEntity>(&mut app), 5);
    }
}
