//! Bevy application setup

use bevy::prelude::*;
use bevy::winit::WinitSettings;
use bevy_egui::EguiPlugin;
use bookshelf_core::{BookshelfConfig, ShelfSnapshot};
use bookshelf_scene::{BookshelfScenePlugin, ShelfSource};

use crate::snapshot::SnapshotLoaderPlugin;
use crate::ui::UiPlugin;

pub fn run(config: BookshelfConfig, snapshot: Option<ShelfSnapshot>) {
    let mut source = ShelfSource::default();
    if let Some(snapshot) = snapshot {
        source.set(snapshot);
    }

    App::new()
        .insert_resource(WinitSettings::default())
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Bookshelf".to_string(),
                canvas: Some("#viewer-canvas".to_string()),
                fit_canvas_to_parent: true,
                // Keep wheel and touch gestures from scrolling the page
                prevent_default_event_handling: true,
                ..default()
            }),
            ..default()
        }))
        // EguiPlugin goes first so the scene plugin can track pointer capture
        .add_plugins(EguiPlugin::default())
        .add_plugins(BookshelfScenePlugin { config })
        .insert_resource(source)
        .add_plugins(SnapshotLoaderPlugin)
        .add_plugins(UiPlugin)
        .run();
}
