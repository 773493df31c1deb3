//! HUD overlay using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use bookshelf_scene::ui::{render_category_summary, render_task_details};
use bookshelf_scene::{SelectedTask, ShelfSource, ShelfView, TaskSelected};

use crate::snapshot::PendingSnapshot;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, log_selections)
            .add_systems(EguiPrimaryContextPass, hud_system);
    }
}

fn log_selections(mut selections: MessageReader<TaskSelected>, source: Res<ShelfSource>) {
    for selected in selections.read() {
        let name = source
            .snapshot()
            .and_then(|s| s.find_task(&selected.task_id))
            .map(|(_, task)| task.name.as_str())
            .unwrap_or("?");
        tracing::debug!(task = %selected.task_id, name, "Selection shown in HUD");
    }
}

fn hud_system(
    mut contexts: EguiContexts,
    mut source: ResMut<ShelfSource>,
    mut selected: ResMut<SelectedTask>,
    view: Res<ShelfView>,
    pending: Res<PendingSnapshot>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let mut clear_selection = false;
    let mut rebuild = false;

    egui::Window::new("Bookshelf")
        .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
        .resizable(false)
        .default_width(260.0)
        .show(ctx, |ui| {
            let Some(snapshot) = source.snapshot() else {
                ui.label(egui::RichText::new("No snapshot loaded").color(egui::Color32::GRAY));
                return;
            };

            ui.label(format!(
                "{} tasks on {} shelves",
                snapshot.task_count(),
                snapshot.categories.len()
            ));
            if let Some(graph) = view.lifecycle.graph() {
                if !graph.omitted.is_empty() {
                    ui.label(
                        egui::RichText::new(format!("{} more did not fit", graph.omitted.len()))
                            .small()
                            .color(egui::Color32::from_rgb(200, 120, 50)),
                    );
                }
            }
            render_category_summary(ui, &snapshot.categories, |name| snapshot.tasks_for(name).len());

            if let Some(error) = &pending.error {
                ui.label(egui::RichText::new(error).small().color(egui::Color32::RED));
            }

            ui.separator();

            let details = selected
                .0
                .as_ref()
                .and_then(|id| snapshot.find_task(id));
            match details {
                Some((category, task)) => render_task_details(ui, category, task),
                None => {
                    ui.label(egui::RichText::new("Click a book to see its task").color(egui::Color32::GRAY));
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                clear_selection = ui.button("Clear selection").clicked();
                rebuild = ui.button("Rebuild").clicked();
            });
        });

    if clear_selection {
        selected.0 = None;
    }
    // A fresh snapshot identity makes the view tear down and rebuild
    if rebuild {
        if let Some(copy) = source.snapshot().cloned() {
            source.set(copy);
        }
    }
}
