//! Shared UI components for task display

use bevy_egui::egui;
use bookshelf_core::{Category, Rgb, Task};

fn accent(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

/// Render the details of a selected task
pub fn render_task_details(ui: &mut egui::Ui, category: &Category, task: &Task) {
    ui.heading(egui::RichText::new(&task.name).size(18.0));
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("■").color(accent(category.accent_color)));
        ui.label(&category.name);
    });

    ui.separator();

    ui.label(format!("Timeframe: {}", task.timeframe.label()));
    match task.due_date {
        Some(due) => ui.label(format!("Due: {}", due.format("%Y-%m-%d"))),
        None => ui.label(egui::RichText::new("No due date").color(egui::Color32::GRAY)),
    };

    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        ui.separator();
        ui.label(egui::RichText::new(description).small());
    }
}

/// Render one line per category with its open task count
pub fn render_category_summary(ui: &mut egui::Ui, categories: &[Category], count: impl Fn(&str) -> usize) {
    if categories.is_empty() {
        ui.label(egui::RichText::new("No categories").color(egui::Color32::GRAY));
        return;
    }

    ui.collapsing("Shelves", |ui| {
        for category in categories {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("■").color(accent(category.accent_color)));
                ui.label(&category.name);
                ui.label(
                    egui::RichText::new(count(&category.name).to_string())
                        .small()
                        .color(egui::Color32::GRAY),
                );
            });
        }
    });
}
