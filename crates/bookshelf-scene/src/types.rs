//! Shared types for the shelf view: input snapshot, selection and messages

use std::sync::Arc;

use bevy::prelude::*;
use bookshelf_core::{BookshelfConfig, ShelfSnapshot, TaskId};

/// The one outward event of the shelf view: a book was clicked
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct TaskSelected {
    pub task_id: TaskId,
}

/// Snapshot the view should display
///
/// Replacing the inner `Arc` (even with equal content) rebuilds the scene;
/// setting it to `None` tears the scene down.
#[derive(Resource, Debug, Clone, Default)]
pub struct ShelfSource(pub Option<Arc<ShelfSnapshot>>);

impl ShelfSource {
    pub fn set(&mut self, snapshot: ShelfSnapshot) {
        self.0 = Some(Arc::new(snapshot));
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn snapshot(&self) -> Option<&ShelfSnapshot> {
        self.0.as_deref()
    }
}

/// Most recently selected task, kept for UI display
#[derive(Resource, Debug, Clone, Default)]
pub struct SelectedTask(pub Option<TaskId>);

/// Configuration the shelf view was created with
#[derive(Resource, Debug, Clone, Default)]
pub struct ShelfSettings(pub BookshelfConfig);
