//! Categories, tasks and the immutable snapshot handed to the shelf view
//!
//! The snapshot is the only input the view consumes. It is prepared once per
//! render cycle (filtering, ordering) and then treated as read-only; a new
//! snapshot identity triggers a full rebuild of the scene.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::color::Rgb;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Opaque, stable task identifier
///
/// Accepts JSON strings or numbers so snapshots exported with numeric ids
/// load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => TaskId(s),
            RawId::Int(n) => TaskId(n.to_string()),
            RawId::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => TaskId(format!("{}", f as i64)),
            RawId::Float(f) => TaskId(f.to_string()),
        })
    }
}

/// Expected effort of a task; drives the width of its book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Quick,
    Short,
    #[default]
    Medium,
    Long,
    Extended,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::Quick,
        Timeframe::Short,
        Timeframe::Medium,
        Timeframe::Long,
        Timeframe::Extended,
    ];

    /// Width in timeframe units, strictly increasing from quick to extended
    pub fn width_units(&self) -> f32 {
        match self {
            Timeframe::Quick => 45.0,
            Timeframe::Short => 60.0,
            Timeframe::Medium => 75.0,
            Timeframe::Long => 95.0,
            Timeframe::Extended => 115.0,
        }
    }

    /// Case-insensitive parse; anything unrecognised is `Medium`
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Timeframe::Quick,
            "short" => Timeframe::Short,
            "medium" => Timeframe::Medium,
            "long" => Timeframe::Long,
            "extended" => Timeframe::Extended,
            _ => Timeframe::Medium,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Quick => "quick",
            Timeframe::Short => "short",
            Timeframe::Medium => "medium",
            Timeframe::Long => "long",
            Timeframe::Extended => "extended",
        }
    }
}

impl<'de> Deserialize<'de> for Timeframe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Timeframe::parse_lenient).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    #[serde(alias = "accent", alias = "color")]
    pub accent_color: Rgb,
}

impl Category {
    pub fn new(name: impl Into<String>, accent_color: Rgb) -> Self {
        Self {
            name: name.into(),
            accent_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(alias = "label", alias = "category")]
    pub category_name: String,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category_name: impl Into<String>,
        timeframe: Timeframe,
    ) -> Self {
        Self {
            id: TaskId(id.into()),
            name: name.into(),
            category_name: category_name.into(),
            timeframe,
            due_date: None,
            completed: false,
            archived: false,
            description: None,
        }
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Whether the task belongs on the shelf at all
    pub fn is_open(&self) -> bool {
        !self.completed && !self.archived
    }
}

/// Empty strings and nulls mean "no due date"; timestamps keep only the date part
fn deserialize_due_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("invalid due date '{}': {}", raw, e)))
}

/// On-disk snapshot format: flat task list plus category list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Ordered categories plus each category's ordered, open tasks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShelfSnapshot {
    pub categories: Vec<Category>,
    pub tasks_by_category: HashMap<String, Vec<Task>>,
}

impl ShelfSnapshot {
    /// Use the given grouping as-is; order within each list is preserved
    pub fn new(categories: Vec<Category>, tasks_by_category: HashMap<String, Vec<Task>>) -> Self {
        Self {
            categories,
            tasks_by_category,
        }
    }

    /// Group a flat task list for display
    ///
    /// Completed and archived tasks are skipped, tasks naming an absent
    /// category are dropped, and each category is ordered by ascending due
    /// date with undated tasks last. Equal keys keep their input order.
    pub fn from_tasks(categories: Vec<Category>, tasks: Vec<Task>) -> Self {
        let mut tasks_by_category: HashMap<String, Vec<Task>> = categories
            .iter()
            .map(|c| (c.name.clone(), Vec::new()))
            .collect();

        let mut dropped = 0usize;
        for task in tasks.into_iter().filter(Task::is_open) {
            match tasks_by_category.get_mut(&task.category_name) {
                Some(list) => list.push(task),
                None => {
                    warn!(task = %task.id, category = %task.category_name, "Task references unknown category, skipping");
                    dropped += 1;
                }
            }
        }

        for list in tasks_by_category.values_mut() {
            list.sort_by_key(|t| (t.due_date.is_none(), t.due_date));
        }

        if dropped > 0 {
            warn!(dropped, "Dropped tasks with unknown categories");
        }

        Self {
            categories,
            tasks_by_category,
        }
    }

    pub fn from_file(file: SnapshotFile) -> Self {
        Self::from_tasks(file.categories, file.tasks)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        Ok(Self::from_file(file))
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            categories = snapshot.categories.len(),
            tasks = snapshot.task_count(),
            "Loaded shelf snapshot"
        );
        Ok(snapshot)
    }

    /// Tasks of one category in display order (empty if none)
    pub fn tasks_for(&self, category: &str) -> &[Task] {
        self.tasks_by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn task_count(&self) -> usize {
        self.categories
            .iter()
            .map(|c| self.tasks_for(&c.name).len())
            .sum()
    }

    pub fn find_task(&self, id: &TaskId) -> Option<(&Category, &Task)> {
        self.categories.iter().find_map(|c| {
            self.tasks_for(&c.name)
                .iter()
                .find(|t| &t.id == id)
                .map(|t| (c, t))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
