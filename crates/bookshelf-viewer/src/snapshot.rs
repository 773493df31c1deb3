//! Snapshot sources: bundled demo shelf and `?snapshot=` URL fetch

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use bookshelf_core::{ShelfSnapshot, SnapshotError};
use bookshelf_scene::{SelectedTask, ShelfSource};

/// Demo shelf shipped inside the binary
pub const DEMO_SHELF: &str = include_str!("../assets/demo_shelf.json");

pub fn demo_snapshot() -> Result<ShelfSnapshot, SnapshotError> {
    ShelfSnapshot::from_json_str(DEMO_SHELF)
}

/// Plugin for loading snapshots after startup
pub struct SnapshotLoaderPlugin;

impl Plugin for SnapshotLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingSnapshot>()
            .add_systems(Startup, check_url_parameter)
            .add_systems(Update, process_pending_snapshot);
    }
}

/// Result of an in-flight fetch, filled from the async task
#[derive(Resource, Default)]
pub struct PendingSnapshot {
    pub result: Arc<Mutex<Option<Result<String, String>>>>,
    pub source: Option<String>,
    pub error: Option<String>,
}

/// Check URL for ?snapshot= parameter on startup
#[allow(unused_variables, unused_mut)]
fn check_url_parameter(mut pending: ResMut<PendingSnapshot>) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(location) = window.location().href() else {
            return;
        };
        if let Ok(url) = web_sys::Url::new(&location) {
            if let Some(snapshot_url) = url.search_params().get("snapshot") {
                tracing::info!("Loading snapshot from URL parameter: {}", snapshot_url);
                fetch_snapshot(&snapshot_url, pending.result.clone());
                pending.source = Some(snapshot_url);
            }
        }
    }
}

/// Replace the shown snapshot once a fetch completes
fn process_pending_snapshot(
    mut pending: ResMut<PendingSnapshot>,
    mut source: ResMut<ShelfSource>,
    mut selected: ResMut<SelectedTask>,
) {
    // Take the result from the mutex; the lock is dropped immediately
    let fetched = match pending.result.try_lock() {
        Ok(mut result) => result.take(),
        Err(_) => None,
    };
    let Some(fetched) = fetched else {
        return;
    };

    match fetched.and_then(|json| ShelfSnapshot::from_json_str(&json).map_err(|e| e.to_string())) {
        Ok(snapshot) => {
            tracing::info!(
                source = ?pending.source,
                categories = snapshot.categories.len(),
                tasks = snapshot.task_count(),
                "Snapshot fetched"
            );
            pending.error = None;
            selected.0 = None;
            source.set(snapshot);
        }
        Err(e) => {
            tracing::error!("Failed to load snapshot: {}", e);
            pending.error = Some(e);
        }
    }
}

/// Fetch snapshot JSON from a URL (async via wasm_bindgen_futures)
#[cfg(target_arch = "wasm32")]
pub fn fetch_snapshot(url: &str, pending: Arc<Mutex<Option<Result<String, String>>>>) {
    use wasm_bindgen::JsCast;

    let url = url.to_string();
    wasm_bindgen_futures::spawn_local(async move {
        let result = async {
            let window = web_sys::window().ok_or("No window")?;

            let resp = wasm_bindgen_futures::JsFuture::from(window.fetch_with_str(&url))
                .await
                .map_err(|e| format!("Fetch failed: {:?}", e))?;

            let resp: web_sys::Response = resp.dyn_into().map_err(|_| "Response cast failed")?;

            if !resp.ok() {
                return Err(format!("HTTP {}: {}", resp.status(), resp.status_text()));
            }

            let text = wasm_bindgen_futures::JsFuture::from(
                resp.text().map_err(|_| "Failed to get text")?,
            )
            .await
            .map_err(|e| format!("Text extraction failed: {:?}", e))?;

            text.as_string().ok_or_else(|| "Not a string".to_string())
        }
        .await;

        if let Ok(mut slot) = pending.lock() {
            *slot = Some(result);
        }
    });
}

#[cfg(not(target_arch = "wasm32"))]
pub fn fetch_snapshot(_url: &str, pending: Arc<Mutex<Option<Result<String, String>>>>) {
    // Native loads snapshots from disk at startup
    if let Ok(mut slot) = pending.lock() {
        *slot = Some(Err("URL fetch not supported on native".to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::TaskId;

    fn loader_app() -> App {
        let mut app = App::new();
        app.init_resource::<ShelfSource>()
            .init_resource::<SelectedTask>()
            .init_resource::<PendingSnapshot>()
            .add_systems(Update, process_pending_snapshot);
        app
    }

    fn deliver(app: &mut App, result: Result<String, String>) {
        let slot = app.world().resource::<PendingSnapshot>().result.clone();
        *slot.lock().unwrap() = Some(result);
        app.update();
    }

    #[test]
    fn test_demo_shelf_parses() {
        let snapshot = demo_snapshot().unwrap();
        assert_eq!(snapshot.categories.len(), 4);
        // completed and archived tasks are not shelved
        assert_eq!(snapshot.task_count(), 12);
        let work = snapshot.tasks_for("Work");
        assert_eq!(work[0].name, "Reply to vendor");
        assert_eq!(work.last().unwrap().name, "Plan team offsite");
    }

    #[test]
    fn test_fetched_snapshot_replaces_source() {
        let mut app = loader_app();
        app.world_mut().resource_mut::<SelectedTask>().0 = Some(TaskId::new("1"));
        deliver(&mut app, Ok(DEMO_SHELF.to_string()));

        let source = app.world().resource::<ShelfSource>();
        assert_eq!(source.snapshot().map(|s| s.categories.len()), Some(4));
        assert!(app.world().resource::<SelectedTask>().0.is_none());
    }

    #[test]
    fn test_bad_snapshot_keeps_current_source() {
        let mut app = loader_app();
        app.world_mut().resource_mut::<ShelfSource>().set(demo_snapshot().unwrap());
        deliver(&mut app, Ok("{ not json".to_string()));

        assert!(app.world().resource::<ShelfSource>().snapshot().is_some());
        assert!(app.world().resource::<PendingSnapshot>().error.is_some());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_fetch_reports_error() {
        let slot = Arc::new(Mutex::new(None));
        fetch_snapshot("https://example.com/shelf.json", slot.clone());
        assert!(matches!(*slot.lock().unwrap(), Some(Err(_))));
    }
}
