//! Bookshelf Viewer - Standalone 3D task bookshelf
//!
//! Loads a task snapshot and shows it with the bookshelf scene plugin. Runs
//! natively through the `bookshelf` binary or in the browser as wasm.

pub mod app;
pub mod snapshot;
mod ui;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    // Demo shelf first; a ?snapshot= URL replaces it once fetched
    let snapshot = match snapshot::demo_snapshot() {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::error!("Bundled demo shelf is invalid: {}", e);
            None
        }
    };
    app::run(bookshelf_core::BookshelfConfig::default(), snapshot);
}
