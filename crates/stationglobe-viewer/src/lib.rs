//! Station Globe Viewer - interactive station globe
//!
//! Runs in the browser (WASM, rendering into a canvas inside the host page's
//! container) or as a native desktop window.

pub mod app;
pub mod sources;

#[cfg(target_arch = "wasm32")]
mod loader;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    let defaults = stationglobe_core::GlobeConfig::default();

    // Without its container the widget has nowhere to draw
    if let Err(e) = loader::prepare_canvas(&defaults.page.container_id) {
        tracing::error!("Globe not started: {:#}", e);
        return;
    }

    let sources = loader::collect_sources(defaults.page.title);
    app::run(app::Launch::Deferred(sources));
}
