//! Browser-side loading: container and canvas, page globals, and URL fetches
//!
//! Stations come from the `stations` / `observers` globals the hosting page
//! defines, or from a `?stations=` (and `?observers=`) URL. An optional
//! `?config=` URL points at a TOML configuration file.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use bevy::prelude::*;
use stationglobe_core::{GlobeConfig, StationCatalog};
use stationglobe_scene::{GlobeSettings, PendingCatalog, StartupFailure};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::sources::{catalog_from_json, config_from_toml};

/// Id given to the canvas created inside the container
pub const CANVAS_ID: &str = "globe-canvas";

/// Result of a fetch, filled in from a `spawn_local` task
type Slot = Arc<Mutex<Option<Result<String, String>>>>;

fn filled(value: Result<String, String>) -> Slot {
    Arc::new(Mutex::new(Some(value)))
}

fn is_filled(slot: &Slot) -> bool {
    slot.try_lock().map(|s| s.is_some()).unwrap_or(false)
}

fn take(slot: &Slot) -> Result<String> {
    slot.lock()
        .ok()
        .and_then(|mut s| s.take())
        .unwrap_or_else(|| Err("source was already consumed".to_string()))
        .map_err(|e| anyhow!(e))
}

/// Station and config sources, some possibly still in flight
#[derive(Resource, Clone)]
pub struct PendingSources {
    pub title: String,
    stations: Slot,
    observers: Option<Slot>,
    config: Option<Slot>,
}

impl PendingSources {
    fn ready(&self) -> bool {
        is_filled(&self.stations)
            && self.observers.as_ref().is_none_or(is_filled)
            && self.config.as_ref().is_none_or(is_filled)
    }

    fn assemble(&self) -> Result<(GlobeConfig, StationCatalog)> {
        let config = match &self.config {
            Some(slot) => config_from_toml(&take(slot)?)?,
            None => GlobeConfig::default(),
        };
        let stations = take(&self.stations)?;
        let observers = self.observers.as_ref().map(take).transpose()?;
        let catalog = catalog_from_json(&stations, observers.as_deref())?;
        Ok((config, catalog))
    }
}

/// Plugin handing loaded sources to the scene
pub struct LoaderPlugin(pub PendingSources);

impl Plugin for LoaderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.0.clone())
            .add_systems(Update, apply_loaded_sources);
    }
}

/// Check the container exists and put the render canvas inside it
pub fn prepare_canvas(container_id: &str) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("No window"))?;
    let document = window.document().ok_or_else(|| anyhow!("No document"))?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| anyhow!("Container element #{} not found", container_id))?;

    if document.get_element_by_id(CANVAS_ID).is_some() {
        return Ok(());
    }

    let canvas: web_sys::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow!("Failed to create canvas: {:?}", e))?
        .dyn_into()
        .map_err(|_| anyhow!("Created element is not a canvas"))?;
    canvas.set_id(CANVAS_ID);
    container
        .append_child(&canvas)
        .map_err(|e| anyhow!("Failed to attach canvas: {:?}", e))?;

    tracing::info!("Canvas attached to #{}", container_id);
    Ok(())
}

/// Read page globals and start any URL fetches
pub fn collect_sources(title: String) -> PendingSources {
    let window = web_sys::window();
    let params = window
        .as_ref()
        .and_then(|w| w.location().href().ok())
        .and_then(|href| web_sys::Url::new(&href).ok())
        .map(|url| url.search_params());
    let param = |name: &str| params.as_ref().and_then(|p| p.get(name));
    let global = |name: &str| window.as_ref().and_then(|w| global_json(w, name));

    let stations = match (global("stations"), param("stations")) {
        (Some(json), _) => filled(Ok(json)),
        (None, Some(url)) => spawn_fetch(url),
        (None, None) => {
            tracing::warn!("No stations global or ?stations= parameter, the globe will be empty");
            filled(Ok("[]".to_string()))
        }
    };
    let observers = match (global("observers"), param("observers")) {
        (Some(json), _) => Some(filled(Ok(json))),
        (None, Some(url)) => Some(spawn_fetch(url)),
        (None, None) => None,
    };
    let config = param("config").map(spawn_fetch);

    PendingSources {
        title,
        stations,
        observers,
        config,
    }
}

/// A page global serialised back to JSON, if it is defined
fn global_json(window: &web_sys::Window, name: &str) -> Option<String> {
    let value = js_sys::Reflect::get(window, &JsValue::from_str(name)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    js_sys::JSON::stringify(&value).ok().map(String::from)
}

fn spawn_fetch(url: String) -> Slot {
    tracing::info!("Fetching {}", url);
    let slot: Slot = Arc::new(Mutex::new(None));
    let slot_clone = slot.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch_text(&url).await;
        if let Ok(mut s) = slot_clone.lock() {
            *s = Some(result);
        }
    });
    slot
}

/// Fetch text content from URL
async fn fetch_text(url: &str) -> Result<String, String> {
    let window = web_sys::window().ok_or("No window")?;

    let resp = wasm_bindgen_futures::JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| format!("Fetch failed: {:?}", e))?;

    let resp: web_sys::Response = resp.dyn_into().map_err(|_| "Response cast failed")?;

    if !resp.ok() {
        return Err(format!("HTTP {}: {}", resp.status(), resp.status_text()));
    }

    let text = wasm_bindgen_futures::JsFuture::from(resp.text().map_err(|_| "Failed to get text")?)
        .await
        .map_err(|e| format!("Text extraction failed: {:?}", e))?;

    text.as_string().ok_or_else(|| "Not a string".to_string())
}

/// Once every source has arrived, hand config and catalog to the scene
fn apply_loaded_sources(
    pending: Res<PendingSources>,
    mut settings: ResMut<GlobeSettings>,
    mut catalog: ResMut<PendingCatalog>,
    mut failure: ResMut<StartupFailure>,
    mut done: Local<bool>,
) {
    if *done || !pending.ready() {
        return;
    }
    *done = true;

    match pending.assemble() {
        Ok((config, stations)) => {
            settings.0 = config;
            catalog.0 = Some(stations);
        }
        Err(e) => {
            tracing::error!("Failed to load globe sources: {:#}", e);
            failure.0 = Some(e.to_string());
        }
    }
}
