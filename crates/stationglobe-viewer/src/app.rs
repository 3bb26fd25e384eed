//! Bevy application assembly shared by the browser and desktop builds

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use stationglobe_core::{GlobeConfig, StationCatalog};
use stationglobe_scene::{GlobeScenePlugin, GlobeSettings, PendingCatalog};

/// CSS selector of the canvas bevy renders into on the web
pub const CANVAS_SELECTOR: &str = "#globe-canvas";

/// Where the globe gets its configuration and stations from
pub enum Launch {
    /// Everything is known before the app starts (native, page globals)
    Ready {
        config: GlobeConfig,
        catalog: StationCatalog,
    },
    /// Records arrive later; a loader plugin fills the pending slots
    #[cfg(target_arch = "wasm32")]
    Deferred(crate::loader::PendingSources),
}

/// Run the Bevy application
pub fn run(launch: Launch) {
    let title = match &launch {
        Launch::Ready { config, .. } => config.page.title.clone(),
        #[cfg(target_arch = "wasm32")]
        Launch::Deferred(pending) => pending.title.clone(),
    };

    let mut app = App::new();
    app.insert_resource(ClearColor(Color::BLACK))
        // Bevy 0.17+ has built-in https:// asset loading via the "https" feature
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title,
                        canvas: Some(CANVAS_SELECTOR.to_string()),
                        fit_canvas_to_parent: true,
                        prevent_default_event_handling: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    // Don't look for .meta files - static hosts don't have them
                    meta_check: bevy::asset::AssetMetaCheck::Never,
                    ..default()
                }),
        )
        // bevy_egui looks for the bevy_picking crate's PickingPlugin, so
        // picking must be added before EguiPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default());

    match launch {
        Launch::Ready { config, catalog } => {
            app.insert_resource(GlobeSettings(config))
                .insert_resource(PendingCatalog(Some(catalog)));
        }
        #[cfg(target_arch = "wasm32")]
        Launch::Deferred(pending) => {
            app.add_plugins(crate::loader::LoaderPlugin(pending));
        }
    }

    app.add_plugins(GlobeScenePlugin).run();
}
