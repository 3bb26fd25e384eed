//! Station Globe Scene - bevy plugins for the interactive globe
//!
//! The headless viewer in `stationglobe-core` owns all state; these plugins
//! feed it window input once per frame and mirror its state into entities
//! and egui overlays.

pub mod camera;
pub mod interaction;
pub mod markers;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use stationglobe_core::{Viewer, Viewport};

/// Ordering of the per-frame work
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlobeSet {
    /// Build the viewer once a catalog is available
    Bootstrap,
    /// Pointer, press, resize and orbit input
    Input,
    /// Advance the frame loop
    Tick,
    /// Copy viewer state onto entities
    Sync,
}

/// Plugin that sets up the whole globe scene
pub struct GlobeScenePlugin;

impl Plugin for GlobeScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GlobeSettings>()
            .init_resource::<PendingCatalog>()
            .init_resource::<FrameLoop>()
            .init_resource::<StartupFailure>()
            .configure_sets(
                Update,
                (GlobeSet::Bootstrap, GlobeSet::Input, GlobeSet::Tick, GlobeSet::Sync).chain(),
            )
            .add_systems(Update, bootstrap_viewer.in_set(GlobeSet::Bootstrap))
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(markers::MarkersPlugin)
            .add_plugins(interaction::InteractionPlugin)
            .add_plugins(ui::UiPlugin);
    }
}

/// Turn the pending catalog into a viewer sized to the render surface.
///
/// Failure is logged once and leaves the scene without a globe.
fn bootstrap_viewer(
    mut commands: Commands,
    settings: Res<GlobeSettings>,
    mut pending: ResMut<PendingCatalog>,
    mut frame_loop: ResMut<FrameLoop>,
    mut failure: ResMut<StartupFailure>,
    viewer: Option<Res<GlobeViewer>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if viewer.is_some() || failure.0.is_some() {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    // The canvas reports zero size until the page has laid it out
    if window.width() < 1.0 || window.height() < 1.0 {
        return;
    }
    let Some(catalog) = pending.0.take() else {
        return;
    };

    let viewport = Viewport::new(window.width(), window.height());
    match Viewer::new(settings.0.clone(), &catalog, viewport) {
        Ok(viewer) => {
            tracing::info!(stations = catalog.len(), "Globe ready");
            commands.insert_resource(GlobeViewer(viewer));
            frame_loop.0.start();
        }
        Err(e) => {
            tracing::error!("Failed to initialize globe: {}", e);
            failure.0 = Some(e.to_string());
        }
    }
}

pub use types::*;
