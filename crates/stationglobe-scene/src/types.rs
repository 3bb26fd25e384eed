//! Resources shared between the scene plugins and the application

use bevy::prelude::*;
use stationglobe_core::{GlobeConfig, RenderLoop, StationCatalog, Viewer};

/// Configuration the globe is built from; present from startup
#[derive(Debug, Clone, Resource, Default)]
pub struct GlobeSettings(pub GlobeConfig);

/// Station catalog waiting to be turned into a viewer.
///
/// The application fills this once the records are available (synchronously
/// on native, after a fetch on the web).
#[derive(Debug, Clone, Resource, Default)]
pub struct PendingCatalog(pub Option<StationCatalog>);

/// The live viewer; only exists once startup succeeded
#[derive(Debug, Resource)]
pub struct GlobeViewer(pub Viewer);

/// Per-frame tick driver
#[derive(Debug, Resource, Default)]
pub struct FrameLoop(pub RenderLoop);

/// Set when building the viewer failed; the page stays inert afterwards
#[derive(Debug, Clone, Resource, Default)]
pub struct StartupFailure(pub Option<String>);

/// Marker component for the globe root (rotates every frame)
#[derive(Component)]
pub struct GlobeRoot;

pub fn to_core_vec2(v: Vec2) -> glam::Vec2 {
    glam::Vec2::new(v.x, v.y)
}

pub fn from_core_vec3(v: glam::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn from_core_vec2(v: glam::Vec2) -> Vec2 {
    Vec2::new(v.x, v.y)
}
