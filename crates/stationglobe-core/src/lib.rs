//! Station Globe Core - headless globe state, picking, and selection
//!
//! This crate holds everything about the station globe that does not need a
//! renderer:
//! - Station records and the catalog loaded from the hosting page
//! - Configuration (TOML, serde defaults)
//! - Geographic projection onto the globe
//! - Camera, viewport, and orbit controls
//! - Ray picking against point markers and hover selection state
//! - Hover label / detail card state
//! - The viewer context and its frame loop

pub mod camera;
pub mod config;
pub mod geo;
pub mod marker;
pub mod overlay;
pub mod picking;
pub mod render_loop;
pub mod selection;
pub mod station;
pub mod viewer;

pub use camera::{OrbitControls, PerspectiveCamera, Viewport};
pub use config::{ConfigError, GlobeConfig};
pub use marker::{Marker, MarkerId, MarkerSet};
pub use overlay::{CardContent, CursorStyle, DetailCard, HoverLabel, Overlays};
pub use picking::Ray;
pub use render_loop::{FrameInfo, LoopState, RenderLoop};
pub use selection::{Selection, SelectionChange};
pub use station::{Station, StationCatalog, StationError, StationId, StationKind};
pub use viewer::{FramePose, PressOutcome, Viewer, ViewerError};
