//! The viewer context: one object owning camera, markers, selection and
//! overlay state. Event handlers and the frame tick all go through it.

use glam::{Vec2, Vec3};
use thiserror::Error;
use tracing::{debug, info};

use crate::camera::{OrbitControls, PerspectiveCamera, Viewport};
use crate::config::{ConfigError, GlobeConfig};
use crate::marker::{Marker, MarkerId, MarkerSet};
use crate::overlay::{CursorStyle, Overlays};
use crate::picking::{first_hit, ndc_from_pixel, Ray};
use crate::selection::{Selection, SelectionChange, SelectionState};
use crate::station::{Station, StationCatalog};

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Container has no usable size ({width}x{height})")]
    EmptyViewport { width: f32, height: f32 },
}

/// What a primary press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    CardShown(MarkerId),
    CardDismissed,
}

/// Globe and camera pose after one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePose {
    pub globe_rotation: f32,
    pub camera_position: Vec3,
}

#[derive(Debug, Clone)]
pub struct Viewer {
    config: GlobeConfig,
    markers: MarkerSet,
    selection: SelectionState,
    overlays: Overlays,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    viewport: Viewport,
    globe_rotation: f32,
    /// Last cursor position in NDC; `None` until the pointer first moves
    pointer_ndc: Option<Vec2>,
    ray: Ray,
}

impl Viewer {
    /// Build the scene state for `catalog` inside a container of `viewport` size
    pub fn new(
        config: GlobeConfig,
        catalog: &StationCatalog,
        viewport: Viewport,
    ) -> Result<Self, ViewerError> {
        config.validate()?;
        if !viewport.is_usable() {
            return Err(ViewerError::EmptyViewport {
                width: viewport.size.x,
                height: viewport.size.y,
            });
        }

        let mut camera = PerspectiveCamera::from_config(&config.camera, &viewport);
        let controls = OrbitControls::from_config(&config.controls, camera.position);
        camera.position = controls.position();

        let markers = MarkerSet::build(catalog.stations(), &config);
        let ray = camera.ray_from_ndc(Vec2::ZERO);

        info!(
            markers = markers.len(),
            width = viewport.size.x,
            height = viewport.size.y,
            "Globe viewer initialized"
        );

        Ok(Self {
            config,
            markers,
            selection: SelectionState::default(),
            overlays: Overlays::default(),
            camera,
            controls,
            viewport,
            globe_rotation: 0.0,
            pointer_ndc: None,
            ray,
        })
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn selection(&self) -> Selection {
        self.selection.current()
    }

    pub fn hovered_marker(&self) -> Option<&Marker> {
        self.selection.current().marker().and_then(|id| self.markers.get(id))
    }

    pub fn hovered_station(&self) -> Option<&Station> {
        self.hovered_marker().map(|m| &m.station)
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn globe_rotation(&self) -> f32 {
        self.globe_rotation
    }

    /// The picking ray as of the last pointer move or frame
    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// Cursor moved to `pixel` (same coordinate space as the viewport origin)
    pub fn on_pointer_move(&mut self, pixel: Vec2) -> SelectionChange {
        let ndc = ndc_from_pixel(pixel, &self.viewport);
        self.pointer_ndc = Some(ndc);
        self.ray = self.camera.ray_from_ndc(ndc);

        let hit = first_hit(
            &self.ray,
            &self.markers,
            self.globe_rotation,
            self.config.globe.radius,
        );
        let change = self.selection.transition(hit, &mut self.markers);
        let local = pixel - self.viewport.origin;

        match change.current.marker().and_then(|id| self.markers.get(id)) {
            Some(marker) => {
                self.overlays.cursor = CursorStyle::Pointer;
                self.overlays.show_label(&marker.station, local, &self.config.card);
            }
            None => {
                self.overlays.cursor = CursorStyle::Default;
                self.overlays.hide_label();
            }
        }

        if change.changed() {
            debug!(previous = ?change.previous, current = ?change.current, "Selection changed");
        }
        change
    }

    /// Primary press at `pixel`: open the card for the hovered marker, or
    /// dismiss the card when nothing is hovered
    pub fn on_press(&mut self, pixel: Vec2) -> PressOutcome {
        let local = pixel - self.viewport.origin;
        match self.selection.current() {
            Selection::Hovering(id) => {
                if let Some(marker) = self.markers.get(id) {
                    self.overlays.hide_label();
                    self.overlays.show_card(&marker.station, local, &self.config.card);
                    debug!(station = %marker.station.id, "Detail card shown");
                    return PressOutcome::CardShown(id);
                }
                self.overlays.hide_card();
                PressOutcome::CardDismissed
            }
            Selection::Idle => {
                self.overlays.hide_card();
                PressOutcome::CardDismissed
            }
        }
    }

    /// Close button on the detail card
    pub fn close_card(&mut self) {
        self.overlays.hide_card();
    }

    /// Container resized; safe to call any number of times
    pub fn on_resize(&mut self, width: f32, height: f32) -> bool {
        let resized = Viewport {
            origin: self.viewport.origin,
            size: Vec2::new(width, height),
        };
        if !resized.is_usable() || !self.camera.set_aspect(width, height) {
            debug!(width, height, "Ignoring degenerate resize");
            return false;
        }
        self.viewport = resized;
        true
    }

    /// One frame: refresh the picking ray, turn the globe, let the orbit
    /// controls ease toward their target pose
    pub fn advance_frame(&mut self, dt: f32) -> FramePose {
        if let Some(ndc) = self.pointer_ndc {
            self.ray = self.camera.ray_from_ndc(ndc);
        }
        self.globe_rotation = (self.globe_rotation + self.config.globe.rotation_per_frame)
            .rem_euclid(std::f32::consts::TAU);
        self.camera.position = self.controls.update(dt);

        FramePose {
            globe_rotation: self.globe_rotation,
            camera_position: self.camera.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::pixel_from_ndc;
    use crate::station::{StationId, StationKind};

    fn station(id: &str, name: &str, lat: f64, lng: f64, image: &str) -> Station {
        Station {
            id: StationId(id.to_string()),
            name: name.to_string(),
            latitude: lat,
            longitude: lng,
            image: image.to_string(),
            kind: StationKind::Station,
            color: None,
        }
    }

    fn viewer_with(stations: Vec<Station>) -> Viewer {
        let catalog = StationCatalog::new(stations, Vec::new());
        Viewer::new(GlobeConfig::default(), &catalog, Viewport::new(800.0, 600.0)).unwrap()
    }

    /// Pixel position of a marker's centre as currently drawn
    fn marker_pixel(viewer: &Viewer, id: MarkerId) -> Vec2 {
        let marker = viewer.markers().get(id).unwrap();
        let ndc = viewer
            .camera()
            .project_to_ndc(marker.world_center(viewer.globe_rotation()))
            .unwrap();
        pixel_from_ndc(ndc, viewer.viewport())
    }

    #[test]
    fn test_rejects_empty_viewport() {
        let catalog = StationCatalog::default();
        let err = Viewer::new(GlobeConfig::default(), &catalog, Viewport::new(0.0, 600.0)).unwrap_err();
        assert!(matches!(err, ViewerError::EmptyViewport { .. }));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = GlobeConfig::default();
        config.markers.emphasis_factor = 0.0;
        let err = Viewer::new(config, &StationCatalog::default(), Viewport::new(800.0, 600.0)).unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }

    #[test]
    fn test_nan_controls_fail_without_panicking() {
        let mut config = GlobeConfig::default();
        config.controls.min_distance = f32::NAN;
        let err = Viewer::new(config, &StationCatalog::default(), Viewport::new(800.0, 600.0)).unwrap_err();
        assert!(matches!(err, ViewerError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_cursor_outside_markers_is_idle() {
        let mut viewer = viewer_with(vec![station("1", "Station A", 10.0, 20.0, "a.png")]);
        for pixel in [
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 590.0),
            Vec2::new(790.0, 10.0),
            Vec2::new(400.0, 300.0),
        ] {
            let change = viewer.on_pointer_move(pixel);
            assert_eq!(change.current, Selection::Idle);
            assert!(!viewer.overlays().label.visible);
            assert_eq!(viewer.overlays().cursor, CursorStyle::Default);
        }
        assert!(viewer.markers().iter().all(|m| m.scale() == m.rest_scale));
    }

    #[test]
    fn test_station_a_end_to_end() {
        let mut viewer = viewer_with(vec![station("1", "Station A", 10.0, 20.0, "a.png")]);
        let pixel = marker_pixel(&viewer, MarkerId(0));

        let change = viewer.on_pointer_move(pixel);
        assert_eq!(change.current, Selection::Hovering(MarkerId(0)));
        assert_eq!(viewer.overlays().cursor, CursorStyle::Pointer);
        assert!(viewer.overlays().label.visible);
        assert_eq!(viewer.overlays().label.text, "Station A");
        assert_eq!(viewer.overlays().label.position, pixel + Vec2::new(20.0, 0.0));
        let marker = viewer.hovered_marker().unwrap();
        assert!((marker.scale() - marker.rest_scale * 1.4).abs() < 1e-6);

        let outcome = viewer.on_press(pixel);
        assert_eq!(outcome, PressOutcome::CardShown(MarkerId(0)));
        assert!(!viewer.overlays().label.visible);
        let card = &viewer.overlays().card;
        assert!(card.visible);
        assert_eq!(card.position, pixel);
        let content = card.content.as_ref().unwrap();
        assert_eq!(content.title, "Station A");
        assert!(content.image_url.ends_with("a.png"));
        assert!(content.detail_url.contains("/Station/1"));
    }

    #[test]
    fn test_moving_between_markers_restores_scale() {
        let mut viewer = viewer_with(vec![
            station("1", "Station A", 10.0, 20.0, "a.png"),
            station("2", "Station B", 30.0, -10.0, "b.png"),
        ]);
        let a = marker_pixel(&viewer, MarkerId(0));
        let b = marker_pixel(&viewer, MarkerId(1));

        viewer.on_pointer_move(a);
        assert_eq!(viewer.selection(), Selection::Hovering(MarkerId(0)));

        viewer.on_pointer_move(b);
        assert_eq!(viewer.selection(), Selection::Hovering(MarkerId(1)));
        let markers = viewer.markers();
        assert_eq!(markers.get(MarkerId(0)).unwrap().scale(), 1.0);
        assert!((markers.get(MarkerId(1)).unwrap().scale() - 1.4).abs() < 1e-6);
        assert_eq!(viewer.overlays().label.text, "Station B");

        viewer.on_pointer_move(Vec2::new(1.0, 1.0));
        assert_eq!(viewer.selection(), Selection::Idle);
        assert!(viewer.markers().iter().all(|m| m.scale() == m.rest_scale));
    }

    #[test]
    fn test_leaving_footprint_returns_to_idle() {
        let mut viewer = viewer_with(vec![station("1", "Station A", 10.0, 20.0, "a.png")]);
        let marker = viewer.markers().get(MarkerId(0)).unwrap().clone();
        let center = marker.world_center(viewer.globe_rotation());
        let toward = (center - viewer.camera().position).normalize();
        let side = toward.cross(Vec3::Y).normalize();
        let beside = center + side * marker.radius * 1.2;
        let edge = pixel_from_ndc(
            viewer.camera().project_to_ndc(beside).unwrap(),
            viewer.viewport(),
        );

        // Same answer whether the cursor arrives from empty space or the marker
        assert_eq!(viewer.on_pointer_move(edge).current, Selection::Idle);
        viewer.on_pointer_move(marker_pixel(&viewer, MarkerId(0)));
        assert!(viewer.selection().is_hovering());
        assert_eq!(viewer.on_pointer_move(edge).current, Selection::Idle);
        assert!(viewer.markers().iter().all(|m| m.scale() == m.rest_scale));
        assert!(!viewer.overlays().label.visible);
    }

    #[test]
    fn test_press_while_idle_dismisses_card() {
        let mut viewer = viewer_with(vec![station("1", "Station A", 10.0, 20.0, "a.png")]);
        let pixel = marker_pixel(&viewer, MarkerId(0));
        viewer.on_pointer_move(pixel);
        viewer.on_press(pixel);
        assert!(viewer.overlays().card.visible);

        viewer.on_pointer_move(Vec2::new(2.0, 2.0));
        // Card stays open while merely moving away
        assert!(viewer.overlays().card.visible);

        assert_eq!(viewer.on_press(Vec2::new(2.0, 2.0)), PressOutcome::CardDismissed);
        assert!(!viewer.overlays().card.visible);
    }

    #[test]
    fn test_close_card() {
        let mut viewer = viewer_with(vec![station("1", "Station A", 10.0, 20.0, "a.png")]);
        let pixel = marker_pixel(&viewer, MarkerId(0));
        viewer.on_pointer_move(pixel);
        viewer.on_press(pixel);
        viewer.close_card();
        assert!(!viewer.overlays().card.visible);
        assert_eq!(viewer.selection(), Selection::Hovering(MarkerId(0)));
    }

    #[test]
    fn test_resize_keeps_selection() {
        let mut viewer = viewer_with(vec![station("1", "Station A", 10.0, 20.0, "a.png")]);
        let pixel = marker_pixel(&viewer, MarkerId(0));
        viewer.on_pointer_move(pixel);

        assert!(viewer.on_resize(1200.0, 400.0));
        assert!(viewer.on_resize(1200.0, 400.0));
        assert_eq!(viewer.camera().aspect, 3.0);
        assert_eq!(viewer.viewport().size, Vec2::new(1200.0, 400.0));
        assert_eq!(viewer.selection(), Selection::Hovering(MarkerId(0)));

        assert!(!viewer.on_resize(0.0, 0.0));
        assert_eq!(viewer.camera().aspect, 3.0);
    }

    #[test]
    fn test_container_origin_offsets_pointer() {
        let catalog = StationCatalog::new(vec![station("1", "Station A", 10.0, 20.0, "a.png")], Vec::new());
        let viewport = Viewport::new(800.0, 600.0).with_origin(Vec2::new(50.0, 80.0));
        let mut viewer = Viewer::new(GlobeConfig::default(), &catalog, viewport).unwrap();
        let page_pixel = marker_pixel(&viewer, MarkerId(0));

        viewer.on_pointer_move(page_pixel);
        assert!(viewer.selection().is_hovering());
        assert_eq!(
            viewer.overlays().label.position,
            page_pixel - Vec2::new(50.0, 80.0) + Vec2::new(20.0, 0.0)
        );
    }

    #[test]
    fn test_advance_frame_rotates_globe() {
        let mut viewer = viewer_with(vec![station("1", "Station A", 10.0, 20.0, "a.png")]);
        let pose = viewer.advance_frame(1.0 / 60.0);
        assert!((pose.globe_rotation - 0.0003).abs() < 1e-7);
        for _ in 0..9 {
            viewer.advance_frame(1.0 / 60.0);
        }
        assert!((viewer.globe_rotation() - 0.003).abs() < 1e-6);
        assert!((pose.camera_position.length() - 200.0).abs() < 1e-2);
    }
}
