//! Point markers: one per station, created once when the globe is built

use glam::{Quat, Vec3};
use tracing::warn;

use crate::config::{hex_to_rgb, GlobeConfig};
use crate::geo::{angular_to_world_radius, polar_to_cartesian, surface_normal};
use crate::station::{Station, StationKind};

const FALLBACK_COLOR: [f32; 3] = [1.0, 0.0, 0.0];

/// Index of a marker in list order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub station: Station,
    /// Position on the unrotated globe
    pub local_position: Vec3,
    /// Outward surface normal at the station
    pub normal: Vec3,
    /// Disc radius in world units at rest scale
    pub radius: f32,
    pub rest_scale: f32,
    pub emphasis_factor: f32,
    pub color: [f32; 3],
    emphasized: bool,
}

impl Marker {
    /// Current visual scale, always derived from the rest scale
    pub fn scale(&self) -> f32 {
        if self.emphasized {
            self.rest_scale * self.emphasis_factor
        } else {
            self.rest_scale
        }
    }

    pub fn is_emphasized(&self) -> bool {
        self.emphasized
    }

    /// Radius used for ray tests. Always the rest footprint: emphasis only
    /// changes how the marker is drawn, never what counts as over it.
    pub fn hit_radius(&self) -> f32 {
        self.radius * self.rest_scale
    }

    /// Marker centre once the globe has turned `globe_rotation` radians
    /// about its vertical axis
    pub fn world_center(&self, globe_rotation: f32) -> Vec3 {
        Quat::from_rotation_y(globe_rotation) * self.local_position
    }
}

/// All markers in station order
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn build(stations: &[Station], config: &GlobeConfig) -> Self {
        let radius = angular_to_world_radius(config.markers.radius_deg, config.globe.radius);
        let kind_color = |kind: StationKind| {
            let hex = match kind {
                StationKind::Station => &config.markers.station_color,
                StationKind::Observer => &config.markers.observer_color,
            };
            hex_to_rgb(hex).unwrap_or(FALLBACK_COLOR)
        };

        let markers = stations
            .iter()
            .enumerate()
            .map(|(index, station)| {
                let color = match station.color.as_deref().map(hex_to_rgb) {
                    Some(Ok(rgb)) => rgb,
                    Some(Err(e)) => {
                        warn!(id = %station.id, error = %e, "Ignoring station colour");
                        kind_color(station.kind)
                    }
                    None => kind_color(station.kind),
                };
                Marker {
                    id: MarkerId(index),
                    station: station.clone(),
                    local_position: polar_to_cartesian(
                        station.latitude,
                        station.longitude,
                        config.globe.radius,
                        config.markers.altitude,
                    ),
                    normal: surface_normal(station.latitude, station.longitude),
                    radius,
                    rest_scale: 1.0,
                    emphasis_factor: config.markers.emphasis_factor,
                    color,
                    emphasized: false,
                }
            })
            .collect();

        Self { markers }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.0)
    }

    /// The marker currently drawn at emphasis scale, if any
    pub fn emphasized(&self) -> Option<MarkerId> {
        self.markers.iter().find(|m| m.emphasized).map(|m| m.id)
    }

    /// Emphasise exactly `target` (or nothing); every other marker returns
    /// to its rest scale
    pub fn emphasize(&mut self, target: Option<MarkerId>) {
        for marker in &mut self.markers {
            marker.emphasized = Some(marker.id) == target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::StationId;

    fn stations() -> Vec<Station> {
        vec![
            Station {
                id: StationId("1".to_string()),
                name: "Station A".to_string(),
                latitude: 10.0,
                longitude: 20.0,
                image: "a.png".to_string(),
                kind: StationKind::Station,
                color: None,
            },
            Station {
                id: StationId("2".to_string()),
                name: "Observer B".to_string(),
                latitude: -30.0,
                longitude: 140.0,
                image: "b.png".to_string(),
                kind: StationKind::Observer,
                color: None,
            },
            Station {
                id: StationId("3".to_string()),
                name: "Tagged C".to_string(),
                latitude: 0.0,
                longitude: 0.0,
                image: "c.png".to_string(),
                kind: StationKind::Station,
                color: Some("#00ff00".to_string()),
            },
        ]
    }

    #[test]
    fn test_build_one_marker_per_station() {
        let config = GlobeConfig::default();
        let set = MarkerSet::build(&stations(), &config);
        assert_eq!(set.len(), 3);
        let ids: Vec<_> = set.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![MarkerId(0), MarkerId(1), MarkerId(2)]);

        let a = set.get(MarkerId(0)).unwrap();
        assert!((a.local_position.length() - 100.0).abs() < 1e-3);
        assert_eq!(a.color, [1.0, 0.0, 0.0]);
        assert_eq!(set.get(MarkerId(1)).unwrap().color, hex_to_rgb("#ffcc00").unwrap());
        assert_eq!(set.get(MarkerId(2)).unwrap().color, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_emphasis_is_derived_from_rest_scale() {
        let config = GlobeConfig::default();
        let mut set = MarkerSet::build(&stations(), &config);

        // Repeated emphasis never compounds
        set.emphasize(Some(MarkerId(0)));
        set.emphasize(Some(MarkerId(0)));
        let a = set.get(MarkerId(0)).unwrap();
        assert!((a.scale() - 1.4).abs() < 1e-6);

        set.emphasize(Some(MarkerId(1)));
        assert_eq!(set.get(MarkerId(0)).unwrap().scale(), 1.0);
        assert!((set.get(MarkerId(1)).unwrap().scale() - 1.4).abs() < 1e-6);
        assert_eq!(set.emphasized(), Some(MarkerId(1)));

        set.emphasize(None);
        assert!(set.iter().all(|m| m.scale() == m.rest_scale));
        assert_eq!(set.emphasized(), None);
    }

    #[test]
    fn test_hit_radius_ignores_emphasis() {
        let config = GlobeConfig::default();
        let mut set = MarkerSet::build(&stations(), &config);
        let rest = set.get(MarkerId(0)).unwrap().hit_radius();
        set.emphasize(Some(MarkerId(0)));
        assert_eq!(set.get(MarkerId(0)).unwrap().hit_radius(), rest);
    }

    #[test]
    fn test_world_center_rotates_about_vertical_axis() {
        let config = GlobeConfig::default();
        let set = MarkerSet::build(&stations(), &config);
        let c = set.get(MarkerId(2)).unwrap();
        let turned = c.world_center(std::f32::consts::FRAC_PI_2);
        assert!((turned - Vec3::new(100.0, 0.0, 0.0)).length() < 1e-3);
        assert!((c.world_center(0.0) - c.local_position).length() < 1e-6);
    }
}
