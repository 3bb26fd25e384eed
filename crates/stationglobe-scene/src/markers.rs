//! Station markers - one short cylinder per station, standing on the globe

use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;
use stationglobe_core::{Marker, MarkerId, MarkerSet};

use crate::types::{from_core_vec3, GlobeViewer};
use crate::GlobeSet;

/// Markers at zero altitude still need some thickness to be drawn
const MIN_MARKER_HEIGHT: f32 = 0.1;

/// Links a marker entity to its entry in the viewer's marker set
#[derive(Component, Debug, Clone, Copy)]
pub struct MarkerEntity {
    pub id: MarkerId,
}

/// Plugin keeping marker entities in step with selection
pub struct MarkersPlugin;

impl Plugin for MarkersPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, sync_marker_scale.in_set(GlobeSet::Sync));
    }
}

/// Marker height above the surface in world units
fn marker_height(altitude: f32, globe_radius: f32) -> f32 {
    (altitude * globe_radius).max(MIN_MARKER_HEIGHT)
}

fn marker_transform(marker: &Marker, height: f32) -> Transform {
    let normal = from_core_vec3(marker.normal);
    let base = from_core_vec3(marker.local_position);
    Transform {
        translation: base + normal * (height / 2.0),
        rotation: Quat::from_rotation_arc(Vec3::Y, normal),
        scale: Vec3::splat(marker.scale()),
    }
}

/// Spawn one entity per marker under the globe root
pub fn spawn_markers(
    parent: &mut ChildSpawnerCommands,
    markers: &MarkerSet,
    globe_radius: f32,
    altitude: f32,
    resolution: u32,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let height = marker_height(altitude, globe_radius);

    for marker in markers.iter() {
        let [r, g, b] = marker.color;
        let mesh = meshes.add(Cylinder::new(marker.radius, height).mesh().resolution(resolution));
        let material = materials.add(StandardMaterial {
            base_color: Color::srgb(r, g, b),
            unlit: true,
            ..default()
        });

        parent.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            marker_transform(marker, height),
            MarkerEntity { id: marker.id },
        ));
    }
}

/// Hovered marker grows, everything else sits at rest scale
fn sync_marker_scale(viewer: Option<Res<GlobeViewer>>, mut query: Query<(&MarkerEntity, &mut Transform)>) {
    let Some(viewer) = viewer else {
        return;
    };
    let markers = viewer.0.markers();
    for (entity, mut transform) in query.iter_mut() {
        if let Some(marker) = markers.get(entity.id) {
            let scale = Vec3::splat(marker.scale());
            if transform.scale != scale {
                transform.scale = scale;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stationglobe_core::{GlobeConfig, Station, StationId, StationKind};

    fn marker_set() -> MarkerSet {
        let station = Station {
            id: StationId("1".to_string()),
            name: "Station A".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            image: "a.png".to_string(),
            kind: StationKind::Station,
            color: None,
        };
        MarkerSet::build(&[station], &GlobeConfig::default())
    }

    #[test]
    fn test_marker_height_has_floor() {
        assert_eq!(marker_height(0.0, 100.0), MIN_MARKER_HEIGHT);
        assert!((marker_height(0.05, 100.0) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_marker_stands_on_surface_normal() {
        let set = marker_set();
        let marker = set.get(MarkerId(0)).unwrap();
        let transform = marker_transform(marker, 2.0);

        // Station at 0,0 faces +Z
        assert!((transform.translation - Vec3::new(0.0, 0.0, 101.0)).length() < 1e-3);
        assert!((transform.rotation * Vec3::Y - Vec3::Z).length() < 1e-5);
        assert_eq!(transform.scale, Vec3::ONE);
    }
}
