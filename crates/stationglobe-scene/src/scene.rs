//! Scene setup - lights, textured globe, graticules, and the per-frame tick

use std::f32::consts::FRAC_PI_2;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use stationglobe_core::config::hex_to_rgb;
use stationglobe_core::geo::graticule_lines;
use stationglobe_core::GlobeConfig;

use crate::markers::spawn_markers;
use crate::types::{from_core_vec3, FrameLoop, GlobeRoot, GlobeViewer};
use crate::GlobeSet;

const GRATICULE_STEP_DEG: f64 = 10.0;
const GRATICULE_SEGMENT_DEG: f64 = 2.0;
/// Lines sit just above the surface so they don't z-fight the texture
const GRATICULE_LIFT: f32 = 1.001;
const ATMOSPHERE_SCALE: f32 = 1.015;
/// Ambient brightness for a light of full intensity
const AMBIENT_BRIGHTNESS: f32 = 400.0;
/// Illuminance (lux) for a directional light of intensity 1.0
const LUX_PER_INTENSITY: f32 = 10_000.0;

/// Marker component for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Marker component for graticule lines
#[derive(Component)]
pub struct Graticule;

/// Marker component for the atmosphere shell
#[derive(Component)]
pub struct Atmosphere;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (spawn_lighting, spawn_globe)
                .run_if(resource_added::<GlobeViewer>)
                .in_set(GlobeSet::Tick),
        )
        .add_systems(Update, advance_frame.in_set(GlobeSet::Tick))
        .add_systems(Update, sync_globe_rotation.in_set(GlobeSet::Sync));
    }
}

fn srgb_from_hex(hex: &str) -> Color {
    match hex_to_rgb(hex) {
        Ok([r, g, b]) => Color::srgb(r, g, b),
        Err(e) => {
            tracing::warn!("Bad colour {:?}: {}", hex, e);
            Color::WHITE
        }
    }
}

/// Asset paths are relative to the asset root; page-relative "./" prefixes
/// are dropped
fn asset_path(url: &str) -> String {
    url.trim_start_matches("./").to_string()
}

fn spawn_lighting(mut commands: Commands, viewer: Res<GlobeViewer>) {
    let lighting = &viewer.0.config().lighting;

    commands.insert_resource(AmbientLight {
        color: srgb_from_hex(&lighting.ambient_color),
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: lighting.directional_intensity * LUX_PER_INTENSITY,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(lighting.directional_position))
            .looking_at(Vec3::ZERO, Vec3::Y),
        MainDirectionalLight,
    ));
}

/// Build the globe hierarchy once the viewer exists
fn spawn_globe(
    mut commands: Commands,
    viewer: Res<GlobeViewer>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let config = viewer.0.config();
    let radius = config.globe.radius;

    let globe_material = materials.add(StandardMaterial {
        base_color_texture: Some(asset_server.load(asset_path(&config.globe.texture_url))),
        perceptual_roughness: 1.0,
        reflectance: 0.1,
        ..default()
    });
    let globe_mesh = meshes.add(Sphere::new(radius).mesh().uv(64, 32));

    let graticule = config
        .globe
        .show_graticules
        .then(|| graticule_mesh(config))
        .map(|mesh| {
            (
                meshes.add(mesh),
                materials.add(StandardMaterial {
                    base_color: Color::srgba(1.0, 1.0, 1.0, 0.25),
                    unlit: true,
                    alpha_mode: AlphaMode::Blend,
                    ..default()
                }),
            )
        });

    let atmosphere = config.globe.show_atmosphere.then(|| {
        (
            meshes.add(Sphere::new(radius * ATMOSPHERE_SCALE).mesh().uv(64, 32)),
            materials.add(StandardMaterial {
                base_color: Color::srgba(0.55, 0.75, 1.0, 0.15),
                unlit: true,
                alpha_mode: AlphaMode::Blend,
                ..default()
            }),
        )
    });

    commands
        .spawn((
            Transform::from_rotation(Quat::from_rotation_y(viewer.0.globe_rotation())),
            Visibility::default(),
            GlobeRoot,
        ))
        .with_children(|parent| {
            // The UV sphere has its poles on Z and the seam on +X; turn it so
            // north is up and longitude 0 faces +Z
            parent.spawn((
                Mesh3d(globe_mesh),
                MeshMaterial3d(globe_material),
                Transform::from_rotation(
                    Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(-FRAC_PI_2),
                ),
            ));

            if let Some((mesh, material)) = graticule {
                parent.spawn((Mesh3d(mesh), MeshMaterial3d(material), Graticule));
            }

            if let Some((mesh, material)) = atmosphere {
                parent.spawn((Mesh3d(mesh), MeshMaterial3d(material), Atmosphere));
            }

            spawn_markers(
                parent,
                viewer.0.markers(),
                radius,
                config.markers.altitude,
                config.markers.resolution,
                &mut meshes,
                &mut materials,
            );
        });

    tracing::info!(markers = viewer.0.markers().len(), "Globe spawned");
}

/// Parallels and meridians as a single line list
fn graticule_mesh(config: &GlobeConfig) -> Mesh {
    let lines = graticule_lines(
        GRATICULE_STEP_DEG,
        GRATICULE_SEGMENT_DEG,
        config.globe.radius * GRATICULE_LIFT,
    );
    let positions: Vec<[f32; 3]> = lines
        .iter()
        .flat_map(|line| line.windows(2))
        .flat_map(|pair| [from_core_vec3(pair[0]), from_core_vec3(pair[1])])
        .map(|v| v.to_array())
        .collect();

    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}

/// Drive the frame loop from bevy's clock
fn advance_frame(viewer: Option<ResMut<GlobeViewer>>, mut frame_loop: ResMut<FrameLoop>, time: Res<Time>) {
    let Some(mut viewer) = viewer else {
        return;
    };
    frame_loop.0.step(&mut viewer.0, time.delta_secs());
}

fn sync_globe_rotation(viewer: Option<Res<GlobeViewer>>, mut globe: Query<&mut Transform, With<GlobeRoot>>) {
    let Some(viewer) = viewer else {
        return;
    };
    for mut transform in globe.iter_mut() {
        transform.rotation = Quat::from_rotation_y(viewer.0.globe_rotation());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_path_strips_page_prefix() {
        assert_eq!(asset_path("./textures/earth-texture.png"), "textures/earth-texture.png");
        assert_eq!(asset_path("textures/earth.png"), "textures/earth.png");
        assert_eq!(
            asset_path("https://example.org/earth.png"),
            "https://example.org/earth.png"
        );
    }

    #[test]
    fn test_graticule_mesh_has_segment_pairs() {
        let mesh = graticule_mesh(&GlobeConfig::default());
        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::LineList);
        let count = mesh.count_vertices();
        assert!(count > 0);
        assert_eq!(count % 2, 0);
    }
}
