//! Camera spawn, orbit input, and pose sync

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::types::{from_core_vec3, to_core_vec2, GlobeSettings, GlobeViewer};
use crate::GlobeSet;

/// Pixel-based wheels report roughly this many pixels per notch
const PIXELS_PER_SCROLL_LINE: f32 = 100.0;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(Update, orbit_input.in_set(GlobeSet::Input))
            .add_systems(Update, sync_camera.in_set(GlobeSet::Sync));
    }
}

fn spawn_camera(mut commands: Commands, settings: Res<GlobeSettings>) {
    let camera = &settings.0.camera;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_deg.to_radians(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Transform::from_translation(Vec3::from_array(camera.position))
            .looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));
}

/// Drag to rotate, wheel or pinch to zoom
fn orbit_input(
    viewer: Option<ResMut<GlobeViewer>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    touch_input: Res<Touches>,
    mut contexts: EguiContexts,
) {
    let Some(mut viewer) = viewer else {
        return;
    };

    // Don't steer the camera while the pointer is over a card
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if egui_wants_pointer {
        return;
    }

    let viewport = *viewer.0.viewport();
    let controls = viewer.0.controls_mut();

    if mouse_button.pressed(MouseButton::Left) && mouse_motion.delta != Vec2::ZERO {
        controls.rotate(to_core_vec2(mouse_motion.delta), &viewport);
    }

    let notches = match mouse_scroll.unit {
        MouseScrollUnit::Line => mouse_scroll.delta.y,
        MouseScrollUnit::Pixel => mouse_scroll.delta.y / PIXELS_PER_SCROLL_LINE,
    };
    if notches != 0.0 {
        controls.zoom(notches);
    }

    // One finger drags the globe
    if touch_input.iter().count() == 1 {
        for touch in touch_input.iter() {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                controls.rotate(to_core_vec2(delta), &viewport);
            }
        }
    }

    // Pinch to zoom
    if touch_input.iter().count() == 2 {
        let touches: Vec<_> = touch_input.iter().collect();
        if let (Some(t1), Some(t2)) = (touches.first(), touches.get(1)) {
            let curr_dist = t1.position().distance(t2.position());
            let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            controls.zoom_by_factor(prev_dist / curr_dist.max(1.0));
        }
    }
}

/// Mirror the viewer's camera pose onto the bevy camera
fn sync_camera(
    viewer: Option<Res<GlobeViewer>>,
    mut camera_query: Query<(&mut Transform, &mut Projection), With<MainCamera>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Some(viewer) = viewer else {
        return;
    };
    if windows.single().is_err() {
        return;
    }
    let camera = viewer.0.camera();
    let Ok((mut transform, mut projection)) = camera_query.single_mut() else {
        return;
    };

    // Settings may have arrived after startup (web config fetch)
    if viewer.is_added() {
        *projection = Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_y,
            near: camera.near,
            far: camera.far,
            ..default()
        });
    }

    *transform = Transform::from_translation(from_core_vec3(camera.position))
        .looking_at(from_core_vec3(camera.target), Vec3::Y);
}
