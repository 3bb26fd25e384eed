//! Window input routed into the viewer: hover, press, tap, and resize

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::types::{to_core_vec2, GlobeViewer};
use crate::GlobeSet;

/// Movement beyond this many pixels turns a touch into a drag
const TAP_SLOP: f32 = 10.0;

/// Pointer state carried between frames
#[derive(Resource, Default, Debug)]
pub struct PointerTracker {
    /// Cursor position last forwarded to the viewer
    last_cursor: Option<Vec2>,
    /// Position where the current touch started
    touch_start: Option<Vec2>,
    /// Whether the current touch has moved far enough to be a drag
    touch_dragging: bool,
}

/// Plugin for pointer and window interaction
pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerTracker>().add_systems(
            Update,
            (handle_resize, handle_pointer, handle_touch_tap)
                .chain()
                .in_set(GlobeSet::Input),
        );
    }
}

/// Keep the viewer's viewport in step with the render surface
fn handle_resize(viewer: Option<ResMut<GlobeViewer>>, windows: Query<&Window, With<PrimaryWindow>>) {
    let Some(mut viewer) = viewer else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };

    let size = glam::Vec2::new(window.width(), window.height());
    if viewer.0.viewport().size != size && viewer.0.on_resize(size.x, size.y) {
        tracing::debug!(width = size.x, height = size.y, "Viewport resized");
    }
}

/// Mouse hover and press
fn handle_pointer(
    viewer: Option<ResMut<GlobeViewer>>,
    mut tracker: ResMut<PointerTracker>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
) {
    let Some(mut viewer) = viewer else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };

    // Check if egui wants the pointer
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if egui_wants_pointer {
        return;
    }

    let Some(cursor) = window.cursor_position() else {
        tracker.last_cursor = None;
        return;
    };

    if tracker.last_cursor != Some(cursor) {
        viewer.0.on_pointer_move(to_core_vec2(cursor));
        tracker.last_cursor = Some(cursor);
    }

    if mouse_button.just_pressed(MouseButton::Left) {
        viewer.0.on_press(to_core_vec2(cursor));
    }
}

/// A touch released without dragging behaves like hover plus press
fn handle_touch_tap(
    viewer: Option<ResMut<GlobeViewer>>,
    mut tracker: ResMut<PointerTracker>,
    touch_input: Res<Touches>,
    mut contexts: EguiContexts,
) {
    let Some(mut viewer) = viewer else {
        return;
    };

    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if egui_wants_pointer {
        return;
    }

    if let Some(touch) = touch_input.iter().next() {
        if touch_input.just_pressed(touch.id()) {
            tracker.touch_start = Some(touch.position());
            tracker.touch_dragging = false;
        } else if let Some(start) = tracker.touch_start {
            if touch.position().distance(start) > TAP_SLOP {
                tracker.touch_dragging = true;
            }
        }
    }

    let mut tap: Option<Vec2> = None;
    for touch in touch_input.iter_just_released() {
        if !tracker.touch_dragging {
            tap = tracker.touch_start.or(Some(touch.position()));
        }
        tracker.touch_start = None;
        tracker.touch_dragging = false;
    }

    if let Some(pos) = tap {
        let pixel = to_core_vec2(pos);
        viewer.0.on_pointer_move(pixel);
        viewer.0.on_press(pixel);
    }
}
