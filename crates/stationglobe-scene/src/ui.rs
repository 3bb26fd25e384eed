//! Hover label and detail card drawn with bevy_egui

use std::collections::HashMap;

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass, EguiTextureHandle};
use stationglobe_core::{CardContent, CursorStyle};

use crate::types::{from_core_vec2, GlobeViewer};

const CARD_WIDTH: f32 = 220.0;
const THUMBNAIL_SIZE: egui::Vec2 = egui::vec2(200.0, 150.0);

/// Colors for the overlays
mod colors {
    use bevy_egui::egui::Color32;

    pub const CARD_BG: Color32 = Color32::from_rgba_premultiplied(26, 26, 36, 230);
    pub const CARD_BORDER: Color32 = Color32::from_rgb(60, 60, 80);
    pub const LABEL_BG: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 200);
    pub const MUTED: Color32 = Color32::from_rgb(150, 150, 160);
}

/// Station thumbnails, loaded once per URL and registered with egui
#[derive(Resource, Default)]
pub struct StationImages {
    textures: HashMap<String, (Handle<Image>, egui::TextureId)>,
}

impl StationImages {
    fn texture_for(
        &mut self,
        url: &str,
        asset_server: &AssetServer,
        contexts: &mut EguiContexts,
    ) -> (Handle<Image>, egui::TextureId) {
        if let Some(entry) = self.textures.get(url) {
            return entry.clone();
        }
        tracing::debug!("Loading station image {}", url);
        let handle: Handle<Image> = asset_server.load(url.to_string());
        let texture_id = contexts.add_image(EguiTextureHandle::Strong(handle.clone()));
        self.textures.insert(url.to_string(), (handle.clone(), texture_id));
        (handle, texture_id)
    }
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StationImages>()
            // Overlays run in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, overlay_system);
    }
}

fn overlay_system(
    viewer: Option<ResMut<GlobeViewer>>,
    mut images: ResMut<StationImages>,
    asset_server: Res<AssetServer>,
    mut contexts: EguiContexts,
) {
    let Some(mut viewer) = viewer else {
        return;
    };

    // Resolve the thumbnail before borrowing the egui context
    let card = viewer.0.overlays().card.clone();
    let thumbnail = card
        .content
        .as_ref()
        .filter(|_| card.visible)
        .map(|content| {
            let (handle, texture_id) = images.texture_for(&content.image_url, &asset_server, &mut contexts);
            let failed = matches!(asset_server.get_load_state(&handle), Some(LoadState::Failed(_)));
            (texture_id, failed)
        });

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let overlays = viewer.0.overlays();
    if overlays.cursor == CursorStyle::Pointer {
        ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    if overlays.label.visible {
        let pos = from_core_vec2(overlays.label.position);
        egui::Area::new(egui::Id::new("station_hover_label"))
            .fixed_pos(egui::pos2(pos.x, pos.y))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(colors::LABEL_BG)
                    .corner_radius(4.0)
                    .inner_margin(egui::Margin::symmetric(6, 3))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(&overlays.label.text)
                                .color(egui::Color32::WHITE)
                                .strong(),
                        );
                    });
            });
    }

    let close_requested = match (card.visible, card.content.as_ref()) {
        (true, Some(content)) => {
            let pos = from_core_vec2(card.position);
            draw_card(ctx, egui::pos2(pos.x, pos.y), content, thumbnail)
        }
        _ => false,
    };

    if close_requested {
        viewer.0.close_card();
    }
}

/// Detail card at `pos`; returns true when it was clicked closed.
///
/// A click anywhere on the card closes it. The area itself senses clicks
/// underneath its widgets, so the link still opens without closing first.
fn draw_card(
    ctx: &egui::Context,
    pos: egui::Pos2,
    content: &CardContent,
    thumbnail: Option<(egui::TextureId, bool)>,
) -> bool {
    let shown = egui::Area::new(egui::Id::new("station_detail_card"))
        .fixed_pos(pos)
        .order(egui::Order::Foreground)
        .sense(egui::Sense::click())
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(colors::CARD_BG)
                .stroke(egui::Stroke::new(1.0, colors::CARD_BORDER))
                .corner_radius(6.0)
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.set_width(CARD_WIDTH);
                    card_contents(ui, content, thumbnail)
                })
                .inner
        });

    shown.inner || shown.response.clicked()
}

/// Title row with close control, thumbnail, and detail link; returns true
/// when the close control was clicked
fn card_contents(
    ui: &mut egui::Ui,
    content: &CardContent,
    thumbnail: Option<(egui::TextureId, bool)>,
) -> bool {
    let mut close = false;

    ui.horizontal(|ui| {
        ui.add(
            egui::Label::new(
                egui::RichText::new(&content.title)
                    .color(egui::Color32::WHITE)
                    .strong(),
            )
            .selectable(false),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("X").clicked() {
                close = true;
            }
        });
    });

    ui.add_space(6.0);
    match thumbnail {
        Some((_, true)) | None => {
            ui.add(
                egui::Label::new(egui::RichText::new("Image unavailable").color(colors::MUTED).small())
                    .selectable(false),
            );
        }
        Some((texture_id, false)) => {
            ui.image((texture_id, THUMBNAIL_SIZE));
        }
    }

    ui.add_space(6.0);
    ui.hyperlink_to("More information →", &content.detail_url);

    close
}

#[cfg(test)]
mod tests {
    use super::*;
    use stationglobe_core::StationId;

    const CARD_POS: egui::Pos2 = egui::pos2(100.0, 100.0);

    fn content() -> CardContent {
        CardContent {
            station_id: StationId("1".to_string()),
            title: "Station A".to_string(),
            image_url: "https://interact-gis.org/Files/StationImages/a.png".to_string(),
            detail_url: "https://interact-gis.org/Station/1".to_string(),
        }
    }

    fn input(events: Vec<egui::Event>) -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0))),
            events,
            ..Default::default()
        }
    }

    fn button(pos: egui::Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    /// Run frames with the card on screen, reporting whether any frame
    /// asked to close it
    fn run_frames(ctx: &egui::Context, frames: Vec<Vec<egui::Event>>, show_card: bool) -> bool {
        let card = content();
        let mut closed = false;
        for events in frames {
            let _ = ctx.run(input(events), |ctx| {
                if show_card {
                    closed |= draw_card(ctx, CARD_POS, &card, None);
                }
            });
        }
        closed
    }

    #[test]
    fn test_click_on_card_body_closes() {
        let ctx = egui::Context::default();
        // Inside the frame margin, away from every widget
        let inside = CARD_POS + egui::vec2(4.0, 4.0);

        // Let the area settle before interacting
        assert!(!run_frames(&ctx, vec![vec![], vec![egui::Event::PointerMoved(inside)]], true));
        let closed = run_frames(&ctx, vec![vec![button(inside, true)], vec![button(inside, false)]], true);
        assert!(closed);
    }

    #[test]
    fn test_click_outside_card_keeps_it() {
        let ctx = egui::Context::default();
        let outside = egui::pos2(700.0, 500.0);
        let closed = run_frames(
            &ctx,
            vec![
                vec![],
                vec![egui::Event::PointerMoved(outside)],
                vec![button(outside, true)],
                vec![button(outside, false)],
            ],
            true,
        );
        assert!(!closed);
    }
}
