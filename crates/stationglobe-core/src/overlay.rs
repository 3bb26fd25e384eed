//! Hover label and detail card state
//!
//! Both surfaces are plain data; the UI layer draws whatever is visible.

use glam::Vec2;

use crate::config::CardSection;
use crate::station::{Station, StationId};

/// Cursor affordance over the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoverLabel {
    pub visible: bool,
    /// Top-left corner relative to the container, in pixels
    pub position: Vec2,
    pub text: String,
}

/// Everything the detail card shows for one station
#[derive(Debug, Clone, PartialEq)]
pub struct CardContent {
    pub station_id: StationId,
    pub title: String,
    pub image_url: String,
    pub detail_url: String,
}

impl CardContent {
    pub fn for_station(station: &Station, card: &CardSection) -> Self {
        Self {
            station_id: station.id.clone(),
            title: station.name.clone(),
            image_url: format!("{}{}", card.image_base_url, station.image),
            detail_url: format!("{}{}", card.detail_base_url, station.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailCard {
    pub visible: bool,
    pub position: Vec2,
    /// Replaced wholesale every time the card is shown
    pub content: Option<CardContent>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overlays {
    pub label: HoverLabel,
    pub card: DetailCard,
    pub cursor: CursorStyle,
}

impl Overlays {
    pub fn show_label(&mut self, station: &Station, cursor: Vec2, card: &CardSection) {
        self.label.text = station.name.clone();
        self.label.position = cursor + Vec2::from_array(card.label_offset);
        self.label.visible = true;
    }

    pub fn hide_label(&mut self) {
        self.label.visible = false;
    }

    pub fn show_card(&mut self, station: &Station, click: Vec2, card: &CardSection) {
        self.card.content = Some(CardContent::for_station(station, card));
        self.card.position = click + Vec2::from_array(card.card_offset);
        self.card.visible = true;
    }

    pub fn hide_card(&mut self) {
        self.card.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::StationKind;

    fn station() -> Station {
        Station {
            id: StationId("42".to_string()),
            name: "Toolik Field Station".to_string(),
            latitude: 68.6,
            longitude: -149.6,
            image: "toolik.jpg".to_string(),
            kind: StationKind::Station,
            color: None,
        }
    }

    #[test]
    fn test_card_content_urls() {
        let content = CardContent::for_station(&station(), &CardSection::default());
        assert_eq!(content.title, "Toolik Field Station");
        assert_eq!(
            content.image_url,
            "https://interact-gis.org/Files/StationImages/toolik.jpg"
        );
        assert_eq!(content.detail_url, "https://interact-gis.org/Station/42");
    }

    #[test]
    fn test_label_offset_from_cursor() {
        let mut overlays = Overlays::default();
        overlays.show_label(&station(), Vec2::new(100.0, 50.0), &CardSection::default());
        assert!(overlays.label.visible);
        assert_eq!(overlays.label.text, "Toolik Field Station");
        assert_eq!(overlays.label.position, Vec2::new(120.0, 50.0));

        overlays.hide_label();
        assert!(!overlays.label.visible);
    }

    #[test]
    fn test_card_replaced_on_each_show() {
        let mut overlays = Overlays::default();
        let card = CardSection {
            card_offset: [5.0, 5.0],
            ..CardSection::default()
        };
        overlays.show_card(&station(), Vec2::new(10.0, 10.0), &card);
        assert_eq!(overlays.card.position, Vec2::new(15.0, 15.0));

        let mut other = station();
        other.id = StationId("7".to_string());
        other.name = "Other".to_string();
        overlays.show_card(&other, Vec2::new(0.0, 0.0), &card);
        let content = overlays.card.content.as_ref().unwrap();
        assert_eq!(content.title, "Other");
        assert!(content.detail_url.ends_with("/Station/7"));

        overlays.hide_card();
        assert!(!overlays.card.visible);
    }
}
