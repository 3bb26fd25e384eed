//! Station records supplied by the hosting page
//!
//! Records are loaded once at startup and never mutated afterwards. The page
//! publishes them with PascalCase keys (`StationName`, `Latitude`, ...);
//! lowercase aliases are accepted for hand-written lists.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StationError {
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Station list must be a JSON array")]
    NotAnArray,
}

/// Station identifier; the page publishes either numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StationId(pub String);

impl StationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for StationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Float(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Which list a station came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationKind {
    /// Research station from the primary list
    #[default]
    Station,
    /// Observer from the secondary list, drawn with its own colour
    Observer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "StationId", alias = "Id", alias = "id")]
    pub id: StationId,
    #[serde(rename = "StationName", alias = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Latitude", alias = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude", alias = "lng", alias = "longitude")]
    pub longitude: f64,
    #[serde(rename = "Image", alias = "image", default)]
    pub image: String,
    #[serde(skip)]
    pub kind: StationKind,
    /// Optional per-station colour tag (`#rrggbb`), overrides the list colour
    #[serde(rename = "Color", alias = "color", default)]
    pub color: Option<String>,
}

impl Station {
    /// Whether the coordinates can be placed on the globe
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Parse a JSON array of station records, tagging each with `kind`.
///
/// Individual records that fail to parse or have unusable coordinates are
/// skipped with a warning; only a malformed document is an error.
pub fn parse_stations(json: &str, kind: StationKind) -> Result<Vec<Station>, StationError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(StationError::NotAnArray);
    };

    let mut stations = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let mut station: Station = match serde_json::from_value(item) {
            Ok(s) => s,
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed station record");
                continue;
            }
        };
        if !station.has_valid_coordinates() {
            warn!(
                index,
                id = %station.id,
                lat = station.latitude,
                lng = station.longitude,
                "Skipping station with invalid coordinates"
            );
            continue;
        }
        station.kind = kind;
        stations.push(station);
    }
    Ok(stations)
}

/// The complete, immutable station set shown on the globe
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

impl StationCatalog {
    /// Concatenate the primary list and the observer list, in that order
    pub fn new(stations: Vec<Station>, observers: Vec<Station>) -> Self {
        let mut all = stations;
        all.extend(observers.into_iter().map(|mut o| {
            o.kind = StationKind::Observer;
            o
        }));
        Self { stations: all }
    }

    pub fn from_json(stations: &str, observers: Option<&str>) -> Result<Self, StationError> {
        let primary = parse_stations(stations, StationKind::Station)?;
        let secondary = match observers {
            Some(json) => parse_stations(json, StationKind::Observer)?,
            None => Vec::new(),
        };
        Ok(Self::new(primary, secondary))
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn get(&self, id: &StationId) -> Option<&Station> {
        self.stations.iter().find(|s| &s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_records() {
        let json = r#"[
            {"StationId": 1, "StationName": "Abisko", "Latitude": 68.35, "Longitude": 18.82, "Image": "abisko.jpg"},
            {"StationId": "zack", "StationName": "Zackenberg", "Latitude": 74.47, "Longitude": -20.57, "Image": "zackenberg.png"}
        ]"#;
        let stations = parse_stations(json, StationKind::Station).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id.as_str(), "1");
        assert_eq!(stations[0].name, "Abisko");
        assert_eq!(stations[1].id.as_str(), "zack");
        assert_eq!(stations[1].image, "zackenberg.png");
        assert!(stations.iter().all(|s| s.kind == StationKind::Station));
    }

    #[test]
    fn test_lowercase_aliases() {
        let json = r##"[{"id": 1, "name": "Station A", "lat": 10, "lng": 20, "image": "a.png", "color": "#00ff00"}]"##;
        let stations = parse_stations(json, StationKind::Station).unwrap();
        assert_eq!(stations[0].name, "Station A");
        assert_eq!(stations[0].latitude, 10.0);
        assert_eq!(stations[0].longitude, 20.0);
        assert_eq!(stations[0].color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_invalid_records_skipped() {
        let json = r#"[
            {"id": 1, "name": "Ok", "lat": 0, "lng": 0},
            {"id": 2, "name": "Too far north", "lat": 95, "lng": 0},
            {"id": 3, "lat": 1, "lng": 1},
            {"id": 4, "name": "Also ok", "lat": -45, "lng": 179.5}
        ]"#;
        let stations = parse_stations(json, StationKind::Station).unwrap();
        let ids: Vec<_> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_not_an_array() {
        let err = parse_stations(r#"{"id": 1}"#, StationKind::Station).unwrap_err();
        assert!(matches!(err, StationError::NotAnArray));
        assert!(parse_stations("not json", StationKind::Station).is_err());
    }

    #[test]
    fn test_catalog_concatenates_observers_last() {
        let catalog = StationCatalog::from_json(
            r#"[{"id": 1, "name": "A", "lat": 1, "lng": 1}]"#,
            Some(r#"[{"id": 9, "name": "Obs", "lat": 2, "lng": 2}]"#),
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.stations()[0].kind, StationKind::Station);
        assert_eq!(catalog.stations()[1].kind, StationKind::Observer);
        assert_eq!(
            catalog.get(&StationId("9".to_string())).map(|s| s.name.as_str()),
            Some("Obs")
        );
    }
}
