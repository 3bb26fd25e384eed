//! Configuration loading and validation
//!
//! Every section has serde defaults matching the stock globe page, so an
//! empty (or absent) file yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid colour '{0}', expected #rrggbb")]
    InvalidColor(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobeConfig {
    #[serde(default)]
    pub globe: GlobeSection,
    #[serde(default)]
    pub markers: MarkerSection,
    #[serde(default)]
    pub camera: CameraSection,
    #[serde(default)]
    pub controls: ControlsSection,
    #[serde(default)]
    pub lighting: LightingSection,
    #[serde(default)]
    pub card: CardSection,
    #[serde(default)]
    pub page: PageSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobeSection {
    /// Globe radius in world units
    #[serde(default = "default_globe_radius")]
    pub radius: f32,
    /// Rotation about the vertical axis applied every frame (radians)
    #[serde(default = "default_rotation_per_frame")]
    pub rotation_per_frame: f32,
    /// Surface texture (relative path or URL)
    #[serde(default = "default_texture_url")]
    pub texture_url: String,
    #[serde(default = "default_true")]
    pub show_graticules: bool,
    #[serde(default)]
    pub show_atmosphere: bool,
}

impl Default for GlobeSection {
    fn default() -> Self {
        Self {
            radius: default_globe_radius(),
            rotation_per_frame: default_rotation_per_frame(),
            texture_url: default_texture_url(),
            show_graticules: true,
            show_atmosphere: false,
        }
    }
}

fn default_globe_radius() -> f32 {
    100.0
}

fn default_rotation_per_frame() -> f32 {
    0.0003
}

fn default_texture_url() -> String {
    "./textures/earth-texture.png".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSection {
    /// Marker radius in angular degrees on the globe surface
    #[serde(default = "default_point_radius")]
    pub radius_deg: f32,
    /// Altitude relative to the globe radius (0 = flat on the surface)
    #[serde(default)]
    pub altitude: f32,
    /// Radial segments of the marker disc
    #[serde(default = "default_point_resolution")]
    pub resolution: u32,
    /// Scale multiplier applied to the hovered marker
    #[serde(default = "default_emphasis_factor")]
    pub emphasis_factor: f32,
    #[serde(default = "default_station_color")]
    pub station_color: String,
    #[serde(default = "default_observer_color")]
    pub observer_color: String,
}

impl Default for MarkerSection {
    fn default() -> Self {
        Self {
            radius_deg: default_point_radius(),
            altitude: 0.0,
            resolution: default_point_resolution(),
            emphasis_factor: default_emphasis_factor(),
            station_color: default_station_color(),
            observer_color: default_observer_color(),
        }
    }
}

fn default_point_radius() -> f32 {
    0.4
}

fn default_point_resolution() -> u32 {
    32
}

fn default_emphasis_factor() -> f32 {
    1.4
}

fn default_station_color() -> String {
    "#ff0000".to_string()
}

fn default_observer_color() -> String {
    "#ffcc00".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSection {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_deg: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Initial camera position; the orbit controls clamp its distance
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            fov_deg: default_fov(),
            near: default_near(),
            far: default_far(),
            position: default_camera_position(),
        }
    }
}

fn default_fov() -> f32 {
    75.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 200.0, 200.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsSection {
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f32,
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    /// Largest angle from the north pole the camera may reach (radians)
    #[serde(default = "default_max_polar_angle")]
    pub max_polar_angle: f32,
    /// Easing rate toward the target pose
    #[serde(default = "default_smooth_factor")]
    pub smooth_factor: f32,
}

impl Default for ControlsSection {
    fn default() -> Self {
        Self {
            zoom_speed: default_zoom_speed(),
            rotate_speed: default_rotate_speed(),
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            max_polar_angle: default_max_polar_angle(),
            smooth_factor: default_smooth_factor(),
        }
    }
}

fn default_zoom_speed() -> f32 {
    0.6
}

fn default_rotate_speed() -> f32 {
    0.5
}

fn default_min_distance() -> f32 {
    120.0
}

fn default_max_distance() -> f32 {
    200.0
}

fn default_max_polar_angle() -> f32 {
    std::f32::consts::FRAC_PI_2
}

fn default_smooth_factor() -> f32 {
    0.15
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingSection {
    #[serde(default = "default_ambient_color")]
    pub ambient_color: String,
    #[serde(default = "default_directional_intensity")]
    pub directional_intensity: f32,
    #[serde(default = "default_directional_direction")]
    pub directional_position: [f32; 3],
}

impl Default for LightingSection {
    fn default() -> Self {
        Self {
            ambient_color: default_ambient_color(),
            directional_intensity: default_directional_intensity(),
            directional_position: default_directional_direction(),
        }
    }
}

fn default_ambient_color() -> String {
    "#bbbbbb".to_string()
}

fn default_directional_intensity() -> f32 {
    0.3
}

fn default_directional_direction() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSection {
    /// Prefix joined with the station's image filename
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    /// Prefix joined with the station id for the "more information" link
    #[serde(default = "default_detail_base_url")]
    pub detail_base_url: String,
    /// Hover label offset from the cursor, in pixels
    #[serde(default = "default_label_offset")]
    pub label_offset: [f32; 2],
    /// Detail card offset from the click point, in pixels
    #[serde(default)]
    pub card_offset: [f32; 2],
}

impl Default for CardSection {
    fn default() -> Self {
        Self {
            image_base_url: default_image_base_url(),
            detail_base_url: default_detail_base_url(),
            label_offset: default_label_offset(),
            card_offset: [0.0, 0.0],
        }
    }
}

fn default_image_base_url() -> String {
    "https://interact-gis.org/Files/StationImages/".to_string()
}

fn default_detail_base_url() -> String {
    "https://interact-gis.org/Station/".to_string()
}

fn default_label_offset() -> [f32; 2] {
    [20.0, 0.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSection {
    /// Id of the element that hosts the render surface
    #[serde(default = "default_container_id")]
    pub container_id: String,
    /// Window title for native builds
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for PageSection {
    fn default() -> Self {
        Self {
            container_id: default_container_id(),
            title: default_title(),
        }
    }
}

fn default_container_id() -> String {
    "globe-container".to_string()
}

fn default_title() -> String {
    "Station Globe".to_string()
}

impl GlobeConfig {
    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GlobeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the viewer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.globe.radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "globe.radius must be positive, got {}",
                self.globe.radius
            )));
        }
        if !(self.camera.fov_deg > 0.0 && self.camera.fov_deg < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_deg must be in (0, 180), got {}",
                self.camera.fov_deg
            )));
        }
        if !(self.camera.near > 0.0 && self.camera.near < self.camera.far) {
            return Err(ConfigError::Invalid(
                "camera.near must be positive and below camera.far".to_string(),
            ));
        }
        for (name, value) in [
            ("globe.radius", self.globe.radius),
            ("globe.rotation_per_frame", self.globe.rotation_per_frame),
            ("markers.radius_deg", self.markers.radius_deg),
            ("markers.altitude", self.markers.altitude),
            ("markers.emphasis_factor", self.markers.emphasis_factor),
            ("camera.near", self.camera.near),
            ("camera.far", self.camera.far),
            ("controls.zoom_speed", self.controls.zoom_speed),
            ("controls.rotate_speed", self.controls.rotate_speed),
            ("controls.min_distance", self.controls.min_distance),
            ("controls.max_distance", self.controls.max_distance),
            ("controls.max_polar_angle", self.controls.max_polar_angle),
            ("controls.smooth_factor", self.controls.smooth_factor),
            ("lighting.directional_intensity", self.lighting.directional_intensity),
        ] {
            ensure_finite(name, value)?;
        }
        for (name, values) in [
            ("camera.position", self.camera.position),
            ("lighting.directional_position", self.lighting.directional_position),
        ] {
            for value in values {
                ensure_finite(name, value)?;
            }
        }
        if !(self.controls.min_distance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "controls.min_distance must be positive, got {}",
                self.controls.min_distance
            )));
        }
        if !(self.controls.min_distance <= self.controls.max_distance) {
            return Err(ConfigError::Invalid(format!(
                "controls.min_distance ({}) exceeds controls.max_distance ({})",
                self.controls.min_distance, self.controls.max_distance
            )));
        }
        if !(self.controls.max_polar_angle > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "controls.max_polar_angle must be positive, got {}",
                self.controls.max_polar_angle
            )));
        }
        if !(self.markers.emphasis_factor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "markers.emphasis_factor must be positive, got {}",
                self.markers.emphasis_factor
            )));
        }
        hex_to_rgb(&self.markers.station_color)?;
        hex_to_rgb(&self.markers.observer_color)?;
        hex_to_rgb(&self.lighting.ambient_color)?;
        Ok(())
    }
}

fn ensure_finite(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must be a finite number, got {}", name, value)))
    }
}

/// Parse a `#rrggbb` colour into linear-agnostic 0.0-1.0 components
pub fn hex_to_rgb(hex: &str) -> Result<[f32; 3], ConfigError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ConfigError::InvalidColor(hex.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| ConfigError::InvalidColor(hex.to_string()))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<GlobeConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = GlobeConfig::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(GlobeConfig::default())
    }
}

/// Save the default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = GlobeConfig::default().to_toml_string()?;
    std::fs::write(path, content)?;
    Ok(())
}
