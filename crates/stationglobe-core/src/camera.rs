//! Perspective camera, container viewport, and orbit controls

use glam::{Mat4, Vec2, Vec3};

use crate::config::{CameraSection, ControlsSection};
use crate::picking::Ray;

/// Bounding box of the element hosting the render surface, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::ZERO,
            size: Vec2::new(width, height),
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// A viewport that can be drawn into and picked against
    pub fn is_usable(&self) -> bool {
        self.size.x.is_finite() && self.size.y.is_finite() && self.size.x >= 1.0 && self.size.y >= 1.0
    }

    pub fn aspect(&self) -> f32 {
        self.size.x / self.size.y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn from_config(section: &CameraSection, viewport: &Viewport) -> Self {
        Self {
            fov_y: section.fov_deg.to_radians(),
            aspect: viewport.aspect(),
            near: section.near,
            far: section.far,
            position: Vec3::from_array(section.position),
            target: Vec3::ZERO,
        }
    }

    /// Recompute the aspect ratio; returns false (and keeps the old aspect)
    /// for a degenerate size
    pub fn set_aspect(&mut self, width: f32, height: f32) -> bool {
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return false;
        }
        self.aspect = width / height;
        true
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray from the camera through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let on_far_plane = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.position, on_far_plane - self.position)
    }

    /// Project a world point to NDC; `None` when it is behind the camera
    pub fn project_to_ndc(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }
}

/// Map NDC back to a pixel position inside `viewport`
pub fn pixel_from_ndc(ndc: Vec2, viewport: &Viewport) -> Vec2 {
    Vec2::new(
        viewport.origin.x + (ndc.x + 1.0) * 0.5 * viewport.size.x,
        viewport.origin.y + (1.0 - ndc.y) * 0.5 * viewport.size.y,
    )
}

const MIN_POLAR_ANGLE: f32 = 1e-3;

/// Orbit camera around the globe centre: drag rotates, wheel zooms, no pan.
///
/// Input moves the target pose; `update` eases the current pose toward it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Angle around the vertical axis, measured from +Z toward +X
    pub azimuth: f32,
    pub target_azimuth: f32,
    /// Angle from the north pole
    pub polar: f32,
    pub target_polar: f32,
    pub distance: f32,
    pub target_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar_angle: f32,
    pub smooth_factor: f32,
}

impl OrbitControls {
    /// Derive the starting pose from the configured camera position
    pub fn from_config(section: &ControlsSection, start: Vec3) -> Self {
        let distance = start
            .length()
            .clamp(section.min_distance, section.max_distance);
        let max_polar = section.max_polar_angle.clamp(MIN_POLAR_ANGLE, std::f32::consts::PI);
        let polar = if start.length() > f32::EPSILON {
            (start.y / start.length()).clamp(-1.0, 1.0).acos()
        } else {
            max_polar
        }
        .clamp(MIN_POLAR_ANGLE, max_polar);
        let azimuth = start.x.atan2(start.z);

        Self {
            azimuth,
            target_azimuth: azimuth,
            polar,
            target_polar: polar,
            distance,
            target_distance: distance,
            rotate_speed: section.rotate_speed,
            zoom_speed: section.zoom_speed,
            min_distance: section.min_distance,
            max_distance: section.max_distance,
            max_polar_angle: max_polar,
            smooth_factor: section.smooth_factor,
        }
    }

    /// Apply a pointer drag of `delta` pixels; a drag across the full
    /// viewport height turns the globe once at rotate speed 1
    pub fn rotate(&mut self, delta: Vec2, viewport: &Viewport) {
        if !viewport.is_usable() {
            return;
        }
        let per_pixel = std::f32::consts::TAU / viewport.size.y * self.rotate_speed;
        self.target_azimuth -= delta.x * per_pixel;
        self.target_polar = (self.target_polar - delta.y * per_pixel)
            .clamp(MIN_POLAR_ANGLE, self.max_polar_angle);
    }

    /// Apply wheel notches; positive values zoom in
    pub fn zoom(&mut self, notches: f32) {
        let step = 0.95_f32.powf(self.zoom_speed);
        self.target_distance = (self.target_distance * step.powf(notches))
            .clamp(self.min_distance, self.max_distance);
    }

    /// Scale the distance directly (pinch gestures)
    pub fn zoom_by_factor(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.target_distance =
                (self.target_distance * factor).clamp(self.min_distance, self.max_distance);
        }
    }

    /// Ease toward the target pose and return the resulting camera position
    pub fn update(&mut self, dt: f32) -> Vec3 {
        let lerp = 1.0 - (-self.smooth_factor * 60.0 * dt.max(0.0)).exp();
        self.azimuth += (self.target_azimuth - self.azimuth) * lerp;
        self.polar += (self.target_polar - self.polar) * lerp;
        self.distance += (self.target_distance - self.distance) * lerp;
        self.position()
    }

    pub fn position(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        Vec3::new(
            self.distance * sin_p * sin_a,
            self.distance * cos_p,
            self.distance * sin_p * cos_a,
        )
    }
}
