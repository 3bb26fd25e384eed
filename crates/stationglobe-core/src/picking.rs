//! Pointer picking: cursor → NDC → ray → marker

use glam::{Vec2, Vec3};

use crate::camera::Viewport;
use crate::marker::{MarkerId, MarkerSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Convert a pixel position to normalized device coordinates relative to the
/// container: x grows right, y grows up, both in [-1, 1] inside the box.
pub fn ndc_from_pixel(pixel: Vec2, viewport: &Viewport) -> Vec2 {
    let local = pixel - viewport.origin;
    Vec2::new(
        local.x / viewport.size.x * 2.0 - 1.0,
        -(local.y / viewport.size.y) * 2.0 + 1.0,
    )
}

/// Distance along the ray to the first intersection with a sphere, or `None`
/// when the ray misses or the sphere lies entirely behind the origin.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sqrt_d;
    if far >= 0.0 {
        // Origin inside the sphere
        Some(0.0)
    } else {
        None
    }
}

/// Scan markers in list order and return the first one the ray touches.
///
/// This is first-match, not nearest: when two marker footprints overlap the
/// earlier station in the list wins. Markers on the hemisphere facing away
/// from the camera are skipped since the globe itself blocks them.
pub fn first_hit(
    ray: &Ray,
    markers: &MarkerSet,
    globe_rotation: f32,
    globe_radius: f32,
) -> Option<MarkerId> {
    let globe_hit = ray_sphere(ray, Vec3::ZERO, globe_radius);

    markers.iter().find_map(|marker| {
        let radius = marker.hit_radius();
        let t = ray_sphere(ray, marker.world_center(globe_rotation), radius)?;
        let occluded = globe_hit.is_some_and(|surface| t > surface + 2.0 * radius);
        (!occluded).then_some(marker.id)
    })
}
