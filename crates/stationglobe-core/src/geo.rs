//! Geographic to globe-space conversion
//!
//! Globe space is Y-up with the north pole on +Y, longitude 0 facing +Z and
//! longitude 90°E facing +X.

use glam::Vec3;

/// Place a latitude/longitude (degrees) on a sphere of `radius`, lifted by
/// `relative_altitude` times the radius.
pub fn polar_to_cartesian(lat: f64, lng: f64, radius: f32, relative_altitude: f32) -> Vec3 {
    let lat = lat.to_radians();
    let lng = lng.to_radians();
    let r = f64::from(radius) * (1.0 + f64::from(relative_altitude));
    Vec3::new(
        (r * lat.cos() * lng.sin()) as f32,
        (r * lat.sin()) as f32,
        (r * lat.cos() * lng.cos()) as f32,
    )
}

/// Convert an angular radius on the globe surface (degrees) to world units
pub fn angular_to_world_radius(degrees: f32, globe_radius: f32) -> f32 {
    degrees.to_radians() * globe_radius
}

/// Outward surface normal at a latitude/longitude
pub fn surface_normal(lat: f64, lng: f64) -> Vec3 {
    polar_to_cartesian(lat, lng, 1.0, 0.0).normalize()
}

/// Polylines for a graticule with the given spacing in degrees.
///
/// Parallels run from -90+step to 90-step; meridians span pole to pole.
/// Each polyline is sampled every `segment_deg` degrees.
pub fn graticule_lines(step_deg: f64, segment_deg: f64, radius: f32) -> Vec<Vec<Vec3>> {
    let mut lines = Vec::new();
    if step_deg <= 0.0 || segment_deg <= 0.0 {
        return lines;
    }

    let samples = |span: f64| (span / segment_deg).ceil().max(1.0) as usize;

    let mut lat = -90.0 + step_deg;
    while lat < 90.0 - 1e-9 {
        let n = samples(360.0);
        lines.push(
            (0..=n)
                .map(|i| {
                    let lng = -180.0 + 360.0 * i as f64 / n as f64;
                    polar_to_cartesian(lat, lng, radius, 0.0)
                })
                .collect(),
        );
        lat += step_deg;
    }

    let mut lng = -180.0;
    while lng < 180.0 - 1e-9 {
        let n = samples(180.0);
        lines.push(
            (0..=n)
                .map(|i| {
                    let lat = -90.0 + 180.0 * i as f64 / n as f64;
                    polar_to_cartesian(lat, lng, radius, 0.0)
                })
                .collect(),
        );
        lng += step_deg;
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_cardinal_points() {
        assert!(approx(polar_to_cartesian(0.0, 0.0, 100.0, 0.0), Vec3::new(0.0, 0.0, 100.0)));
        assert!(approx(polar_to_cartesian(0.0, 90.0, 100.0, 0.0), Vec3::new(100.0, 0.0, 0.0)));
        assert!(approx(polar_to_cartesian(90.0, 0.0, 100.0, 0.0), Vec3::new(0.0, 100.0, 0.0)));
        assert!(approx(polar_to_cartesian(-90.0, 45.0, 100.0, 0.0), Vec3::new(0.0, -100.0, 0.0)));
    }

    #[test]
    fn test_altitude_lifts_point() {
        let p = polar_to_cartesian(10.0, 20.0, 100.0, 0.05);
        assert!((p.length() - 105.0).abs() < 1e-3);
    }

    #[test]
    fn test_angular_radius() {
        let r = angular_to_world_radius(0.4, 100.0);
        assert!((r - 0.698_131_7).abs() < 1e-5);
    }

    #[test]
    fn test_graticule_counts() {
        let lines = graticule_lines(30.0, 10.0, 100.0);
        // 5 parallels (-60..60) and 12 meridians
        assert_eq!(lines.len(), 5 + 12);
        for line in &lines {
            for p in line {
                assert!((p.length() - 100.0).abs() < 1e-2);
            }
        }
        assert!(graticule_lines(0.0, 10.0, 100.0).is_empty());
    }
}
