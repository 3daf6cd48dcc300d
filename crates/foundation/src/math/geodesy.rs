//! Spherical globe coordinates.
//!
//! The globe is a plain sphere in world units. `project` is the only mapping
//! from geographic to world space; everything placed on the globe goes
//! through it.

use super::Vec3;

pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        has_valid_coordinates(*self)
    }
}

/// Accepts iff `-90 <= lat <= 90` and `-180 <= lon <= 180`; NaN is rejected.
pub fn has_valid_coordinates(p: LatLon) -> bool {
    (-90.0..=90.0).contains(&p.lat) && (-180.0..=180.0).contains(&p.lon)
}

/// Polar to Cartesian on a sphere of `radius` centred at the origin.
///
/// Convention: +Y is the north pole, lon -180 lies on +X.
pub fn project(lat: f64, lon: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat) * DEG2RAD;
    let theta = (lon + 180.0) * DEG2RAD;
    Vec3::new(
        -(radius * phi.sin() * theta.cos()),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

pub fn project_latlon(p: LatLon, radius: f64) -> Vec3 {
    project(p.lat, p.lon, radius)
}

/// Inverse of [`project`]: returns the geographic position and the radius.
///
/// Longitude comes back in `[-180, 180)`; at the poles it is 0.
pub fn unproject(v: Vec3) -> (LatLon, f64) {
    let radius = v.length();
    let horizontal = (v.x * v.x + v.z * v.z).sqrt();
    let lat = v.y.atan2(horizontal) * RAD2DEG;
    if horizontal == 0.0 {
        return (LatLon::new(lat, 0.0), radius);
    }
    let mut lon = v.z.atan2(-v.x) * RAD2DEG - 180.0;
    if lon < -180.0 {
        lon += 360.0;
    }
    (LatLon::new(lat, lon), radius)
}

/// Great-circle midpoint of two positions.
///
/// For (near-)antipodal pairs the midpoint is ambiguous; any point a quarter
/// turn from `a` is returned.
pub fn great_circle_midpoint(a: LatLon, b: LatLon) -> LatLon {
    let va = project_latlon(a, 1.0);
    let vb = project_latlon(b, 1.0);
    let sum = va + vb;
    let dir = match sum.normalized() {
        Some(d) if sum.length() > 1e-9 => d,
        _ => {
            let axis = if va.y.abs() < 0.9 {
                Vec3::new(0.0, 1.0, 0.0)
            } else {
                Vec3::new(1.0, 0.0, 0.0)
            };
            va.cross(axis).normalized().unwrap_or(axis)
        }
    };
    unproject(dir).0
}
