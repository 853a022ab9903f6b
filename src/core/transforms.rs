//! Coordinate transformations between Earth-centered Cartesian points and
//! geographic coordinates.
//!
//! All conversions use a spherical Earth with radius [`EARTH_RADIUS_KM`].
//! Depth is measured downward from that sphere, so points inside the Earth
//! have positive depth.

use rayon::prelude::*;

/// Reference Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees, in (-180, 180].
    pub lon: f64,
    /// Depth in kilometers below the reference sphere.
    pub depth: f64,
}

/// Geographic coordinates for a whole point set, stored column-wise.
#[derive(Debug, Clone, Default)]
pub struct GeoColumns {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub depth: Vec<f64>,
}

impl GeoColumns {
    /// Returns the number of projected points.
    #[inline]
    pub fn len(&self) -> usize {
        self.lon.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }
}

/// Convert a Cartesian point (km) to latitude, longitude and depth.
///
/// Undefined at the origin, which does not occur for survey data.
#[inline]
pub fn xyz_to_geo(point: &[f64; 3]) -> GeoPoint {
    let [x, y, z] = *point;
    let rxy = x.hypot(y);
    let r = (x * x + y * y + z * z).sqrt();

    GeoPoint {
        lat: z.atan2(rxy).to_degrees(),
        lon: y.atan2(x).to_degrees(),
        depth: EARTH_RADIUS_KM - r,
    }
}

/// Convert latitude, longitude and depth back to a Cartesian point (km).
#[inline]
pub fn geo_to_xyz(geo: &GeoPoint) -> [f64; 3] {
    let r = EARTH_RADIUS_KM - geo.depth;
    let lat = geo.lat.to_radians();
    let lon = geo.lon.to_radians();

    [
        r * lat.cos() * lon.cos(),
        r * lat.cos() * lon.sin(),
        r * lat.sin(),
    ]
}

/// Project every point to geographic coordinates.
///
/// The projection is parallelized across points; output order matches input.
pub fn project_points(points: &[[f64; 3]]) -> GeoColumns {
    let projected: Vec<GeoPoint> = points.par_iter().map(xyz_to_geo).collect();

    let mut columns = GeoColumns {
        lat: Vec::with_capacity(projected.len()),
        lon: Vec::with_capacity(projected.len()),
        depth: Vec::with_capacity(projected.len()),
    };

    for geo in projected {
        columns.lat.push(geo.lat);
        columns.lon.push(geo.lon);
        columns.depth.push(geo.depth);
    }

    columns
}

/// Horizontal distance (km) from the 0° meridian along a parallel.
///
/// Equirectangular approximation at latitude `lat_deg`.
#[inline]
pub fn lon_to_km(lon_deg: f64, lat_deg: f64) -> f64 {
    EARTH_RADIUS_KM * lat_deg.to_radians().cos() * lon_deg.to_radians()
}
