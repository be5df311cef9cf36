//! Geographic primitives for the dwell clustering pipeline.
//!
//! GPS observations arrive as WGS84 longitude/latitude pairs, but the
//! clustering radius is expressed in meters. [`LocalProjection`] maps
//! lon/lat onto a local equirectangular plane centered on the data extent,
//! which keeps pairwise distances accurate to well under 0.1% over
//! city-scale extents (a few kilometers).

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A WGS84 coordinate pair, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A position on a local metric plane, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point, in meters.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Great-circle distance between two WGS84 coordinates, in meters.
pub fn haversine_m(a: LonLat, b: LonLat) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Equirectangular projection onto a metric plane tangent at the mean
/// latitude of the input extent.
///
/// All coordinates projected through one instance share the same plane, so
/// their pairwise Euclidean distances approximate ground distances.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    lon_scale: f64,
}

impl LocalProjection {
    /// Builds a projection centered on the mean latitude of `coords`.
    /// Falls back to the equator for an empty slice.
    pub fn for_extent(coords: &[LonLat]) -> Self {
        let lat0 = if coords.is_empty() {
            0.0
        } else {
            coords.iter().map(|c| c.lat).sum::<f64>() / coords.len() as f64
        };
        Self::at_latitude(lat0)
    }

    /// Builds a projection tangent at the given latitude, in degrees.
    pub fn at_latitude(lat0: f64) -> Self {
        Self {
            lon_scale: lat0.to_radians().cos(),
        }
    }

    /// Projects a lon/lat coordinate onto the plane.
    pub fn project(&self, c: LonLat) -> Point {
        Point {
            x: EARTH_RADIUS_M * c.lon.to_radians() * self.lon_scale,
            y: EARTH_RADIUS_M * c.lat.to_radians(),
        }
    }
}
