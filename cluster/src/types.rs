use serde::{Deserialize, Serialize};

use crate::error::ClusterError;

/// Stable, stream-wide observation identity.
///
/// This is an opaque key, not an array offset: frames re-index their
/// snapshots locally but always carry the original id alongside.
pub type ObsId = i64;

/// Label of an observation not yet visited by the clusterer.
pub const UNVISITED: i32 = 0;

/// Label of an observation not density-reachable from any core point.
pub const NOISE: i32 = -1;

/// One geo-tagged, time-stamped observation (e.g. a vehicle GPS ping).
///
/// `x`/`y` are coordinates on a projected metric plane. Providers that
/// resolve neighborhoods some other way (a precomputed table, a road
/// network) may ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: ObsId,
    pub unix_time: i64,
    pub x: f64,
    pub y: f64,
}

/// Clustering parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Spatial radius in meters. Neighbors satisfy strict `< d_eps`.
    pub d_eps: f64,

    /// Temporal radius in seconds. Neighbors satisfy `<= t_eps`.
    pub t_eps: i64,

    /// Minimum neighborhood size (including the point itself) for a core
    /// point.
    pub min_samples: usize,

    /// Frame length in seconds. Defaults to `4 * t_eps`.
    #[serde(default)]
    pub frame_size: Option<i64>,

    /// Overlap between consecutive frames in seconds. Defaults to
    /// `2 * t_eps`, which covers the full temporal neighborhood of any
    /// observation near a frame boundary. Must be smaller than the frame
    /// size.
    #[serde(default)]
    pub frame_overlap: Option<i64>,
}

impl Params {
    pub fn new(d_eps: f64, t_eps: i64, min_samples: usize) -> Self {
        Self {
            d_eps,
            t_eps,
            min_samples,
            frame_size: None,
            frame_overlap: None,
        }
    }

    /// Effective frame size after defaulting.
    pub fn frame_size(&self) -> i64 {
        self.frame_size.unwrap_or(4 * self.t_eps)
    }

    /// Effective frame overlap after defaulting.
    pub fn frame_overlap(&self) -> i64 {
        self.frame_overlap.unwrap_or(2 * self.t_eps)
    }

    /// Rejects unusable configurations before any frame is processed.
    pub fn validate(&self) -> Result<(), ClusterError> {
        if !self.d_eps.is_finite() || self.d_eps <= 0.0 {
            return Err(ClusterError::InvalidParams(format!(
                "d_eps must be positive, got {}",
                self.d_eps
            )));
        }
        if self.t_eps <= 0 {
            return Err(ClusterError::InvalidParams(format!(
                "t_eps must be positive, got {}",
                self.t_eps
            )));
        }
        if self.min_samples < 1 {
            return Err(ClusterError::InvalidParams(
                "min_samples must be at least 1".into(),
            ));
        }
        let size = self.frame_size();
        let overlap = self.frame_overlap();
        if size <= 0 {
            return Err(ClusterError::InvalidParams(format!(
                "frame_size must be positive, got {size}"
            )));
        }
        if overlap < 0 {
            return Err(ClusterError::InvalidParams(format!(
                "frame_overlap must not be negative, got {overlap}"
            )));
        }
        if overlap >= size {
            // A non-positive step would re-process the same window forever.
            return Err(ClusterError::InvalidParams(format!(
                "frame_overlap ({overlap}) must be smaller than frame_size ({size})"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_from_t_eps() {
        let p = Params::new(300.0, 200, 3);
        assert_eq!(p.frame_size(), 800);
        assert_eq!(p.frame_overlap(), 400);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn explicit_frame_bounds_win() {
        let mut p = Params::new(300.0, 200, 3);
        p.frame_size = Some(900);
        assert_eq!(p.frame_size(), 900);
        assert_eq!(p.frame_overlap(), 400);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_bad_params() {
        assert!(Params::new(0.0, 200, 3).validate().is_err());
        assert!(Params::new(-1.0, 200, 3).validate().is_err());
        assert!(Params::new(300.0, 0, 3).validate().is_err());
        assert!(Params::new(300.0, 200, 0).validate().is_err());

        let mut p = Params::new(300.0, 200, 3);
        p.frame_size = Some(400);
        p.frame_overlap = Some(400);
        assert!(p.validate().is_err(), "overlap == size must fail");

        p.frame_overlap = Some(500);
        assert!(p.validate().is_err(), "overlap > size must fail");

        p.frame_overlap = Some(-1);
        assert!(p.validate().is_err(), "negative overlap must fail");
    }
}
