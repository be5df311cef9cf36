use std::collections::VecDeque;

use tracing::debug;

use crate::error::ClusterError;
use crate::neighbors::NeighborProvider;
use crate::types::{NOISE, Observation, Params, UNVISITED};

/// Per-observation output of one clustering pass.
///
/// `labels[i]` is `NOISE` or a 1-based frame-local cluster id; `core[i]`
/// marks observations whose neighborhood meets the density threshold.
/// Invariant: a core observation is never noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub labels: Vec<i32>,
    pub core: Vec<bool>,
}

/// Density-based clustering over one finite batch of observations.
///
/// Generic over the neighbor retrieval strategy; the clusterer itself never
/// measures a distance.
pub struct DensityClusterer<P> {
    params: Params,
    provider: P,
}

impl<P: NeighborProvider> DensityClusterer<P> {
    /// Validates `params` and wraps the provider.
    pub fn new(params: Params, provider: P) -> Result<Self, ClusterError> {
        params.validate()?;
        Ok(Self { params, provider })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Runs one DBSCAN pass over `frame`.
    ///
    /// Observations are visited in index order. A seed whose neighborhood
    /// (itself included) is smaller than `min_samples` is provisionally
    /// noise; it can still be pulled into a later cluster as a border
    /// point. Cluster expansion walks an explicit worklist so that chains
    /// of core points grow the cluster without recursion.
    pub fn fit(&mut self, frame: &[Observation]) -> Result<Assignment, ClusterError> {
        let n = frame.len();
        let mut labels = vec![UNVISITED; n];
        let mut core = vec![false; n];
        if n == 0 {
            return Ok(Assignment { labels, core });
        }

        self.provider.load(frame)?;

        let d_eps = self.params.d_eps;
        let t_eps = self.params.t_eps;
        let min_samples = self.params.min_samples;
        let mut cluster_label = 0;

        for i in 0..n {
            if labels[i] != UNVISITED {
                continue;
            }
            let neighbors = self.provider.neighbors(i, d_eps, t_eps)?;
            // The provider never returns the point itself, hence the +1.
            if neighbors.len() + 1 < min_samples {
                labels[i] = NOISE;
                continue;
            }

            cluster_label += 1;
            debug!(seed = i, cluster = cluster_label, "starting cluster");
            labels[i] = cluster_label;
            core[i] = true;

            let mut worklist: VecDeque<usize> = neighbors.into();
            while let Some(j) = worklist.pop_front() {
                if labels[j] == NOISE {
                    // Border point promoted out of noise; it is not core,
                    // so its neighborhood does not extend the cluster.
                    debug!(obs = j, cluster = cluster_label, "promoting border point");
                    labels[j] = cluster_label;
                    continue;
                }
                if labels[j] != UNVISITED {
                    continue;
                }
                labels[j] = cluster_label;
                let expansion = self.provider.neighbors(j, d_eps, t_eps)?;
                if expansion.len() + 1 >= min_samples {
                    core[j] = true;
                    worklist.extend(expansion);
                }
            }
        }

        Ok(Assignment { labels, core })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbors::PlanarNeighbors;
    use crate::types::ObsId;

    fn obs(id: ObsId, unix_time: i64, x: f64) -> Observation {
        Observation {
            id,
            unix_time,
            x,
            y: 0.0,
        }
    }

    fn fit(frame: &[Observation], d_eps: f64, t_eps: i64, min_samples: usize) -> Assignment {
        let mut c = DensityClusterer::new(
            Params::new(d_eps, t_eps, min_samples),
            PlanarNeighbors::new(),
        )
        .unwrap();
        c.fit(frame).unwrap()
    }

    #[test]
    fn empty_input_empty_output() {
        let a = fit(&[], 10.0, 10, 2);
        assert!(a.labels.is_empty());
        assert!(a.core.is_empty());
    }

    #[test]
    fn lone_point_is_noise() {
        let a = fit(&[obs(0, 0, 0.0)], 10.0, 10, 2);
        assert_eq!(a.labels, vec![NOISE]);
        assert_eq!(a.core, vec![false]);
    }

    #[test]
    fn two_separate_clusters() {
        let frame = [
            obs(0, 0, 0.0),
            obs(1, 5, 1.0),
            obs(2, 10, 2.0),
            obs(3, 0, 100.0),
            obs(4, 5, 101.0),
            obs(5, 10, 102.0),
        ];
        let a = fit(&frame, 5.0, 100, 3);
        assert_eq!(a.labels, vec![1, 1, 1, 2, 2, 2]);
        assert_eq!(a.core, vec![true; 6]);
    }

    #[test]
    fn border_point_promoted_from_noise() {
        // Index 0 is visited first with only one neighbor, so it is
        // provisionally noise; the dense seed at index 1 reclaims it.
        let frame = [obs(0, 0, 0.0), obs(1, 0, 5.0), obs(2, 0, 10.0)];
        let a = fit(&frame, 6.0, 10, 3);
        assert_eq!(a.labels, vec![1, 1, 1]);
        assert_eq!(a.core, vec![false, true, false]);
    }

    #[test]
    fn min_samples_one_isolated_points_form_singleton_clusters() {
        let frame = [obs(0, 0, 0.0), obs(1, 0, 100.0), obs(2, 0, 200.0)];
        let a = fit(&frame, 1.0, 10, 1);
        assert_eq!(a.labels, vec![1, 2, 3]);
        assert_eq!(a.core, vec![true, true, true]);
    }

    #[test]
    fn temporal_radius_splits_spatially_coincident_points() {
        // Same spot, but the third ping is too far away in time.
        let frame = [obs(0, 0, 0.0), obs(1, 100, 0.0), obs(2, 1000, 0.0)];
        let a = fit(&frame, 1.0, 100, 2);
        assert_eq!(a.labels, vec![1, 1, NOISE]);
        assert_eq!(a.core, vec![true, true, false]);
    }

    #[test]
    fn density_reachability_chains_through_core_points() {
        // A chain of points each 4m apart; min_samples=2 makes every
        // point core, so the whole chain is one cluster even though the
        // ends are 16m apart.
        let frame: Vec<Observation> = (0..5).map(|i| obs(i, 0, 4.0 * i as f64)).collect();
        let a = fit(&frame, 5.0, 10, 2);
        assert_eq!(a.labels, vec![1; 5]);
        assert_eq!(a.core, vec![true; 5]);
    }

    #[test]
    fn core_flag_implies_clustered() {
        let frame: Vec<Observation> = (0..8).map(|i| obs(i, i * 10, (i % 4) as f64)).collect();
        let a = fit(&frame, 3.0, 25, 3);
        for (i, &is_core) in a.core.iter().enumerate() {
            if is_core {
                assert!(a.labels[i] > 0, "core observation {i} must be clustered");
            }
        }
    }
}
