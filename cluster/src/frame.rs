use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::dbscan::DensityClusterer;
use crate::error::ClusterError;
use crate::neighbors::NeighborProvider;
use crate::reconcile::{FramePoint, reconcile};
use crate::types::{NOISE, Observation, ObsId, Params};

/// Runs density clustering over a stream too large for one pass by
/// splitting it into overlapping time frames and reconciling cluster
/// identities across frame boundaries.
///
/// Frames are strictly sequential: each reconciliation depends on the
/// finalized global labels of the frame before it.
pub struct FrameSplit<P> {
    clusterer: DensityClusterer<P>,
}

impl<P: NeighborProvider> FrameSplit<P> {
    /// Validates `params` and wraps the provider.
    pub fn new(params: Params, provider: P) -> Result<Self, ClusterError> {
        Ok(Self {
            clusterer: DensityClusterer::new(params, provider)?,
        })
    }

    pub fn params(&self) -> &Params {
        self.clusterer.params()
    }

    /// Clusters the whole stream and returns the global label map
    /// (observation id → global cluster label, `-1` for noise).
    ///
    /// Observations are expected in time order; each frame snapshots the
    /// sub-slice with `unix_time` inside `[start, start + frame_size]`
    /// (both ends inclusive), preserving stream order. Consecutive frame
    /// starts advance by `frame_size - frame_overlap + 1` seconds; frames
    /// keep coming until one covers the stream's last timestamp, so every
    /// observation is labeled. After the last frame, one final
    /// reconciliation against an empty frame flushes the run.
    pub fn run(&mut self, stream: &[Observation]) -> Result<BTreeMap<ObsId, i32>, ClusterError> {
        let mut labels: BTreeMap<ObsId, i32> = BTreeMap::new();
        if stream.is_empty() {
            return Ok(labels);
        }

        let frame_size = self.clusterer.params().frame_size();
        let step = frame_size - self.clusterer.params().frame_overlap() + 1;
        let min_time = stream.iter().map(|o| o.unix_time).min().unwrap_or(0);
        let max_time = stream.iter().map(|o| o.unix_time).max().unwrap_or(0);

        let mut prev_frame: Option<Vec<FramePoint>> = None;
        let mut prev_cluster_map: BTreeMap<i32, i32> = BTreeMap::new();
        let mut start = min_time;

        loop {
            let frame: Vec<Observation> = stream
                .iter()
                .filter(|o| o.unix_time >= start && o.unix_time <= start + frame_size)
                .copied()
                .collect();
            info!(start, len = frame.len(), "clustering frame");

            let assignment = self.clusterer.fit(&frame)?;
            let points: Vec<FramePoint> = frame
                .iter()
                .zip(assignment.labels.iter().zip(assignment.core.iter()))
                .map(|(obs, (&cluster, &core))| FramePoint::new(obs.id, cluster, core))
                .collect();

            match prev_frame.take() {
                Some(prev) => {
                    prev_cluster_map = reconcile(&prev, &points, &mut labels, &mut prev_cluster_map);
                }
                None => {
                    // First frame: local cluster ids double as the initial
                    // global labels, noise included.
                    for p in &points {
                        labels.insert(p.id, p.cluster);
                    }
                    prev_cluster_map = points
                        .iter()
                        .filter(|p| p.cluster > NOISE)
                        .map(|p| (p.cluster, p.cluster))
                        .collect();
                    debug!(clusters = prev_cluster_map.len(), "seeded first frame");
                }
            }

            prev_frame = Some(points);
            // Stop only once a frame has covered the last timestamp. With
            // zero overlap the step exceeds the frame size, so a check on
            // the next start would strand the trailing observations.
            if start + frame_size >= max_time {
                break;
            }
            start += step;
        }

        // One more pass with an empty current frame so the last frame's
        // state goes through the same finalization path as every other.
        if let Some(prev) = prev_frame {
            reconcile(&prev, &[], &mut labels, &mut prev_cluster_map);
        }

        Ok(labels)
    }
}
