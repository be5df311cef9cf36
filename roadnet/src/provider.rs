use dwell_cluster::{ClusterError, NeighborProvider, Observation};
use dwell_geo::Point;
use tracing::debug;

use crate::error::RoadNetError;
use crate::graph::{NodeId, RoadGraph};

/// Neighbor retrieval by road-network driving distance.
///
/// Each observation is snapped to its nearest intersection when the frame
/// is loaded. A neighbor query prefilters candidates by straight-line
/// distance (network distance can never be shorter) and the temporal
/// radius, then runs one cost-bounded shortest-path search from the query
/// point's intersection. The network distance between two observations is
/// snap-out + path + snap-in; like the straight-line case it must satisfy
/// strict `< d_eps`.
pub struct NetworkNeighbors {
    graph: RoadGraph,
    frame: Vec<Observation>,
    snapped: Vec<(NodeId, f64)>,
}

impl NetworkNeighbors {
    pub fn new(graph: RoadGraph) -> Self {
        Self {
            graph,
            frame: Vec::new(),
            snapped: Vec::new(),
        }
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }
}

impl NeighborProvider for NetworkNeighbors {
    fn load(&mut self, frame: &[Observation]) -> Result<(), ClusterError> {
        let mut snapped = Vec::with_capacity(frame.len());
        for obs in frame {
            let snap = self
                .graph
                .nearest_node(Point::new(obs.x, obs.y))
                .ok_or_else(|| ClusterError::Provider(RoadNetError::EmptyGraph.to_string()))?;
            snapped.push(snap);
        }
        debug!(len = frame.len(), "snapped frame to road network");
        self.frame = frame.to_vec();
        self.snapped = snapped;
        Ok(())
    }

    fn neighbors(&self, i: usize, d_eps: f64, t_eps: i64) -> Result<Vec<usize>, ClusterError> {
        let a = self.frame[i];
        let (node_a, snap_a) = self.snapped[i];

        // Straight-line prefilter; only candidates that pass need a
        // network distance.
        let candidates: Vec<usize> = self
            .frame
            .iter()
            .enumerate()
            .filter(|(j, b)| {
                *j != i
                    && (b.unix_time - a.unix_time).abs() <= t_eps
                    && (b.x - a.x).hypot(b.y - a.y) < d_eps
            })
            .map(|(j, _)| j)
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let costs = self
            .graph
            .shortest_paths_within(node_a, d_eps)
            .map_err(|e| ClusterError::Provider(e.to_string()))?;

        Ok(candidates
            .into_iter()
            .filter(|&j| {
                let (node_b, snap_b) = self.snapped[j];
                costs
                    .get(&node_b)
                    .is_some_and(|path| snap_a + path + snap_b < d_eps)
            })
            .collect())
    }
}
