use std::collections::HashMap;

use crate::error::ClusterError;
use crate::types::{Observation, ObsId};

/// Resolves spatio-temporal neighborhoods for one frame of observations.
///
/// Implementations answer with frame-local indices of all *other*
/// observations within strict `< d_eps` spatial distance and non-strict
/// `<= t_eps` temporal distance. The queried index itself is always
/// excluded. The asymmetry between the two comparisons is relied on by the
/// frame reconciliation step and must be preserved.
///
/// A provider may batch or index however it likes inside [`load`], but any
/// failure must surface as an error rather than a truncated neighbor list.
///
/// [`load`]: NeighborProvider::load
pub trait NeighborProvider {
    /// Takes a snapshot of one frame. Called once before the frame's
    /// neighbor queries.
    fn load(&mut self, frame: &[Observation]) -> Result<(), ClusterError>;

    /// Returns the frame-local indices of all other observations within
    /// `d_eps` / `t_eps` of observation `i`.
    fn neighbors(&self, i: usize, d_eps: f64, t_eps: i64) -> Result<Vec<usize>, ClusterError>;
}

/// Planar Euclidean neighbor retrieval over projected coordinates.
///
/// Linear scan per query; fine for frame-sized batches.
#[derive(Debug, Default)]
pub struct PlanarNeighbors {
    frame: Vec<Observation>,
}

impl PlanarNeighbors {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NeighborProvider for PlanarNeighbors {
    fn load(&mut self, frame: &[Observation]) -> Result<(), ClusterError> {
        self.frame = frame.to_vec();
        Ok(())
    }

    fn neighbors(&self, i: usize, d_eps: f64, t_eps: i64) -> Result<Vec<usize>, ClusterError> {
        let a = self.frame[i];
        Ok(self
            .frame
            .iter()
            .enumerate()
            .filter(|(j, b)| {
                *j != i
                    && (b.x - a.x).hypot(b.y - a.y) < d_eps
                    && (b.unix_time - a.unix_time).abs() <= t_eps
            })
            .map(|(j, _)| j)
            .collect())
    }
}

/// Neighbor retrieval from a precomputed neighborhood table.
///
/// The table maps each observation id to the ids of its neighbors under
/// the configured radii, as produced by an external distance engine (for
/// instance a batched shortest-path query over a road network). Queries
/// restrict the stored lists to ids present in the loaded frame; the radii
/// passed to [`NeighborProvider::neighbors`] are ignored because the table
/// already encodes them.
#[derive(Debug)]
pub struct TableNeighbors {
    table: HashMap<ObsId, Vec<ObsId>>,
    frame_ids: Vec<ObsId>,
    index_of: HashMap<ObsId, usize>,
}

impl TableNeighbors {
    pub fn new(table: HashMap<ObsId, Vec<ObsId>>) -> Self {
        Self {
            table,
            frame_ids: Vec::new(),
            index_of: HashMap::new(),
        }
    }
}

impl NeighborProvider for TableNeighbors {
    fn load(&mut self, frame: &[Observation]) -> Result<(), ClusterError> {
        // Fail fast on a hole in the table rather than cluster with a
        // partial neighborhood.
        for obs in frame {
            if !self.table.contains_key(&obs.id) {
                return Err(ClusterError::MissingTableEntry(obs.id));
            }
        }
        self.frame_ids = frame.iter().map(|o| o.id).collect();
        self.index_of = self
            .frame_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();
        Ok(())
    }

    fn neighbors(&self, i: usize, _d_eps: f64, _t_eps: i64) -> Result<Vec<usize>, ClusterError> {
        let id = self.frame_ids[i];
        let entry = self
            .table
            .get(&id)
            .ok_or(ClusterError::MissingTableEntry(id))?;
        Ok(entry
            .iter()
            .filter_map(|n| self.index_of.get(n).copied())
            .filter(|&j| j != i)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(id: ObsId, unix_time: i64, x: f64) -> Observation {
        Observation {
            id,
            unix_time,
            x,
            y: 0.0,
        }
    }

    #[test]
    fn planar_excludes_self() {
        let mut p = PlanarNeighbors::new();
        p.load(&[obs(0, 0, 0.0), obs(1, 0, 1.0)]).unwrap();
        assert_eq!(p.neighbors(0, 10.0, 10).unwrap(), vec![1]);
        assert_eq!(p.neighbors(1, 10.0, 10).unwrap(), vec![0]);
    }

    #[test]
    fn planar_spatial_bound_is_strict() {
        let mut p = PlanarNeighbors::new();
        p.load(&[obs(0, 0, 0.0), obs(1, 0, 10.0)]).unwrap();
        assert!(p.neighbors(0, 10.0, 10).unwrap().is_empty());
        assert_eq!(p.neighbors(0, 10.0 + 1e-9, 10).unwrap(), vec![1]);
    }

    #[test]
    fn planar_temporal_bound_is_inclusive() {
        let mut p = PlanarNeighbors::new();
        p.load(&[obs(0, 0, 0.0), obs(1, 10, 0.0), obs(2, 11, 0.0)])
            .unwrap();
        assert_eq!(p.neighbors(0, 1.0, 10).unwrap(), vec![1]);
    }

    #[test]
    fn table_restricts_to_frame() {
        let mut table = HashMap::new();
        table.insert(5, vec![6, 7, 99]);
        table.insert(6, vec![5]);
        table.insert(7, vec![5]);

        let mut p = TableNeighbors::new(table);
        p.load(&[obs(5, 0, 0.0), obs(6, 0, 0.0)]).unwrap();
        // 7 and 99 are not in this frame.
        assert_eq!(p.neighbors(0, 0.0, 0).unwrap(), vec![1]);
    }

    #[test]
    fn table_missing_entry_fails_at_load() {
        let mut p = TableNeighbors::new(HashMap::new());
        let err = p.load(&[obs(1, 0, 0.0)]).unwrap_err();
        assert!(matches!(err, ClusterError::MissingTableEntry(1)));
    }
}
