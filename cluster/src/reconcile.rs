//! Cross-frame cluster reconciliation.
//!
//! Consecutive frames overlap in time, so a cluster discovered in the
//! current frame usually shares observations with clusters finalized in
//! the previous one. This module decides which local clusters continue an
//! established global cluster, which reveal that two global clusters were
//! really one, and which are genuinely new — and keeps the stream-wide
//! label map consistent throughout.
//!
//! Two clusters are considered density-connected across frames when the
//! observations they share satisfy either merge criterion:
//!
//! - **common core**: some shared observation is a core point in both
//!   assignments;
//! - **core plus marginal**: some shared observation is a core point in
//!   one assignment and at least a border point (not noise) in the other.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::types::{NOISE, ObsId};

/// The per-observation state a frame leaves behind for reconciliation:
/// its stream-wide id, frame-local cluster label, and core flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePoint {
    pub id: ObsId,
    pub cluster: i32,
    pub core: bool,
}

impl FramePoint {
    pub fn new(id: ObsId, cluster: i32, core: bool) -> Self {
        Self { id, cluster, core }
    }
}

/// Pair of merge-rule accumulators for one previous cluster sharing
/// observations with a current cluster.
#[derive(Default)]
struct MergeEvidence {
    common_core: bool,
    core_plus_marginal: bool,
}

impl MergeEvidence {
    fn satisfied(&self) -> bool {
        self.common_core && self.core_plus_marginal
    }
}

/// Reconciles the current frame's local clustering against the previous
/// frame's finalized state.
///
/// `labels` is the running stream-wide result (id → global label, `-1` for
/// noise) and `prev_cluster_map` resolves the previous frame's local
/// cluster ids to global labels. Both are updated in place. The returned
/// lookup maps the *current* frame's local cluster ids to global labels
/// and becomes the caller's `prev_cluster_map` for the next call.
///
/// An empty `curr` is a no-op pass-through and returns an empty lookup.
pub fn reconcile(
    prev: &[FramePoint],
    curr: &[FramePoint],
    labels: &mut BTreeMap<ObsId, i32>,
    prev_cluster_map: &mut BTreeMap<i32, i32>,
) -> BTreeMap<i32, i32> {
    let prev_by_id: HashMap<ObsId, FramePoint> = prev.iter().map(|p| (p.id, *p)).collect();
    let curr_by_id: HashMap<ObsId, FramePoint> = curr.iter().map(|p| (p.id, *p)).collect();

    // Step A: the current frame may reveal that two clusters finalized as
    // distinct in the previous frame are one underlying cluster. For each
    // current cluster, group its shared observations by previous cluster
    // and collect the previous clusters for which both merge criteria
    // hold; two or more of them merge into the minimum global label.
    let mut merge_groups: Vec<Vec<i32>> = Vec::new();
    for &cluster in &clusters_in_appearance_order(curr) {
        let mut evidence: BTreeMap<i32, MergeEvidence> = BTreeMap::new();
        for point in curr.iter().filter(|p| p.cluster == cluster) {
            let Some(before) = prev_by_id.get(&point.id) else {
                continue;
            };
            if before.cluster == NOISE {
                continue;
            }
            let e = evidence.entry(before.cluster).or_default();
            e.common_core |= point.core && before.core;
            // Both sides are non-noise here, so one core point suffices.
            e.core_plus_marginal |= point.core || before.core;
        }
        let qualifying: Vec<i32> = evidence
            .iter()
            .filter(|(_, e)| e.satisfied())
            .map(|(&c, _)| c)
            .collect();
        if qualifying.len() > 1 {
            merge_groups.push(qualifying);
        }
    }

    for group in merge_groups {
        // Previous clusters without a map entry contributed no global
        // label and are left out of the merge.
        let mapped: Vec<(i32, i32)> = group
            .iter()
            .filter_map(|c| prev_cluster_map.get(c).map(|&g| (*c, g)))
            .collect();
        if mapped.len() < 2 {
            continue;
        }
        let merged: Vec<i32> = mapped.iter().map(|&(_, g)| g).collect();
        let canonical = merged.iter().copied().fold(i32::MAX, i32::min);
        debug!(?merged, canonical, "merging previous global clusters");
        for label in labels.values_mut() {
            if merged.contains(label) {
                *label = canonical;
            }
        }
        for (prev_cluster, _) in &mapped {
            prev_cluster_map.insert(*prev_cluster, canonical);
        }
    }

    // Step B: decide which current clusters continue an established global
    // cluster. When one current cluster is claimed by several previous
    // global clusters that step A did not merge, the entry for the largest
    // previous local cluster id wins; the ambiguity is inherent to the
    // method and this tie-break keeps it deterministic.
    let mut clusters_to_merge: BTreeMap<i32, i32> = BTreeMap::new();
    for (&prev_cluster, &global) in prev_cluster_map.iter() {
        let mut common_core = false;
        let mut core_plus_marginal = false;
        let mut continued_into: Vec<i32> = Vec::new();
        for point in prev.iter().filter(|p| p.cluster == prev_cluster) {
            let Some(now) = curr_by_id.get(&point.id) else {
                continue;
            };
            common_core |= point.core && now.core;
            core_plus_marginal |= now.cluster != NOISE && (point.core || now.core);
            if now.cluster != NOISE && !continued_into.contains(&now.cluster) {
                continued_into.push(now.cluster);
            }
        }
        if common_core || core_plus_marginal {
            for cluster in continued_into {
                debug!(cluster, global, "current cluster continues global cluster");
                clusters_to_merge.insert(cluster, global);
            }
        }
    }

    // Step C: final per-observation relabeling in frame row order.
    let mut current_frame_cluster_lookup: BTreeMap<i32, i32> = BTreeMap::new();
    for point in curr {
        if labels.get(&point.id).is_some_and(|&l| l > NOISE) {
            // Already resolved in an earlier frame; never downgraded.
            continue;
        }
        if let Some(&global) = clusters_to_merge.get(&point.cluster) {
            labels.insert(point.id, global);
            current_frame_cluster_lookup.insert(point.cluster, global);
        } else if let Some(&global) = current_frame_cluster_lookup.get(&point.cluster) {
            labels.insert(point.id, global);
        } else if point.cluster != NOISE {
            let fresh = next_global_label(labels);
            debug!(obs = point.id, fresh, "allocating fresh global cluster");
            current_frame_cluster_lookup.insert(point.cluster, fresh);
            labels.insert(point.id, fresh);
        } else {
            labels.insert(point.id, NOISE);
        }
    }

    current_frame_cluster_lookup
}

/// Local cluster ids of `frame` in order of first appearance, noise
/// excluded.
fn clusters_in_appearance_order(frame: &[FramePoint]) -> Vec<i32> {
    let mut order = Vec::new();
    for p in frame {
        if p.cluster != NOISE && !order.contains(&p.cluster) {
            order.push(p.cluster);
        }
    }
    order
}

/// Strictly greater than every global label minted so far.
fn next_global_label(labels: &BTreeMap<ObsId, i32>) -> i32 {
    labels.values().copied().max().unwrap_or(0).max(0) + 1
}
