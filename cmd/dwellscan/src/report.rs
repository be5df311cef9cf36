use std::collections::{BTreeMap, BTreeSet};

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// One input GPS ping.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    pub lon: f64,
    pub lat: f64,
    pub unix_time: i64,
    #[serde(default)]
    pub vehicle_ref: Option<String>,
    #[serde(default)]
    pub speed_ms: Option<f64>,
}

/// One labelled observation in the output.
#[derive(Debug, Serialize)]
pub struct LabelledPing {
    pub id: i64,
    pub unix_time: i64,
    pub lon: f64,
    pub lat: f64,
    pub cluster: i32,
}

/// Aggregate view of one dwell cluster.
#[derive(Debug, Serialize)]
pub struct ClusterSummary {
    pub cluster: i32,
    pub count: usize,
    pub first_seen: String,
    pub last_seen: String,
    pub mean_lon: f64,
    pub mean_lat: f64,
    pub vehicles: usize,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub labels: Vec<LabelledPing>,
    pub clusters: Vec<ClusterSummary>,
}

fn rfc3339(unix_time: i64) -> String {
    DateTime::from_timestamp(unix_time, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| unix_time.to_string())
}

/// Builds the output report from the sorted input records and the global
/// label map (indexed by position in `records`).
pub fn build(records: &[Record], labels: &BTreeMap<i64, i32>) -> Report {
    let labelled: Vec<LabelledPing> = records
        .iter()
        .enumerate()
        .map(|(i, r)| LabelledPing {
            id: i as i64,
            unix_time: r.unix_time,
            lon: r.lon,
            lat: r.lat,
            cluster: labels.get(&(i as i64)).copied().unwrap_or(-1),
        })
        .collect();

    let mut members: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, ping) in labelled.iter().enumerate() {
        if ping.cluster > 0 {
            members.entry(ping.cluster).or_default().push(i);
        }
    }

    let clusters = members
        .into_iter()
        .map(|(cluster, idx)| {
            let count = idx.len();
            let first = idx.iter().map(|&i| records[i].unix_time).min().unwrap_or(0);
            let last = idx.iter().map(|&i| records[i].unix_time).max().unwrap_or(0);
            let vehicles: BTreeSet<&str> = idx
                .iter()
                .filter_map(|&i| records[i].vehicle_ref.as_deref())
                .collect();
            ClusterSummary {
                cluster,
                count,
                first_seen: rfc3339(first),
                last_seen: rfc3339(last),
                mean_lon: idx.iter().map(|&i| records[i].lon).sum::<f64>() / count as f64,
                mean_lat: idx.iter().map(|&i| records[i].lat).sum::<f64>() / count as f64,
                vehicles: vehicles.len(),
            }
        })
        .collect();

    Report {
        labels: labelled,
        clusters,
    }
}
