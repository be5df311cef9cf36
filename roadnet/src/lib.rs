//! Road-network distance backing for dwell clustering.
//!
//! Two GPS pings on opposite sides of a river or a dual carriageway can be
//! near-coincident as the crow flies yet far apart by road. This crate
//! keeps a weighted road graph in memory and implements the
//! [`dwell_cluster::NeighborProvider`] contract with driving distance:
//! observations snap to their nearest intersection and neighborhoods are
//! resolved by cost-bounded shortest-path search.

mod error;
mod graph;
mod provider;

pub use error::RoadNetError;
pub use graph::{NodeId, RoadGraph};
pub use provider::NetworkNeighbors;
