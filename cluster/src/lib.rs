//! Incremental spatio-temporal density clustering for GPS observation
//! streams.
//!
//! Observations close in both space and time form density-connected groups
//! with DBSCAN semantics. Streams too large for one clustering pass are
//! split into overlapping time frames; cluster identities are reconciled
//! across frame boundaries so the windowed result is equivalent, up to
//! label renaming, to clustering the whole stream at once.
//!
//! Neighbor retrieval is pluggable through [`NeighborProvider`]:
//! [`PlanarNeighbors`] measures Euclidean distance on projected
//! coordinates, [`TableNeighbors`] reads a precomputed neighborhood table
//! (e.g. road-network distances computed out of band).
//!
//! # Usage
//!
//! ```
//! use dwell_cluster::{FrameSplit, Observation, Params, PlanarNeighbors};
//!
//! let stream = vec![
//!     Observation { id: 0, unix_time: 0, x: 0.0, y: 0.0 },
//!     Observation { id: 1, unix_time: 10, x: 5.0, y: 0.0 },
//!     Observation { id: 2, unix_time: 20, x: 200.0, y: 0.0 },
//!     Observation { id: 3, unix_time: 30, x: 205.0, y: 0.0 },
//! ];
//!
//! let params = Params::new(10.0, 50, 2);
//! let mut split = FrameSplit::new(params, PlanarNeighbors::new()).unwrap();
//! let labels = split.run(&stream).unwrap();
//!
//! assert_eq!(labels[&0], labels[&1]);
//! assert_eq!(labels[&2], labels[&3]);
//! assert_ne!(labels[&0], labels[&2]);
//! ```

mod dbscan;
mod error;
mod frame;
mod neighbors;
mod reconcile;
mod types;

pub use dbscan::{Assignment, DensityClusterer};
pub use error::ClusterError;
pub use frame::FrameSplit;
pub use neighbors::{NeighborProvider, PlanarNeighbors, TableNeighbors};
pub use reconcile::{FramePoint, reconcile};
pub use types::{NOISE, Observation, ObsId, Params, UNVISITED};
