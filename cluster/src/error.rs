use thiserror::Error;

use crate::types::ObsId;

/// Errors returned by clustering operations.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// A neighbor provider could not produce a complete neighbor list.
    /// Never recovered internally: a partial list would silently corrupt
    /// the clustering.
    #[error("neighbor provider error: {0}")]
    Provider(String),

    #[error("observation {0} has no neighborhood table entry")]
    MissingTableEntry(ObsId),
}
