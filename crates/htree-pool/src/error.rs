#![forbid(unsafe_code)]

//! Error types for htree-pool.

use htree_core::{BranchingFactor, ConfigError, NodeId};
use thiserror::Error;

/// Result alias for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors surfaced by the engine.
///
/// Unresolved parents and out-of-range primality tests are recovered inside
/// the pool and never show up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Configuration rejected; the engine state is unchanged.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An id containing digits the current tree does not have.
    #[error("node {id} does not exist in a tree with branching factor {branching}")]
    ForeignId {
        /// The offending id.
        id: NodeId,
        /// Branching factor of the current tree.
        branching: BranchingFactor,
    },
}
