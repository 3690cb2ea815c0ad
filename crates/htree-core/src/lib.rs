#![forbid(unsafe_code)]

//! Core: node identity, fraction labels, primality, and child placement.
//!
//! Everything in this crate is a pure function of a [`NodeId`] plus the
//! [`BranchingFactor`] of the tree, except for the memo table inside
//! [`PrimalityOracle`]. No tree graph is ever materialized.

pub mod branching;
pub mod content;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod node_id;
pub mod placement;
pub mod prime;

pub use branching::{BranchingFactor, MAX_BRANCHING_FACTOR};
pub use content::{Boundary, ChildDescriptor, ChildDescriptors, ComputedNode, NodeContent, compute_node};
pub use error::{ConfigError, NodeIdError};
pub use geometry::{Bounds, Point, Transform};
pub use node_id::NodeId;
pub use placement::{place_child, place_parent, world_transform};
pub use prime::{OracleStats, PrimalityOracle, TRIAL_DIVISION_LIMIT};

/// Arbitrary-precision integer used for every label value.
pub use num_bigint::BigUint;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, info_span, trace, trace_span, warn};
