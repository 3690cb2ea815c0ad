#![forbid(unsafe_code)]

//! Harmonic tree public facade crate.
//!
//! Re-exports the common types of `htree-core` and `htree-pool` and offers
//! a prelude for day-to-day usage.
//!
//! # Example
//!
//! ```
//! use htree::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::default())?;
//! let mut view = ViewportSimulator::new(engine.branching_factor());
//! engine.handle_settle(&mut view)?;
//!
//! let left: NodeId = "aa".parse()?;
//! let label = engine.content(&left).expect("prefetched");
//! assert_eq!((label.top.to_string(), label.bottom.to_string()), ("2".into(), "3".into()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// --- Core re-exports -------------------------------------------------------

pub use htree_core::{
    BigUint, Boundary, Bounds, BranchingFactor, ChildDescriptor, ChildDescriptors, ComputedNode,
    ConfigError, MAX_BRANCHING_FACTOR, NodeContent, NodeId, NodeIdError, OracleStats, Point,
    PrimalityOracle, Transform, compute_node, place_child, place_parent, world_transform,
};

// --- Pool re-exports -------------------------------------------------------

pub use htree_pool::{
    Command, CreationStamp, Engine, EngineConfig, OpacityTier, PassReport, PoolChange,
    PoolError, PoolStats, RemovalReason, Viewport, ViewportSimulator,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type.
pub type Error = PoolError;

/// Standard result type for htree APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BranchingFactor, Engine, EngineConfig, Error, NodeContent, NodeId, OpacityTier,
        PoolChange, Result, Viewport, ViewportSimulator,
    };

    pub use crate::{core, pool};
}

pub use htree_core as core;
pub use htree_pool as pool;
