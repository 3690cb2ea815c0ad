#![forbid(unsafe_code)]

//! Harmonic Tree Pool
//!
//! Keeps a bounded set of tree nodes alive while a canvas pans and zooms
//! over an infinite tree.
//!
//! # Key Components
//!
//! - [`Engine`] - One tree instance and its handlers
//! - [`LoadController`] - Opens and closes pooled nodes
//! - [`PoolManager`] - Settle-pass reconciliation and eviction
//! - [`SelectionManager`] - Current node and depth fade
//! - [`Viewport`] - Spatial queries the canvas answers
//! - [`ViewportSimulator`] - Headless canvas for tests and benches
//!
//! # How it fits in the system
//! `htree-core` computes every label and frame from a node id alone. This
//! crate decides which ids are worth keeping. The canvas reports what it
//! sees through [`Viewport`] and draws whatever [`PoolChange`]s the engine
//! leaves in its feed.

pub mod changes;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod load;
pub mod pool;
pub mod selection;
pub mod simulator;
pub mod viewport;

pub use changes::{CHANGE_LOG_CAPACITY, ChangeLog, PoolChange, RemovalReason};
pub use config::EngineConfig;
pub use engine::{Command, Engine, PoolStats};
pub use entry::{CreationStamp, EntryState, LoadedNode, PoolEntry};
pub use error::{PoolError, Result};
pub use load::{LoadController, LoadCounters};
pub use pool::{PassReport, PoolManager};
pub use selection::{OpacityTier, SelectionManager};
pub use simulator::ViewportSimulator;
pub use viewport::Viewport;
