#![forbid(unsafe_code)]

//! The single owner of one tree instance.
//!
//! [`Engine`] ties the loader, the selection and the reconciler together
//! behind handler methods the canvas calls when it opens or closes a node,
//! when the user taps one, and when the view comes to rest. Every handler runs to completion before
//! returning, and `&mut self` keeps them from interleaving.
//!
//! Handlers leave their visible effects in a change feed the canvas drains
//! with [`Engine::drain_changes`]. Handlers can also be queued as
//! [`Command`]s and run in one batch with [`Engine::run_pending`].

use std::collections::VecDeque;

use htree_core::{BranchingFactor, NodeContent, NodeId, OracleStats, Transform, place_child};
use tracing::{debug, info};

use crate::changes::{PoolChange, RemovalReason};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::load::{LoadController, LoadCounters};
use crate::pool::{PassReport, PoolManager};
use crate::selection::{OpacityTier, SelectionManager};
use crate::viewport::Viewport;

/// A deferred handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// [`Engine::handle_open`].
    Open {
        /// Node to open.
        id: NodeId,
        /// Generations to open below it.
        depth: usize,
    },
    /// [`Engine::handle_close`].
    Close {
        /// Node to close.
        id: NodeId,
    },
    /// [`Engine::handle_select`].
    Select {
        /// Node to make current.
        id: NodeId,
    },
    /// [`Engine::handle_settle`].
    Settle,
    /// [`Engine::set_branching_factor`].
    SetBranchingFactor(BranchingFactor),
}

/// Snapshot of engine-wide numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Pooled entries.
    pub len: usize,
    /// Configured soft cap.
    pub max_pool_size: usize,
    /// Settle passes run.
    pub passes: u64,
    /// Lifetime load counters, across resets.
    pub counters: LoadCounters,
    /// Memo table counters of the primality oracle.
    pub oracle: OracleStats,
    /// Changes lost because the feed was not drained in time.
    pub dropped_changes: u64,
}

/// One explicit tree instance.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    loader: LoadController,
    selection: SelectionManager,
    pool: PoolManager,
    queue: VecDeque<Command>,
    settle_requested: bool,
}

impl Engine {
    /// Validate `config` and open the root of a fresh tree.
    ///
    /// A settle is requested so the canvas runs a first pass once the root
    /// is drawn.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let mut engine = Self {
            loader: LoadController::new(config.branching_factor),
            config,
            selection: SelectionManager::new(),
            pool: PoolManager::new(),
            queue: VecDeque::new(),
            settle_requested: false,
        };
        engine.open_root()?;
        Ok(engine)
    }

    /// Engine configured from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::new(EngineConfig::from_env())
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Branching factor of the current tree.
    #[inline]
    #[must_use]
    pub fn branching_factor(&self) -> BranchingFactor {
        self.loader.branching()
    }

    // ────────────────────────────────────────────────────────────────────
    // Handlers
    // ────────────────────────────────────────────────────────────────────

    /// The canvas asked for `id` and `depth` generations below it.
    ///
    /// With ancestor prefetch enabled, the parent chain up to `depth` levels
    /// is opened first. Returns the number of entries created.
    ///
    /// Creating the root requests a settle pass.
    pub fn handle_open(&mut self, id: &NodeId, depth: usize) -> Result<usize> {
        let root_missing = !self.loader.contains(&NodeId::root());
        let created = if self.config.prefetch_ancestors {
            self.loader.open_with_ancestors(id, depth, depth)?
        } else {
            self.loader.open(id, depth)?
        };
        if root_missing && self.loader.contains(&NodeId::root()) {
            self.settle_requested = true;
            debug!("root opened, settle requested");
        }
        Ok(created)
    }

    /// The canvas dropped `id`. Returns whether it was pooled.
    pub fn handle_close(&mut self, id: &NodeId) -> bool {
        let closed = self.loader.close(id, RemovalReason::Closed);
        if closed {
            self.selection.forget(id);
        }
        closed
    }

    /// The user tapped `id`: make it current and refresh every fade tier.
    ///
    /// Ids that are not pooled and loaded are ignored. Returns whether the
    /// selection was applied. The next settle pass reselects the node
    /// nearest the view center.
    pub fn handle_select(&mut self, id: &NodeId) -> bool {
        if !self.loader.get(id).is_some_and(|e| e.is_loaded()) {
            debug!(node = %id, "tap on a node that is not loaded, ignored");
            return false;
        }
        self.selection.select(id, &mut self.loader);
        true
    }

    /// The canvas came to rest: run one reconciliation pass.
    pub fn handle_settle<V: Viewport + ?Sized>(&mut self, viewport: &mut V) -> Result<PassReport> {
        self.settle_requested = false;
        self.pool
            .reconcile(&mut self.loader, &mut self.selection, viewport, &self.config)
    }

    /// Switch to another branching factor.
    ///
    /// The same value is a no-op. Otherwise the whole tree is discarded and
    /// restarted from the root.
    pub fn set_branching_factor(&mut self, branching: BranchingFactor) -> Result<()> {
        if branching == self.loader.branching() {
            return Ok(());
        }
        self.config.branching_factor = branching;
        self.restart(branching)
    }

    /// Validate text from a settings field and apply it as the branching
    /// factor.
    ///
    /// Rejected input leaves the engine untouched; the error displays as
    /// "Please enter a prime number." for the messages the field can show.
    pub fn apply_branching_input(&mut self, input: &str) -> Result<BranchingFactor> {
        let branching = BranchingFactor::parse_with(input, self.loader.oracle_mut())?;
        self.set_branching_factor(branching)?;
        Ok(branching)
    }

    /// Replace the configuration.
    ///
    /// The tree restarts only when the branching factor changes; other
    /// fields take effect from the next handler.
    pub fn reconfigure(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;
        let branching = config.branching_factor;
        self.config = config;
        if branching != self.loader.branching() {
            self.restart(branching)?;
        }
        Ok(())
    }

    /// Discard everything and reopen the root with the same configuration.
    pub fn reset(&mut self) -> Result<()> {
        self.restart(self.config.branching_factor)
    }

    // ────────────────────────────────────────────────────────────────────
    // Command queue
    // ────────────────────────────────────────────────────────────────────

    /// Queue a handler call.
    pub fn submit(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Number of queued commands.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Run queued commands in order.
    ///
    /// Stops at the first failing command; the commands after it stay
    /// queued. Returns the number of commands run.
    pub fn run_pending<V: Viewport + ?Sized>(&mut self, viewport: &mut V) -> Result<usize> {
        let mut ran = 0;
        while let Some(command) = self.queue.pop_front() {
            match command {
                Command::Open { id, depth } => {
                    self.handle_open(&id, depth)?;
                }
                Command::Close { id } => {
                    self.handle_close(&id);
                }
                Command::Select { id } => {
                    self.handle_select(&id);
                }
                Command::Settle => {
                    self.handle_settle(viewport)?;
                }
                Command::SetBranchingFactor(b) => self.set_branching_factor(b)?,
            }
            ran += 1;
        }
        Ok(ran)
    }

    // ────────────────────────────────────────────────────────────────────
    // Queries
    // ────────────────────────────────────────────────────────────────────

    /// Label of a loaded node.
    #[must_use]
    pub fn content(&self, id: &NodeId) -> Option<&NodeContent> {
        self.loader.get(id).and_then(|e| e.content())
    }

    /// Ids of the children of `id`, pooled or not.
    #[must_use]
    pub fn child_ids(&self, id: &NodeId) -> Vec<NodeId> {
        id.children(self.loader.branching()).collect()
    }

    /// Parent of `id`, `None` for the root.
    #[must_use]
    pub fn parent_id(&self, id: &NodeId) -> Option<NodeId> {
        id.parent()
    }

    /// Frame of the child at `index` under a parent drawn in `parent`.
    #[must_use]
    pub fn place_child(&self, parent: &Transform, index: u32) -> Transform {
        place_child(parent, index, self.loader.branching())
    }

    /// Whether `id` is the current node.
    #[must_use]
    pub fn is_current(&self, id: &NodeId) -> bool {
        self.selection.is_current(id)
    }

    /// The current node.
    #[must_use]
    pub fn current(&self) -> Option<&NodeId> {
        self.selection.current()
    }

    /// Fade tier of a pooled node.
    #[must_use]
    pub fn opacity_tier(&self, id: &NodeId) -> Option<OpacityTier> {
        self.loader.get(id).map(|e| e.opacity())
    }

    /// Number of pooled entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loader.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loader.is_empty()
    }

    /// Whether `id` is pooled.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.loader.contains(id)
    }

    /// Ids of loaded nodes, sorted.
    #[must_use]
    pub fn loaded_ids(&self) -> Vec<NodeId> {
        self.loader.loaded_ids()
    }

    /// Nearest set of the last pass, farthest first.
    #[must_use]
    pub fn previous_nearest(&self) -> &[NodeId] {
        self.pool.previous_nearest()
    }

    /// Snapshot of engine-wide numbers.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            len: self.loader.len(),
            max_pool_size: self.config.max_pool_size,
            passes: self.pool.passes(),
            counters: self.loader.counters(),
            oracle: self.loader.oracle().stats(),
            dropped_changes: self.loader.changes().dropped(),
        }
    }

    /// Take every change since the last drain, oldest first.
    pub fn drain_changes(&mut self) -> Vec<PoolChange> {
        self.loader.changes_mut().drain()
    }

    /// Whether the engine wants a settle pass; clears the request.
    pub fn take_settle_request(&mut self) -> bool {
        std::mem::take(&mut self.settle_requested)
    }

    fn restart(&mut self, branching: BranchingFactor) -> Result<()> {
        let discarded = self.loader.len();
        self.loader.reset(branching);
        self.selection.clear();
        self.pool.clear();
        info!(%branching, discarded, "tree restarted");
        self.open_root()
    }

    fn open_root(&mut self) -> Result<()> {
        self.loader.open(&NodeId::root(), 0)?;
        self.settle_requested = true;
        debug!(branching = %self.loader.branching(), "root opened, settle requested");
        Ok(())
    }
}
