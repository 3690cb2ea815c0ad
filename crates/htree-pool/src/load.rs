#![forbid(unsafe_code)]

//! Opening and closing nodes.
//!
//! [`LoadController`] owns the pool: a map from [`NodeId`] to [`PoolEntry`].
//! Opening registers a placeholder, derives the content from the parent's
//! child descriptors and promotes the entry to loaded, all before returning.
//! A depth argument expands the request to that many generations of
//! descendants through a FIFO work queue, so parents are always resolved
//! before their children.
//!
//! # Unresolved parents
//!
//! A node whose parent is not pooled (evicted, or never opened) is computed
//! from [`Boundary::root_default`]. Labels on such a node may differ from the
//! ones a full walk from the root would give; the request still succeeds.

use std::collections::VecDeque;

use htree_core::{Boundary, BranchingFactor, NodeId, PrimalityOracle, compute_node};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::changes::{ChangeLog, PoolChange, RemovalReason};
use crate::entry::{CreationStamp, EntryState, LoadedNode, PoolEntry};
use crate::error::{PoolError, Result};

/// Lifetime counters of a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadCounters {
    /// Entries created.
    pub opened: u64,
    /// Entries removed on request.
    pub closed: u64,
    /// Entries removed as orphaned.
    pub orphaned: u64,
    /// Entries removed by the pool cap.
    pub evicted: u64,
    /// Entries computed from the default boundary because the parent was
    /// missing.
    pub unresolved_parents: u64,
}

/// Owner of the node pool.
#[derive(Debug)]
pub struct LoadController {
    branching: BranchingFactor,
    entries: FxHashMap<NodeId, PoolEntry>,
    next_stamp: u64,
    oracle: PrimalityOracle,
    changes: ChangeLog,
    counters: LoadCounters,
}

impl LoadController {
    /// Create an empty pool for a tree of the given branching factor.
    #[must_use]
    pub fn new(branching: BranchingFactor) -> Self {
        Self::with_oracle(branching, PrimalityOracle::new())
    }

    /// Create an empty pool reusing an existing oracle.
    #[must_use]
    pub fn with_oracle(branching: BranchingFactor, oracle: PrimalityOracle) -> Self {
        Self {
            branching,
            entries: FxHashMap::default(),
            next_stamp: 0,
            oracle,
            changes: ChangeLog::default(),
            counters: LoadCounters::default(),
        }
    }

    /// Branching factor of the current tree.
    #[inline]
    #[must_use]
    pub fn branching(&self) -> BranchingFactor {
        self.branching
    }

    /// Number of pooled entries, placeholders included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` is pooled.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Entry for `id`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&PoolEntry> {
        self.entries.get(id)
    }

    /// All entries, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &PoolEntry> {
        self.entries.values()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut PoolEntry> {
        self.entries.values_mut()
    }

    /// Ids of loaded entries, sorted.
    #[must_use]
    pub fn loaded_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .entries
            .values()
            .filter(|e| e.is_loaded())
            .map(|e| e.id.clone())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Lifetime counters.
    #[inline]
    #[must_use]
    pub fn counters(&self) -> LoadCounters {
        self.counters
    }

    /// The primality oracle shared by every content computation.
    #[inline]
    #[must_use]
    pub fn oracle(&self) -> &PrimalityOracle {
        &self.oracle
    }

    pub(crate) fn oracle_mut(&mut self) -> &mut PrimalityOracle {
        &mut self.oracle
    }

    pub(crate) fn changes(&self) -> &ChangeLog {
        &self.changes
    }

    pub(crate) fn changes_mut(&mut self) -> &mut ChangeLog {
        &mut self.changes
    }

    /// Open `id` and `depth` generations below it.
    ///
    /// Already-pooled nodes keep their stamp; their missing descendants are
    /// still opened. Returns the number of entries created.
    pub fn open(&mut self, id: &NodeId, depth: usize) -> Result<usize> {
        self.open_limited(id, depth, 0, usize::MAX)
    }

    /// Open the parent chain of `id` up to `levels` ancestors, then `id`
    /// itself with `depth` generations below it.
    ///
    /// Ancestors are opened from the farthest down.
    pub fn open_with_ancestors(&mut self, id: &NodeId, depth: usize, levels: usize) -> Result<usize> {
        self.open_limited(id, depth, levels, usize::MAX)
    }

    /// Like [`open_with_ancestors`](Self::open_with_ancestors), but stops
    /// once `limit` entries have been created.
    ///
    /// Ancestors come first, then descendants in breadth-first order, so a
    /// partial expansion always fills the generations closest to `id`.
    pub fn open_limited(
        &mut self,
        id: &NodeId,
        depth: usize,
        levels: usize,
        limit: usize,
    ) -> Result<usize> {
        self.check(id)?;
        let mut chain = Vec::with_capacity(levels);
        let mut cursor = id.parent();
        while let Some(ancestor) = cursor {
            if chain.len() == levels {
                break;
            }
            cursor = ancestor.parent();
            chain.push(ancestor);
        }

        let mut created = 0;
        for ancestor in chain.iter().rev() {
            if created == limit {
                return Ok(created);
            }
            if self.create(ancestor) {
                created += 1;
            }
        }

        let mut queue = VecDeque::from([(id.clone(), depth)]);
        while created < limit {
            let Some((next, remaining)) = queue.pop_front() else {
                break;
            };
            if self.create(&next) {
                created += 1;
            }
            if remaining > 0 {
                queue.extend(next.children(self.branching).map(|c| (c, remaining - 1)));
            }
        }
        if !queue.is_empty() {
            debug!(node = %id, created, limit, "open stopped at limit");
        }
        Ok(created)
    }

    /// Remove `id` from the pool. Returns `false` when it was not pooled.
    pub fn close(&mut self, id: &NodeId, reason: RemovalReason) -> bool {
        if self.entries.remove(id).is_none() {
            return false;
        }
        match reason {
            RemovalReason::Closed => self.counters.closed += 1,
            RemovalReason::Orphaned => self.counters.orphaned += 1,
            RemovalReason::Evicted => self.counters.evicted += 1,
        }
        trace!(node = %id, ?reason, "closed");
        self.changes.push(PoolChange::Removed(id.clone(), reason));
        true
    }

    /// Discard every entry and switch to a new branching factor.
    ///
    /// Pending changes are replaced by a single [`PoolChange::Cleared`]. The
    /// oracle's memo table survives.
    pub fn reset(&mut self, branching: BranchingFactor) {
        let discarded = self.entries.len();
        self.entries.clear();
        self.branching = branching;
        self.changes.clear();
        self.changes.push(PoolChange::Cleared);
        debug!(discarded, %branching, "pool reset");
    }

    fn check(&self, id: &NodeId) -> Result<()> {
        if id.fits(self.branching) {
            Ok(())
        } else {
            Err(PoolError::ForeignId {
                id: id.clone(),
                branching: self.branching,
            })
        }
    }

    /// Create the entry for `id` if absent. Returns whether it was created.
    fn create(&mut self, id: &NodeId) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        let stamp = CreationStamp(self.next_stamp);
        self.next_stamp += 1;
        self.entries
            .insert(id.clone(), PoolEntry::placeholder(id.clone(), stamp));
        self.changes.push(PoolChange::Placeholder(id.clone()));

        let boundary = self.inherited_boundary(id);
        let computed = compute_node(id, self.branching, &boundary, &mut self.oracle);
        if let Some(entry) = self.entries.get_mut(id) {
            entry.state = EntryState::Loaded(Box::new(LoadedNode {
                content: computed.content,
                children: computed.children,
            }));
        }
        self.changes.push(PoolChange::Loaded(id.clone()));
        self.counters.opened += 1;
        trace!(node = %id, stamp = stamp.0, "opened");
        true
    }

    fn inherited_boundary(&mut self, id: &NodeId) -> Boundary {
        let Some(parent) = id.parent() else {
            return Boundary::root_default(self.branching);
        };
        if let Some(loaded) = self.entries.get(&parent).and_then(PoolEntry::loaded) {
            return loaded.children.boundary().clone();
        }
        self.counters.unresolved_parents += 1;
        debug!(node = %id, parent = %parent, "parent not pooled, using root boundary");
        Boundary::root_default(self.branching)
    }
}
