#![forbid(unsafe_code)]

//! Change feed from the pool to the canvas.
//!
//! The engine never touches visuals. It appends a [`PoolChange`] for every
//! node it adds, removes, selects or deselects, and the canvas drains them
//! after each handler returns. The feed is bounded: when a canvas falls
//! behind, the oldest changes are dropped and counted.

use std::collections::VecDeque;

use htree_core::NodeId;

/// Default capacity of the change feed.
pub const CHANGE_LOG_CAPACITY: usize = 4096;

/// Why an entry left the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalReason {
    /// The canvas asked for it.
    Closed,
    /// The canvas reported it disconnected or numerically singular.
    Orphaned,
    /// Dropped by the pool cap.
    Evicted,
}

/// One visible effect of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolChange {
    /// A placeholder marker should appear.
    Placeholder(NodeId),
    /// The placeholder was replaced by real content.
    Loaded(NodeId),
    /// The node's visuals should go.
    Removed(NodeId, RemovalReason),
    /// The node lost the current marker.
    Deselected(NodeId),
    /// The node became current.
    Selected(NodeId),
    /// Fade tiers were recomputed for every loaded node.
    OpacityChanged,
    /// Everything was discarded; the canvas should clear itself.
    Cleared,
}

/// Bounded FIFO of [`PoolChange`]s.
#[derive(Debug, Clone)]
pub struct ChangeLog {
    changes: VecDeque<PoolChange>,
    capacity: usize,
    dropped: u64,
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new(CHANGE_LOG_CAPACITY)
    }
}

impl ChangeLog {
    /// Create a feed holding at most `capacity` undrained changes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            changes: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Append a change, dropping the oldest when full.
    pub fn push(&mut self, change: PoolChange) {
        if self.changes.len() >= self.capacity {
            self.changes.pop_front();
            self.dropped += 1;
        }
        self.changes.push_back(change);
    }

    /// Take every pending change in order.
    pub fn drain(&mut self) -> Vec<PoolChange> {
        self.changes.drain(..).collect()
    }

    /// Forget pending changes; used on reset right before `Cleared`.
    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// Number of pending changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes lost because the feed was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
