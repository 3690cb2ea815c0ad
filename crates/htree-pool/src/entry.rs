#![forbid(unsafe_code)]

//! Pool entries and their lifecycle.
//!
//! ```text
//! Unrequested ──open──▶ Placeholder ──content──▶ Loaded
//!                            │                     │
//!                            └──close/evict──▶ Removed ◀──┘
//! ```
//!
//! `Removed` is not stored: the entry simply leaves the pool, and a later
//! open starts over at `Placeholder` with a fresh stamp.

use htree_core::{ChildDescriptors, NodeContent, NodeId};

use crate::selection::OpacityTier;

/// Creation order of an entry.
///
/// Stamps come from a per-pool counter, so two entries never share one and
/// the oldest entry is always well defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreationStamp(pub u64);

/// Content of a loaded entry.
#[derive(Debug, Clone)]
pub struct LoadedNode {
    /// The node's label.
    pub content: NodeContent,
    /// What the node's children inherit.
    pub children: ChildDescriptors,
}

/// Where an entry is in its lifecycle.
#[derive(Debug, Clone)]
pub enum EntryState {
    /// Registered, content not computed yet.
    Placeholder,
    /// Content available.
    Loaded(Box<LoadedNode>),
}

/// One pooled node.
#[derive(Debug, Clone)]
pub struct PoolEntry {
    pub(crate) id: NodeId,
    pub(crate) state: EntryState,
    pub(crate) created_at: CreationStamp,
    pub(crate) opacity: OpacityTier,
}

impl PoolEntry {
    pub(crate) fn placeholder(id: NodeId, created_at: CreationStamp) -> Self {
        Self {
            id,
            state: EntryState::Placeholder,
            created_at,
            opacity: OpacityTier::Default,
        }
    }

    /// The node's id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &EntryState {
        &self.state
    }

    /// When the entry was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> CreationStamp {
        self.created_at
    }

    /// Fade tier from the last selection.
    #[inline]
    #[must_use]
    pub fn opacity(&self) -> OpacityTier {
        self.opacity
    }

    /// Whether content is available.
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, EntryState::Loaded(_))
    }

    /// Loaded content, `None` for a placeholder.
    #[must_use]
    pub fn loaded(&self) -> Option<&LoadedNode> {
        match &self.state {
            EntryState::Loaded(node) => Some(node),
            EntryState::Placeholder => None,
        }
    }

    /// The node's label, `None` for a placeholder.
    #[must_use]
    pub fn content(&self) -> Option<&NodeContent> {
        self.loaded().map(|node| &node.content)
    }
}
