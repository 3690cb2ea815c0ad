#![forbid(unsafe_code)]

//! The current node and the depth fade around it.
//!
//! Exactly one node can be current. Selecting a node recomputes the fade
//! tier of every loaded node from its depth relative to the current one:
//! the current generation is fully opaque and each shallower generation
//! fades further, down to a floor four generations up. Deeper nodes are left
//! at the default.

use htree_core::NodeId;
use tracing::trace;

use crate::changes::PoolChange;
use crate::load::LoadController;

/// Discrete fade levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OpacityTier {
    /// No fade applied: deeper than the current node, or created since the
    /// last selection.
    #[default]
    Default,
    /// Same generation as the current node.
    Full,
    /// One generation up.
    Half,
    /// Two generations up.
    Quarter,
    /// Three generations up.
    Eighth,
    /// Four or more generations up.
    Hidden,
}

impl OpacityTier {
    /// Tier for `depth(node) - depth(current)`.
    #[must_use]
    pub const fn for_relative_depth(relative: isize) -> Self {
        match relative {
            0 => Self::Full,
            -1 => Self::Half,
            -2 => Self::Quarter,
            -3 => Self::Eighth,
            r if r <= -4 => Self::Hidden,
            _ => Self::Default,
        }
    }

    /// Alpha value to draw with.
    #[must_use]
    pub const fn alpha(self) -> f32 {
        match self {
            Self::Default | Self::Full => 1.0,
            Self::Half => 0.5,
            Self::Quarter => 0.25,
            Self::Eighth => 0.125,
            Self::Hidden => 0.0,
        }
    }
}

/// Holder of the current node.
#[derive(Debug, Default)]
pub struct SelectionManager {
    current: Option<NodeId>,
}

impl SelectionManager {
    /// Create with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current node.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&NodeId> {
        self.current.as_ref()
    }

    /// Whether `id` is current.
    #[inline]
    #[must_use]
    pub fn is_current(&self, id: &NodeId) -> bool {
        self.current.as_ref() == Some(id)
    }

    /// Make `id` current and refresh every fade tier.
    pub fn select(&mut self, id: &NodeId, pool: &mut LoadController) {
        if !self.is_current(id) {
            if let Some(previous) = self.current.take() {
                pool.changes_mut().push(PoolChange::Deselected(previous));
            }
            self.current = Some(id.clone());
            pool.changes_mut().push(PoolChange::Selected(id.clone()));
            trace!(node = %id, "selected");
        }
        Self::refresh_opacity(id.depth(), pool);
    }

    /// Drop the selection if it names `id`.
    pub fn forget(&mut self, id: &NodeId) {
        if self.is_current(id) {
            self.current = None;
        }
    }

    /// Drop the selection unconditionally.
    pub fn clear(&mut self) {
        self.current = None;
    }

    fn refresh_opacity(current_depth: usize, pool: &mut LoadController) {
        for entry in pool.entries_mut().filter(|e| e.is_loaded()) {
            let relative = entry.id.depth() as isize - current_depth as isize;
            entry.opacity = OpacityTier::for_relative_depth(relative);
        }
        pool.changes_mut().push(PoolChange::OpacityChanged);
    }
}
