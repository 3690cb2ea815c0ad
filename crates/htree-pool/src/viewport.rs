#![forbid(unsafe_code)]

//! The canvas seen from the pool.
//!
//! The pool never computes distances or screen positions itself. During a
//! settle pass it asks the canvas three questions through [`Viewport`], and
//! otherwise communicates through the [`ChangeLog`](crate::changes::ChangeLog).

use htree_core::NodeId;

/// Spatial queries answered by the canvas.
pub trait Viewport {
    /// Up to `k` of `candidates` closest to the view center, nearest first.
    ///
    /// Ids not in `candidates` are ignored by the caller.
    fn nearest_to_center(&self, candidates: &[NodeId], k: usize) -> Vec<NodeId>;

    /// Which of `candidates` can no longer be drawn or reached: detached from
    /// the visible hierarchy, or scaled so far that their frame is
    /// numerically singular.
    fn find_orphaned(&self, candidates: &[NodeId]) -> Vec<NodeId>;

    /// Limit pointer interaction to exactly `ids`.
    fn restrict_interaction_to(&mut self, ids: &[NodeId]);
}

impl<V: Viewport + ?Sized> Viewport for &mut V {
    fn nearest_to_center(&self, candidates: &[NodeId], k: usize) -> Vec<NodeId> {
        (**self).nearest_to_center(candidates, k)
    }

    fn find_orphaned(&self, candidates: &[NodeId]) -> Vec<NodeId> {
        (**self).find_orphaned(candidates)
    }

    fn restrict_interaction_to(&mut self, ids: &[NodeId]) {
        (**self).restrict_interaction_to(ids);
    }
}
