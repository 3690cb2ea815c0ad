#![forbid(unsafe_code)]

//! Settle-pass reconciliation.
//!
//! Every time the canvas comes to rest it runs one pass of
//! [`PoolManager::reconcile`]:
//!
//! 1. close whatever the canvas reports as orphaned;
//! 2. ask for the loaded nodes nearest the view center;
//! 3. make the closest of them current;
//! 4. prefetch descendants (and optionally ancestors) of each nearest node,
//!    closest first;
//! 5. hand the nearest set to the canvas as the interaction set;
//! 6. evict the oldest unprotected entries until the pool fits its cap;
//! 7. remember this pass's nearest set for the next one.
//!
//! A node is protected when it was nearest in this pass or the previous
//! one. Protected nodes are never evicted, so the cap is soft: a pass can
//! leave up to `max(max_pool_size, |protected|)` entries.
//!
//! Prefetch creates at most `max_pool_size` minus the pooled protected
//! entries in one pass. Everything it creates is younger than every other
//! unprotected entry, so eviction never removes a node the same pass just
//! prefetched.

use htree_core::NodeId;
use rustc_hash::FxHashSet;
use tracing::{debug, debug_span};

use crate::changes::RemovalReason;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::load::LoadController;
use crate::selection::SelectionManager;
use crate::viewport::Viewport;

/// Outcome of one settle pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Ids closed as orphaned.
    pub orphaned: Vec<NodeId>,
    /// The nearest set, farthest first (the current node is last).
    pub nearest: Vec<NodeId>,
    /// Ids closed by the cap, oldest first.
    pub evicted: Vec<NodeId>,
    /// Entries created by prefetch.
    pub opened_during_prefetch: usize,
    /// Pool size after the pass.
    pub pool_len: usize,
}

/// Cross-pass state of the reconciler.
#[derive(Debug, Default)]
pub struct PoolManager {
    previous_nearest: Vec<NodeId>,
    passes: u64,
}

impl PoolManager {
    /// Fresh manager with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest set of the last pass, farthest first.
    #[must_use]
    pub fn previous_nearest(&self) -> &[NodeId] {
        &self.previous_nearest
    }

    /// Passes run so far.
    #[inline]
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Forget the previous nearest set.
    pub fn clear(&mut self) {
        self.previous_nearest.clear();
    }

    /// Run one settle pass.
    pub fn reconcile<V: Viewport + ?Sized>(
        &mut self,
        loader: &mut LoadController,
        selection: &mut SelectionManager,
        viewport: &mut V,
        config: &EngineConfig,
    ) -> Result<PassReport> {
        let _span = debug_span!("htree.settle", pass = self.passes).entered();
        self.passes += 1;
        let mut report = PassReport::default();

        let pooled: Vec<NodeId> = loader.entries().map(|e| e.id().clone()).collect();
        for id in viewport.find_orphaned(&pooled) {
            if loader.close(&id, RemovalReason::Orphaned) {
                selection.forget(&id);
                report.orphaned.push(id);
            }
        }

        report.nearest = nearest_set(loader, viewport, config.nearest_count);

        if let Some(closest) = report.nearest.last() {
            selection.select(closest, loader);
        }

        let levels = if config.prefetch_ancestors {
            config.prefetch_depth
        } else {
            0
        };
        let mut budget = self.prefetch_budget(loader, &report.nearest, config.max_pool_size);
        for id in report.nearest.iter().rev() {
            let created = loader.open_limited(id, config.prefetch_depth, levels, budget)?;
            budget -= created;
            report.opened_during_prefetch += created;
        }

        viewport.restrict_interaction_to(&report.nearest);

        report.evicted = self.evict(loader, selection, &report.nearest, config.max_pool_size);
        self.previous_nearest = report.nearest.clone();
        report.pool_len = loader.len();

        debug!(
            orphaned = report.orphaned.len(),
            nearest = report.nearest.len(),
            prefetched = report.opened_during_prefetch,
            evicted = report.evicted.len(),
            pool_len = report.pool_len,
            "settle pass done"
        );
        Ok(report)
    }

    /// Entries prefetch may create without pushing unprotected survivors of
    /// this pass past the cap.
    fn prefetch_budget(
        &self,
        loader: &LoadController,
        nearest: &[NodeId],
        max_pool_size: usize,
    ) -> usize {
        let protected: FxHashSet<&NodeId> = nearest
            .iter()
            .chain(self.previous_nearest.iter())
            .filter(|id| loader.contains(id))
            .collect();
        max_pool_size.saturating_sub(protected.len())
    }

    fn evict(
        &self,
        loader: &mut LoadController,
        selection: &mut SelectionManager,
        nearest: &[NodeId],
        max_pool_size: usize,
    ) -> Vec<NodeId> {
        let excess = loader.len().saturating_sub(max_pool_size);
        if excess == 0 {
            return Vec::new();
        }
        let protected: FxHashSet<&NodeId> =
            nearest.iter().chain(self.previous_nearest.iter()).collect();
        let mut evictable: Vec<(_, NodeId)> = loader
            .entries()
            .filter(|e| e.is_loaded() && !protected.contains(e.id()))
            .map(|e| (e.created_at(), e.id().clone()))
            .collect();
        evictable.sort_unstable_by_key(|(stamp, _)| *stamp);

        let mut evicted = Vec::with_capacity(excess.min(evictable.len()));
        for (_, id) in evictable.into_iter().take(excess) {
            if loader.close(&id, RemovalReason::Evicted) {
                selection.forget(&id);
                evicted.push(id);
            }
        }
        if evicted.len() < excess {
            debug!(
                short_by = excess - evicted.len(),
                protected = protected.len(),
                "pool cap not reached, remaining entries protected"
            );
        }
        evicted
    }
}

/// Loaded ids nearest the view center, farthest first and deduplicated.
fn nearest_set<V: Viewport + ?Sized>(
    loader: &LoadController,
    viewport: &V,
    k: usize,
) -> Vec<NodeId> {
    let candidates = loader.loaded_ids();
    let mut seen = FxHashSet::default();
    let mut nearest: Vec<NodeId> = viewport
        .nearest_to_center(&candidates, k)
        .into_iter()
        .filter(|id| loader.get(id).is_some_and(|e| e.is_loaded()))
        .filter(|id| seen.insert(id.clone()))
        .take(k)
        .collect();
    nearest.reverse();
    nearest
}
