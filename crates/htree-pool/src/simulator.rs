#![forbid(unsafe_code)]

//! Deterministic in-process canvas for tests and benches.
//!
//! `ViewportSimulator` implements [`Viewport`] without any rendering. Node
//! frames come straight from [`world_transform`], a camera maps world
//! coordinates to screen coordinates, and the screen origin is the view
//! center.
//!
//! # Example
//!
//! ```
//! use htree_core::NodeId;
//! use htree_pool::{Engine, EngineConfig, ViewportSimulator};
//!
//! let mut engine = Engine::new(EngineConfig::default()).unwrap();
//! let mut view = ViewportSimulator::new(engine.branching_factor());
//! engine.handle_settle(&mut view).unwrap();
//! view.apply_changes(&engine.drain_changes());
//!
//! assert!(engine.is_current(&NodeId::root()));
//! assert!(view.rendered().contains(&NodeId::root()));
//! ```

use std::collections::BTreeSet;

use htree_core::placement::node_bounds;
use htree_core::{BranchingFactor, NodeId, Point, Transform, world_transform};

use crate::changes::PoolChange;
use crate::viewport::Viewport;

/// Smallest on-screen scale a node may have before it counts as orphaned.
pub const DEFAULT_MIN_SCALE: f64 = 1e-3;
/// Largest on-screen scale a node may have before it counts as orphaned.
pub const DEFAULT_MAX_SCALE: f64 = 1e3;

/// Headless canvas with a pan/zoom camera.
#[derive(Debug, Clone)]
pub struct ViewportSimulator {
    branching: BranchingFactor,
    root: Transform,
    center: Point,
    zoom: f64,
    min_scale: f64,
    max_scale: f64,
    interaction: Vec<NodeId>,
    rendered: BTreeSet<NodeId>,
    current: Option<NodeId>,
}

impl ViewportSimulator {
    /// Camera centered on the root at zoom 1.
    #[must_use]
    pub fn new(branching: BranchingFactor) -> Self {
        Self {
            branching,
            root: Transform::IDENTITY,
            center: Point::ORIGIN,
            zoom: 1.0,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            interaction: Vec::new(),
            rendered: BTreeSet::new(),
            current: None,
        }
    }

    /// Set the on-screen scale window outside which nodes are orphaned.
    #[must_use]
    pub fn with_scale_limits(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    /// Follow a branching factor change of the engine.
    pub fn set_branching_factor(&mut self, branching: BranchingFactor) {
        self.branching = branching;
    }

    /// World point at the view center.
    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    /// Screen pixels per world unit.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Move the camera by a screen-space vector.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.center = self.center.offset(dx / self.zoom, dy / self.zoom);
    }

    /// Multiply the zoom, keeping the view center fixed.
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom *= factor;
    }

    /// Center the camera on `id` and zoom until it is drawn at scale 1.
    pub fn focus_on(&mut self, id: &NodeId) {
        let frame = world_transform(&self.root, id, self.branching);
        self.center = frame.origin;
        self.zoom = 1.0 / frame.scale;
    }

    /// Frame of `id` in screen coordinates.
    #[must_use]
    pub fn screen_transform(&self, id: &NodeId) -> Transform {
        let camera = Transform::new(
            Point::new(-self.center.x * self.zoom, -self.center.y * self.zoom),
            self.zoom,
        );
        camera.then(&world_transform(&self.root, id, self.branching))
    }

    /// Nodes the pool last allowed pointer interaction with.
    #[must_use]
    pub fn interaction(&self) -> &[NodeId] {
        &self.interaction
    }

    /// Nodes currently drawn, as tracked from the change feed.
    #[must_use]
    pub fn rendered(&self) -> &BTreeSet<NodeId> {
        &self.rendered
    }

    /// Node carrying the current marker, as tracked from the change feed.
    #[must_use]
    pub fn current(&self) -> Option<&NodeId> {
        self.current.as_ref()
    }

    /// Replay engine changes onto the drawn set.
    pub fn apply_changes(&mut self, changes: &[PoolChange]) {
        for change in changes {
            match change {
                PoolChange::Placeholder(id) | PoolChange::Loaded(id) => {
                    self.rendered.insert(id.clone());
                }
                PoolChange::Removed(id, _) => {
                    self.rendered.remove(id);
                    if self.current.as_ref() == Some(id) {
                        self.current = None;
                    }
                }
                PoolChange::Deselected(id) => {
                    if self.current.as_ref() == Some(id) {
                        self.current = None;
                    }
                }
                PoolChange::Selected(id) => self.current = Some(id.clone()),
                PoolChange::OpacityChanged => {}
                PoolChange::Cleared => {
                    self.rendered.clear();
                    self.interaction.clear();
                    self.current = None;
                }
            }
        }
    }

    fn in_scale_window(&self, frame: &Transform) -> bool {
        frame.is_finite() && (self.min_scale..=self.max_scale).contains(&frame.scale)
    }
}

impl Viewport for ViewportSimulator {
    fn nearest_to_center(&self, candidates: &[NodeId], k: usize) -> Vec<NodeId> {
        let mut ranked: Vec<(f64, f64, &NodeId)> = candidates
            .iter()
            .filter_map(|id| {
                let frame = self.screen_transform(id);
                self.in_scale_window(&frame)
                    .then(|| (node_bounds(&frame).distance_to(Point::ORIGIN), frame.scale, id))
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| b.1.total_cmp(&a.1))
                .then_with(|| a.2.cmp(b.2))
        });
        ranked.into_iter().take(k).map(|(_, _, id)| id.clone()).collect()
    }

    fn find_orphaned(&self, candidates: &[NodeId]) -> Vec<NodeId> {
        candidates
            .iter()
            .filter(|id| !self.in_scale_window(&self.screen_transform(id)))
            .cloned()
            .collect()
    }

    fn restrict_interaction_to(&mut self, ids: &[NodeId]) {
        self.interaction = ids.to_vec();
    }
}
