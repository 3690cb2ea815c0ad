#![forbid(unsafe_code)]

//! Where children sit relative to their parent.
//!
//! A parent's `b` children form one row below it. Each child frame is the
//! parent frame scaled by `1/b` and shifted, in child units, by
//!
//! ```text
//! dx = SPACING * index - HALF_SPACING * (b - 1)
//! dy = SPACING * b     - HALF_SPACING * (b - 1)
//! ```
//!
//! Siblings are `SPACING` child units apart while a node is `NODE_SIZE`
//! units wide, so the row tiles without overlap, and the `dx` values are
//! symmetric around zero so the row is centered under the parent.

use crate::branching::BranchingFactor;
use crate::geometry::{Bounds, Point, Transform};
use crate::node_id::NodeId;

/// Side length of a node's square, in its own local units.
pub const NODE_SIZE: f64 = 150.0;

/// Distance between sibling centers, in child units.
pub const SPACING: f64 = 300.0;

/// Half of [`SPACING`].
pub const HALF_SPACING: f64 = SPACING / 2.0;

/// Child frame at `index` under a parent frame.
#[must_use]
pub fn place_child(parent: &Transform, index: u32, branching: BranchingFactor) -> Transform {
    let b = f64::from(branching.get());
    let spread = HALF_SPACING * (b - 1.0);
    let dx = SPACING * f64::from(index) - spread;
    let dy = SPACING * b - spread;
    parent.scale_by(1.0 / b).offset_local(dx, dy)
}

/// Parent of a node, `None` for the root.
#[inline]
#[must_use]
pub fn place_parent(child: &NodeId) -> Option<NodeId> {
    child.parent()
}

/// World frame of `id`, given the root's world frame.
#[must_use]
pub fn world_transform(root: &Transform, id: &NodeId, branching: BranchingFactor) -> Transform {
    id.digits()
        .iter()
        .fold(*root, |frame, &digit| place_child(&frame, digit, branching))
}

/// World-space square occupied by a node drawn in `frame`.
#[must_use]
pub fn node_bounds(frame: &Transform) -> Bounds {
    Bounds::centered(frame.apply(Point::ORIGIN), NODE_SIZE * frame.scale)
}
