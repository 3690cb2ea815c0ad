#![forbid(unsafe_code)]

//! Fraction labels derived from a node's path.
//!
//! [`compute_node`] is a pure function of the node id, the branching factor
//! and the [`Boundary`] handed down by the parent. It produces the node's
//! [`NodeContent`] and the descriptors its children will be computed from.
//!
//! # Formula
//!
//! With `d` the depth, `n` the child number (digits read in base `b`) and
//! `scale = b^d`:
//!
//! ```text
//! candidate_top    = parent_top if radix36_index == 0 else scale
//! base             = scale * b - (b - 1)
//! candidate_bottom = base - n * (b - 1)
//! ```
//!
//! A first child keeps the parent's top, a last child whose parent bottom is
//! known keeps that bottom, and every other node shows its candidates.
//!
//! # Spines
//!
//! Children inherit this node's displayed top, and its displayed bottom when
//! this node is itself a last child. That is what carries the top boundary
//! down the left spine and the bottom boundary down the right spine through
//! every generation. The root is not a last child, so its own children start
//! without a known bottom.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::branching::BranchingFactor;
use crate::node_id::NodeId;
use crate::prime::PrimalityOracle;

/// Boundary values a node inherits from its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// Top value carried down the left spine.
    pub top: BigUint,
    /// Bottom value carried down the right spine, when known.
    pub bottom: Option<BigUint>,
}

impl Boundary {
    /// Boundary for the root, and for any node whose parent is unknown.
    ///
    /// The top is the branching factor itself and the bottom is unknown.
    #[must_use]
    pub fn root_default(branching: BranchingFactor) -> Self {
        Self {
            top: branching.to_biguint(),
            bottom: None,
        }
    }
}

/// Two-part fraction label of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeContent {
    /// Upper part of the label.
    pub top: BigUint,
    /// Lower part of the label.
    pub bottom: BigUint,
    /// Whether the node lies on the leftmost path from the root.
    pub is_root_spine: bool,
    /// Whether `bottom` is a prime the oracle could confirm.
    pub prime_highlighted: bool,
}

/// What a child needs to compute its own content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDescriptor {
    /// The child's id.
    pub id: NodeId,
    /// Boundary the child inherits.
    pub boundary: Boundary,
}

/// The `b` child descriptors of one node.
///
/// Every child inherits the same boundary, so it is stored once and the
/// descriptors are produced on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDescriptors {
    parent: NodeId,
    branching: BranchingFactor,
    boundary: Boundary,
}

impl ChildDescriptors {
    /// Number of children; always the branching factor.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.branching.count()
    }

    /// Always `false`: a node has at least two children.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Boundary shared by all children.
    #[must_use]
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Descriptor of the child at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<ChildDescriptor> {
        (index < self.branching.get()).then(|| ChildDescriptor {
            id: self.parent.child(index),
            boundary: self.boundary.clone(),
        })
    }

    /// Child ids in sibling order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parent.children(self.branching)
    }

    /// All descriptors in sibling order.
    pub fn iter(&self) -> impl Iterator<Item = ChildDescriptor> + '_ {
        self.ids().map(|id| ChildDescriptor {
            id,
            boundary: self.boundary.clone(),
        })
    }
}

/// Content and child descriptors of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedNode {
    /// The node's label.
    pub content: NodeContent,
    /// Descriptors for the node's `b` children.
    pub children: ChildDescriptors,
}

/// Derive a node's content from its path and inherited boundary.
pub fn compute_node(
    id: &NodeId,
    branching: BranchingFactor,
    inherited: &Boundary,
    oracle: &mut PrimalityOracle,
) -> ComputedNode {
    let b = branching.to_biguint();
    let b_minus_one = &b - BigUint::one();

    let scale = num_traits::pow(b.clone(), id.depth());
    let candidate_top = match id.radix36_index() {
        Some(index) if index.is_zero() => inherited.top.clone(),
        _ => scale.clone(),
    };
    let base = &scale * &b - &b_minus_one;
    // The smallest candidate in a generation is scale itself, so this never
    // underflows for a digit path that fits the branching factor.
    let offset = id.child_number(branching) * &b_minus_one;
    let candidate_bottom = if offset <= base {
        base - offset
    } else {
        BigUint::zero()
    };

    let (top, bottom) = if id.is_first_child() {
        (inherited.top.clone(), candidate_bottom)
    } else if id.is_last_child(branching)
        && let Some(parent_bottom) = &inherited.bottom
    {
        (candidate_top, parent_bottom.clone())
    } else {
        (candidate_top, candidate_bottom)
    };

    let child_boundary = Boundary {
        top: top.clone(),
        bottom: id.is_last_child(branching).then(|| bottom.clone()),
    };

    let prime_highlighted = oracle.is_prime_big(&bottom);
    crate::trace!(node = %id, %top, %bottom, prime_highlighted, "computed node");

    ComputedNode {
        content: NodeContent {
            top,
            bottom,
            is_root_spine: id.is_root_spine(),
            prime_highlighted,
        },
        children: ChildDescriptors {
            parent: id.clone(),
            branching,
            boundary: child_boundary,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bf(n: u64) -> BranchingFactor {
        BranchingFactor::new(n).unwrap()
    }

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    /// Compute a node by walking from the root, the way the pool does.
    fn resolve(id: &NodeId, b: BranchingFactor, oracle: &mut PrimalityOracle) -> ComputedNode {
        let mut node = compute_node(&NodeId::root(), b, &Boundary::root_default(b), oracle);
        for depth in 1..=id.depth() {
            let prefix = NodeId::from_digits(&id.digits()[..depth]);
            let boundary = node.children.boundary().clone();
            node = compute_node(&prefix, b, &boundary, oracle);
        }
        node
    }

    #[test]
    fn binary_root_and_children_match_worked_example() {
        let b = bf(2);
        let mut oracle = PrimalityOracle::new();
        let root = compute_node(&NodeId::root(), b, &Boundary::root_default(b), &mut oracle);
        assert_eq!((root.content.top.clone(), root.content.bottom.clone()), (big(2), big(1)));
        assert!(root.content.is_root_spine);

        let inherited = root.children.boundary().clone();
        assert_eq!(inherited.bottom, None);

        let left = compute_node(&NodeId::from_digits(&[0]), b, &inherited, &mut oracle);
        assert_eq!((left.content.top, left.content.bottom), (big(2), big(3)));
        assert!(left.content.is_root_spine);

        let right = compute_node(&NodeId::from_digits(&[1]), b, &inherited, &mut oracle);
        assert_eq!((right.content.top, right.content.bottom), (big(2), big(2)));
        assert!(!right.content.is_root_spine);
    }

    #[test]
    fn last_child_with_known_parent_bottom_keeps_it() {
        let b = bf(2);
        let mut oracle = PrimalityOracle::new();
        let boundary = Boundary {
            top: big(2),
            bottom: Some(big(1)),
        };
        let right = compute_node(&NodeId::from_digits(&[1]), b, &boundary, &mut oracle);
        assert_eq!((right.content.top, right.content.bottom), (big(2), big(1)));
    }

    #[test]
    fn right_spine_carries_its_bottom_down() {
        let b = bf(2);
        let mut oracle = PrimalityOracle::new();
        let ab = resolve(&NodeId::from_digits(&[1]), b, &mut oracle);
        let abb = resolve(&NodeId::from_digits(&[1, 1]), b, &mut oracle);
        let abbb = resolve(&NodeId::from_digits(&[1, 1, 1]), b, &mut oracle);
        assert_eq!(ab.content.bottom, big(2));
        assert_eq!(abb.content.bottom, big(2));
        assert_eq!(abbb.content.bottom, big(2));
    }

    #[test]
    fn ternary_middle_child_uses_candidates() {
        let b = bf(3);
        let mut oracle = PrimalityOracle::new();
        let mid = resolve(&NodeId::from_digits(&[1]), b, &mut oracle);
        // scale 3, base 9 - 2 = 7, child number 1 -> 7 - 2 = 5.
        assert_eq!((mid.content.top, mid.content.bottom), (big(3), big(5)));
        assert!(mid.content.prime_highlighted);
    }

    #[test]
    fn generation_bottoms_step_down_by_b_minus_one() {
        let b = bf(3);
        let mut oracle = PrimalityOracle::new();
        // Generation 2 of a ternary tree, none of these are edge cases for
        // the bottom boundary except the last one.
        let id = NodeId::from_digits(&[1, 1]);
        let node = resolve(&id, b, &mut oracle);
        // scale 9, base 27 - 2 = 25, child number 4 -> 25 - 8 = 17.
        assert_eq!(node.content.bottom, big(17));
        assert_eq!(node.content.top, big(9));
    }

    #[test]
    fn children_are_exactly_b_descriptors() {
        let b = bf(5);
        let mut oracle = PrimalityOracle::new();
        let root = compute_node(&NodeId::root(), b, &Boundary::root_default(b), &mut oracle);
        assert_eq!(root.children.len(), 5);
        let ids: Vec<String> = root.children.iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, ["aa", "ab", "ac", "ad", "ae"]);
        assert!(root.children.get(5).is_none());
        assert_eq!(root.children.get(4).unwrap().boundary.top, big(5));
    }

    #[test]
    fn deep_values_stay_exact() {
        let b = bf(7);
        let mut oracle = PrimalityOracle::new();
        let id = NodeId::from_digits(&[0; 60]);
        let node = resolve(&id, b, &mut oracle);
        assert_eq!(node.content.top, big(7));
        let scale = num_traits::pow(big(7), 60);
        assert_eq!(node.content.bottom, &scale * big(7) - big(6));
        assert!(!node.content.prime_highlighted);
    }

    #[test]
    fn compute_is_deterministic() {
        let b = bf(3);
        let boundary = Boundary {
            top: big(9),
            bottom: Some(big(4)),
        };
        let id = NodeId::from_digits(&[2, 0, 2]);
        let a = compute_node(&id, b, &boundary, &mut PrimalityOracle::new());
        let c = compute_node(&id, b, &boundary, &mut PrimalityOracle::new());
        assert_eq!(a, c);
    }
}
