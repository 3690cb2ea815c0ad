//! Property-based invariant tests for node content.
//!
//! 1. The first child's top equals its parent's top, at every depth.
//! 2. Below a last child, the last child's bottom equals its parent's bottom.
//! 3. Every non-first node at depth d has top b^d.
//! 4. `compute_node` is deterministic for identical inputs.
//! 5. Exactly b child descriptors with consecutive ids.

use htree_core::{Boundary, BranchingFactor, ComputedNode, NodeId, PrimalityOracle, compute_node};
use num_bigint::BigUint;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const PRIMES: [u64; 7] = [2, 3, 5, 7, 11, 13, 17];

fn path_strategy() -> impl Strategy<Value = (BranchingFactor, Vec<u32>)> {
    prop::sample::select(PRIMES.to_vec()).prop_flat_map(|p| {
        let b = BranchingFactor::new(p).unwrap();
        (Just(b), prop::collection::vec(0..b.get(), 0..=12))
    })
}

/// Every node from the root down to `digits`, computed as the pool would.
fn walk(b: BranchingFactor, digits: &[u32], oracle: &mut PrimalityOracle) -> Vec<(NodeId, ComputedNode)> {
    let root = NodeId::root();
    let mut node = compute_node(&root, b, &Boundary::root_default(b), oracle);
    let mut out = vec![(root, node.clone())];
    for depth in 1..=digits.len() {
        let id = NodeId::from_digits(&digits[..depth]);
        node = compute_node(&id, b, node.children.boundary(), oracle);
        out.push((id, node.clone()));
    }
    out
}

fn child(parent: &(NodeId, ComputedNode), index: u32, b: BranchingFactor, oracle: &mut PrimalityOracle) -> ComputedNode {
    let descriptor = parent.1.children.get(index).unwrap();
    compute_node(&descriptor.id, b, &descriptor.boundary, oracle)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Left spine
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn first_child_keeps_parent_top((b, digits) in path_strategy()) {
        let mut oracle = PrimalityOracle::new();
        for entry in walk(b, &digits, &mut oracle) {
            let first = child(&entry, 0, b, &mut oracle);
            prop_assert_eq!(
                &first.content.top, &entry.1.content.top,
                "first child of {} changed top", entry.0
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Right spine
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn last_child_keeps_bottom_along_right_spine((b, digits) in path_strategy()) {
        let mut oracle = PrimalityOracle::new();
        for entry in walk(b, &digits, &mut oracle) {
            if !entry.0.is_last_child(b) {
                continue;
            }
            let last = child(&entry, b.last_digit(), b, &mut oracle);
            prop_assert_eq!(
                &last.content.bottom, &entry.1.content.bottom,
                "last child of {} changed bottom", entry.0
            );
        }
    }

    #[test]
    fn pure_right_spine_is_constant(p in prop::sample::select(PRIMES.to_vec()), depth in 1usize..=20) {
        let b = BranchingFactor::new(p).unwrap();
        let mut oracle = PrimalityOracle::new();
        let digits = vec![b.last_digit(); depth];
        let nodes = walk(b, &digits, &mut oracle);
        let first_gen = &nodes[1].1.content.bottom;
        for (id, node) in &nodes[1..] {
            prop_assert_eq!(&node.content.bottom, first_gen, "bottom drifted at {}", id);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Top values off the left edge
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn non_first_nodes_show_scale((b, digits) in path_strategy()) {
        let mut oracle = PrimalityOracle::new();
        for (id, node) in walk(b, &digits, &mut oracle) {
            if id.is_first_child() {
                continue;
            }
            let scale = num_traits::pow(BigUint::from(b.get()), id.depth());
            prop_assert_eq!(node.content.top, scale, "top of {}", id);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn compute_is_deterministic((b, digits) in path_strategy(), top in 1u64..10_000, bottom in prop::option::of(1u64..10_000)) {
        let id = NodeId::from_digits(&digits);
        let boundary = Boundary { top: BigUint::from(top), bottom: bottom.map(BigUint::from) };
        let mut shared = PrimalityOracle::new();
        let first = compute_node(&id, b, &boundary, &mut shared);
        let again = compute_node(&id, b, &boundary, &mut shared);
        let fresh = compute_node(&id, b, &boundary, &mut PrimalityOracle::new());
        prop_assert_eq!(&first, &again);
        prop_assert_eq!(&first, &fresh);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Child descriptors
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn exactly_b_children((b, digits) in path_strategy()) {
        let id = NodeId::from_digits(&digits);
        let node = compute_node(&id, b, &Boundary::root_default(b), &mut PrimalityOracle::new());
        let kids: Vec<_> = node.children.iter().collect();
        prop_assert_eq!(kids.len(), b.count());
        for (i, kid) in kids.iter().enumerate() {
            let parent = kid.id.parent();
            prop_assert_eq!(parent.as_ref(), Some(&id));
            prop_assert_eq!(kid.id.last_digit(), Some(i as u32));
        }
    }
}
