#![forbid(unsafe_code)]

//! Path identity for tree nodes.
//!
//! A [`NodeId`] is the root marker followed by one digit per generation.
//! Parent and child relations are computed by trimming or appending a digit;
//! there is no graph and no back pointer.
//!
//! # Textual form
//!
//! The root marker is `'a'` and digit `d` is the character with code point
//! `97 + d`, so for a binary tree the root's children are `"aa"` and `"ab"`.
//! The textual form is what [`Display`](fmt::Display) prints and
//! [`FromStr`] reads.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use smallvec::SmallVec;

use crate::branching::BranchingFactor;
use crate::error::NodeIdError;

/// Character marking the root position of every id.
pub const ROOT_MARKER: char = 'a';

const DIGIT_BASE: u32 = ROOT_MARKER as u32;

/// Position of a node in the infinite tree.
///
/// Ordering is lexicographic over the digit path, so a parent sorts before
/// its children and siblings sort by index.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    digits: SmallVec<[u32; 16]>,
}

impl NodeId {
    /// Root of the tree.
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Build an id from its digits below the root.
    #[must_use]
    pub fn from_digits(digits: &[u32]) -> Self {
        Self {
            digits: SmallVec::from_slice(digits),
        }
    }

    /// Parse the textual form and check every digit against `branching`.
    pub fn parse_with(s: &str, branching: BranchingFactor) -> Result<Self, NodeIdError> {
        let id: Self = s.parse()?;
        if let Some((index, &digit)) = id
            .digits
            .iter()
            .enumerate()
            .find(|&(_, &d)| d >= branching.get())
        {
            return Err(NodeIdError::DigitOutOfRange {
                digit,
                position: index + 1,
                branching: branching.get(),
            });
        }
        Ok(id)
    }

    /// Digits below the root, most significant first.
    #[inline]
    #[must_use]
    pub fn digits(&self) -> &[u32] {
        &self.digits
    }

    /// Generation of this node; the root has depth 0.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.digits.len()
    }

    /// Whether this is the root.
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.digits.is_empty()
    }

    /// Index of this node among its siblings, `None` for the root.
    #[inline]
    #[must_use]
    pub fn last_digit(&self) -> Option<u32> {
        self.digits.last().copied()
    }

    /// Whether the id ends in the first-child symbol.
    ///
    /// The root marker and the digit `0` share a symbol, so the root counts
    /// as a first child.
    #[must_use]
    pub fn is_first_child(&self) -> bool {
        self.last_digit().is_none_or(|d| d == 0)
    }

    /// Whether this node is the last of its siblings.
    #[must_use]
    pub fn is_last_child(&self, branching: BranchingFactor) -> bool {
        self.last_digit() == Some(branching.last_digit())
    }

    /// Whether every digit is `0`: the leftmost path from the root.
    #[must_use]
    pub fn is_root_spine(&self) -> bool {
        self.digits.iter().all(|&d| d == 0)
    }

    /// Whether every digit is a valid child index for `branching`.
    #[must_use]
    pub fn fits(&self, branching: BranchingFactor) -> bool {
        self.digits.iter().all(|&d| d < branching.get())
    }

    /// Parent id, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut digits = self.digits.clone();
        digits.pop();
        Some(Self { digits })
    }

    /// Child at `index`.
    #[must_use]
    pub fn child(&self, index: u32) -> Self {
        let mut digits = self.digits.clone();
        digits.push(index);
        Self { digits }
    }

    /// All children in sibling order.
    pub fn children(&self, branching: BranchingFactor) -> impl Iterator<Item = NodeId> + '_ {
        (0..branching.get()).map(move |i| self.child(i))
    }

    /// Mixed-radix value of the digits read in base `branching`.
    ///
    /// This is the node's index within its generation; the root is `0`.
    #[must_use]
    pub fn child_number(&self, branching: BranchingFactor) -> BigUint {
        let base = branching.to_biguint();
        self.digits.iter().fold(BigUint::zero(), |acc, &d| acc * &base + d)
    }

    /// Value of the symbols after the root marker read as a radix-36 number.
    ///
    /// Reads the longest leading run of `[0-9a-z]` symbols, like a lenient
    /// integer parser would; `None` when no symbol qualifies. The root reads
    /// as `0`. This index is independent of [`child_number`](Self::child_number)
    /// and only agrees with it on the root.
    #[must_use]
    pub fn radix36_index(&self) -> Option<BigUint> {
        if self.is_root() {
            return Some(BigUint::zero());
        }
        let prefix: String = self
            .digits
            .iter()
            .map(|&d| digit_symbol(d))
            .take_while(|c| c.is_ascii() && c.is_digit(36))
            .collect();
        BigUint::parse_bytes(prefix.to_ascii_lowercase().as_bytes(), 36)
    }
}

fn digit_symbol(digit: u32) -> char {
    char::from_u32(DIGIT_BASE + digit).unwrap_or(char::REPLACEMENT_CHARACTER)
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        f.write_char(ROOT_MARKER)?;
        for &d in &self.digits {
            f.write_char(digit_symbol(d))?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({self})")
    }
}

impl FromStr for NodeId {
    type Err = NodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            None => return Err(NodeIdError::Empty),
            Some(ROOT_MARKER) => {}
            Some(found) => return Err(NodeIdError::BadRootMarker { found }),
        }
        let mut digits = SmallVec::new();
        for (index, symbol) in chars.enumerate() {
            let code = symbol as u32;
            if code < DIGIT_BASE {
                return Err(NodeIdError::BadSymbol {
                    symbol,
                    position: index + 1,
                });
            }
            digits.push(code - DIGIT_BASE);
        }
        Ok(Self { digits })
    }
}
