#![forbid(unsafe_code)]

//! Error types for htree-core.

use thiserror::Error;

/// Rejected branching-factor input.
///
/// The `Display` text is the message shown next to the input field; every
/// variant renders the same prompt so the UI never has to match on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Input was empty or whitespace only.
    #[error("Please enter a prime number.")]
    Empty,

    /// Input does not denote an integer (`"2.5"`, `"seven"`).
    #[error("Please enter a prime number.")]
    NotAnInteger {
        /// Raw input as typed.
        input: String,
    },

    /// Integer that is not prime.
    #[error("Please enter a prime number.")]
    NotPrime {
        /// The rejected value.
        value: i64,
    },

    /// Prime, but too large for a tree the pool can hold.
    #[error("Please enter a prime number no larger than {max}.")]
    OutOfRange {
        /// The rejected value.
        value: u64,
        /// Largest accepted branching factor.
        max: u32,
    },

    /// A numeric limit (pool size, nearest count) below its minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Name of the offending setting.
        field: &'static str,
        /// Minimum accepted value.
        min: usize,
        /// The rejected value.
        value: usize,
    },
}

/// Failure to parse the textual form of a [`NodeId`](crate::NodeId).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeIdError {
    /// The empty string names no node.
    #[error("node id is empty")]
    Empty,

    /// The first symbol is not the root marker.
    #[error("node id must start with the root marker 'a', found {found:?}")]
    BadRootMarker {
        /// The symbol found in root position.
        found: char,
    },

    /// A symbol below the digit alphabet.
    #[error("invalid digit symbol {symbol:?} at position {position}")]
    BadSymbol {
        /// The offending character.
        symbol: char,
        /// Character index within the id.
        position: usize,
    },

    /// A digit not smaller than the branching factor.
    #[error("digit {digit} at position {position} is out of range for branching factor {branching}")]
    DigitOutOfRange {
        /// Decoded digit value.
        digit: u32,
        /// Character index within the id.
        position: usize,
        /// Branching factor the id was checked against.
        branching: u32,
    },
}
