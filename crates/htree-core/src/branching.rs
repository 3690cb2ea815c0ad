#![forbid(unsafe_code)]

//! Validated branching factor.
//!
//! A tree instance only ever sees a prime branching factor. Raw input from
//! the configuration field goes through [`BranchingFactor::parse`], which
//! accepts what the input form accepts: a non-empty string denoting an
//! integer (`"7"`, `" 7 "`, `"7.0"`) whose value is prime.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;

use crate::error::ConfigError;
use crate::prime::PrimalityOracle;

/// Largest accepted branching factor.
///
/// One prefetch of depth two opens `b + b²` nodes, so anything much larger
/// would overflow every sensible pool on the first settle.
pub const MAX_BRANCHING_FACTOR: u32 = 1009;

/// Number of children per node; always a prime in `2..=MAX_BRANCHING_FACTOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct BranchingFactor(u32);

impl BranchingFactor {
    /// The binary tree, and the default.
    pub const TWO: Self = Self(2);

    /// Validate an integer value.
    pub fn new(value: u64) -> Result<Self, ConfigError> {
        Self::new_with(value, &mut PrimalityOracle::new())
    }

    /// Validate an integer value using a shared oracle.
    pub fn new_with(value: u64, oracle: &mut PrimalityOracle) -> Result<Self, ConfigError> {
        if !oracle.is_prime(value) {
            return Err(ConfigError::NotPrime {
                value: i64::try_from(value).unwrap_or(i64::MAX),
            });
        }
        match u32::try_from(value) {
            Ok(v) if v <= MAX_BRANCHING_FACTOR => Ok(Self(v)),
            _ => Err(ConfigError::OutOfRange {
                value,
                max: MAX_BRANCHING_FACTOR,
            }),
        }
    }

    /// Validate raw text from the configuration field.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        Self::parse_with(input, &mut PrimalityOracle::new())
    }

    /// Validate raw text using a shared oracle.
    pub fn parse_with(input: &str, oracle: &mut PrimalityOracle) -> Result<Self, ConfigError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Empty);
        }
        let value = parse_integral(trimmed).ok_or_else(|| ConfigError::NotAnInteger {
            input: input.to_string(),
        })?;
        match u64::try_from(value) {
            Ok(v) => Self::new_with(v, oracle),
            Err(_) => Err(ConfigError::NotPrime { value }),
        }
    }

    /// The raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The value as a `usize`, for counting children.
    #[inline]
    #[must_use]
    pub const fn count(self) -> usize {
        self.0 as usize
    }

    /// The largest digit, `b - 1`, naming the last child.
    #[inline]
    #[must_use]
    pub const fn last_digit(self) -> u32 {
        self.0 - 1
    }

    /// The value as an arbitrary-precision integer.
    #[must_use]
    pub fn to_biguint(self) -> BigUint {
        BigUint::from(self.0)
    }
}

impl Default for BranchingFactor {
    fn default() -> Self {
        Self::TWO
    }
}

impl fmt::Display for BranchingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BranchingFactor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u32> for BranchingFactor {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(u64::from(value))
    }
}

impl From<BranchingFactor> for u32 {
    fn from(value: BranchingFactor) -> Self {
        value.0
    }
}

/// Parse text that denotes an integer, including integral floats.
fn parse_integral(s: &str) -> Option<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if !f.is_finite() || f.fract() != 0.0 || f.abs() > i64::MAX as f64 {
        return None;
    }
    Some(f as i64)
}
