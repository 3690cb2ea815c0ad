#![forbid(unsafe_code)]

//! Memoized primality testing.
//!
//! [`PrimalityOracle`] answers two kinds of question: whether a typed
//! branching factor is acceptable, and whether a node's bottom value should be
//! highlighted. Both are small numbers in practice, so plain `6k ± 1` trial
//! division is enough. Answers are cached for the lifetime of the oracle and
//! the cache is never evicted.
//!
//! Values above [`TRIAL_DIVISION_LIMIT`] are not tested at all and report
//! `false`. Deep nodes carry bottom values with hundreds of digits; treating
//! them as "not prime" only drops a highlight.

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rustc_hash::FxHashMap;

/// Largest value the oracle will run trial division on (2^40).
///
/// The square root is about a million, so a cold test stays well below a
/// millisecond.
pub const TRIAL_DIVISION_LIMIT: u64 = 1 << 40;

/// Trial division without memoization.
///
/// Returns `false` for values above [`TRIAL_DIVISION_LIMIT`].
#[must_use]
pub fn is_prime_uncached(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    if n > TRIAL_DIVISION_LIMIT {
        return false;
    }
    let mut i = 5u64;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Counters describing oracle usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleStats {
    /// Number of memoized answers.
    pub cached: usize,
    /// Lookups answered from the memo table.
    pub hits: u64,
    /// Lookups that ran trial division.
    pub misses: u64,
    /// Lookups skipped because the value exceeded [`TRIAL_DIVISION_LIMIT`].
    pub out_of_range: u64,
}

/// Memoizing primality tester.
#[derive(Debug, Default)]
pub struct PrimalityOracle {
    cache: FxHashMap<u64, bool>,
    hits: u64,
    misses: u64,
    out_of_range: u64,
}

impl PrimalityOracle {
    /// Create an oracle with an empty memo table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Test `n` for primality.
    ///
    /// Values that the cheap checks settle (≤ 3, multiples of 2 or 3) are
    /// answered without touching the cache.
    pub fn is_prime(&mut self, n: u64) -> bool {
        if n <= 1 {
            return false;
        }
        if n <= 3 {
            return true;
        }
        if n % 2 == 0 || n % 3 == 0 {
            return false;
        }
        if n > TRIAL_DIVISION_LIMIT {
            self.out_of_range += 1;
            return false;
        }
        if let Some(&known) = self.cache.get(&n) {
            self.hits += 1;
            return known;
        }
        self.misses += 1;
        let answer = is_prime_uncached(n);
        self.cache.insert(n, answer);
        answer
    }

    /// Test an arbitrary-precision value.
    ///
    /// Anything that does not fit the trial-division domain reports `false`.
    pub fn is_prime_big(&mut self, n: &BigUint) -> bool {
        match n.to_u64() {
            Some(small) => self.is_prime(small),
            None => {
                self.out_of_range += 1;
                false
            }
        }
    }

    /// Usage counters.
    #[must_use]
    pub fn stats(&self) -> OracleStats {
        OracleStats {
            cached: self.cache.len(),
            hits: self.hits,
            misses: self.misses,
            out_of_range: self.out_of_range,
        }
    }
}
