#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! # Environment Variables
//!
//! [`EngineConfig::from_env`] starts from the defaults and applies:
//!
//! | Variable | Field |
//! |---|---|
//! | `HTREE_BRANCHING_FACTOR` | `branching_factor` (must be prime) |
//! | `HTREE_MAX_POOL_SIZE` | `max_pool_size` |
//! | `HTREE_NEAREST_COUNT` | `nearest_count` |
//! | `HTREE_PREFETCH_DEPTH` | `prefetch_depth` |
//! | `HTREE_PREFETCH_ANCESTORS` | `prefetch_ancestors` (`1/true/yes/on`) |
//!
//! Values that do not parse or validate are ignored with a warning and the
//! default is kept.

use htree_core::{BranchingFactor, ConfigError};
use tracing::warn;

pub const ENV_BRANCHING_FACTOR: &str = "HTREE_BRANCHING_FACTOR";
pub const ENV_MAX_POOL_SIZE: &str = "HTREE_MAX_POOL_SIZE";
pub const ENV_NEAREST_COUNT: &str = "HTREE_NEAREST_COUNT";
pub const ENV_PREFETCH_DEPTH: &str = "HTREE_PREFETCH_DEPTH";
pub const ENV_PREFETCH_ANCESTORS: &str = "HTREE_PREFETCH_ANCESTORS";

/// Default soft cap on pooled nodes.
pub const DEFAULT_MAX_POOL_SIZE: usize = 500;
/// Default size of the nearest set.
pub const DEFAULT_NEAREST_COUNT: usize = 5;
/// Default number of generations opened below each nearest node.
pub const DEFAULT_PREFETCH_DEPTH: usize = 2;

/// Tunables of one tree instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Children per node. Changing it restarts the tree from the root.
    pub branching_factor: BranchingFactor,

    /// Soft cap on pooled nodes. Eviction stops short of it rather than
    /// remove a protected node.
    /// Default: 500
    pub max_pool_size: usize,

    /// How many loaded nodes closest to the view center count as "nearest".
    /// Default: 5
    pub nearest_count: usize,

    /// Generations opened below every nearest node on each settle.
    /// Default: 2
    pub prefetch_depth: usize,

    /// Also open the parent chain of every nearest node, up to
    /// `prefetch_depth` levels, so panning back toward the root finds
    /// loaded nodes.
    /// Default: false
    pub prefetch_ancestors: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            branching_factor: BranchingFactor::TWO,
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            nearest_count: DEFAULT_NEAREST_COUNT,
            prefetch_depth: DEFAULT_PREFETCH_DEPTH,
            prefetch_ancestors: false,
        }
    }
}

impl EngineConfig {
    /// Set the branching factor.
    #[must_use]
    pub fn with_branching_factor(mut self, branching: BranchingFactor) -> Self {
        self.branching_factor = branching;
        self
    }

    /// Set the soft pool cap.
    #[must_use]
    pub fn with_max_pool_size(mut self, max: usize) -> Self {
        self.max_pool_size = max;
        self
    }

    /// Set the nearest-set size.
    #[must_use]
    pub fn with_nearest_count(mut self, count: usize) -> Self {
        self.nearest_count = count;
        self
    }

    /// Set the prefetch depth.
    #[must_use]
    pub fn with_prefetch_depth(mut self, depth: usize) -> Self {
        self.prefetch_depth = depth;
        self
    }

    /// Enable or disable ancestor prefetch.
    #[must_use]
    pub fn with_prefetch_ancestors(mut self, enabled: bool) -> Self {
        self.prefetch_ancestors = enabled;
        self
    }

    /// Check the numeric limits.
    ///
    /// The branching factor is already valid by construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pool_size < 1 {
            return Err(ConfigError::BelowMinimum {
                field: "max_pool_size",
                min: 1,
                value: self.max_pool_size,
            });
        }
        if self.nearest_count < 1 {
            return Err(ConfigError::BelowMinimum {
                field: "nearest_count",
                min: 1,
                value: self.nearest_count,
            });
        }
        Ok(())
    }

    /// Defaults overridden from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through a custom lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = get_env(ENV_BRANCHING_FACTOR) {
            match BranchingFactor::parse(&raw) {
                Ok(b) => config.branching_factor = b,
                Err(err) => warn!(var = ENV_BRANCHING_FACTOR, value = %raw, %err, "ignoring override"),
            }
        }
        if let Some(v) = env_usize(&get_env, ENV_MAX_POOL_SIZE, 1) {
            config.max_pool_size = v;
        }
        if let Some(v) = env_usize(&get_env, ENV_NEAREST_COUNT, 1) {
            config.nearest_count = v;
        }
        if let Some(v) = env_usize(&get_env, ENV_PREFETCH_DEPTH, 0) {
            config.prefetch_depth = v;
        }
        if let Some(v) = env_bool(&get_env, ENV_PREFETCH_ANCESTORS) {
            config.prefetch_ancestors = v;
        }

        config
    }
}

fn env_usize<F>(get_env: &F, key: &str, min: usize) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = get_env(key)?;
    match raw.trim().parse::<usize>() {
        Ok(v) if v >= min => Some(v),
        _ => {
            warn!(var = key, value = %raw, min, "ignoring override");
            None
        }
    }
}

fn env_bool<F>(get_env: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = get_env(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(var = key, value = %raw, "ignoring override");
            None
        }
    }
}
