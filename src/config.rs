//! Comparator configuration.
//!
//! `CompareConfig` is plain serde data so callers can embed it in their own
//! config files; missing fields take their defaults. [`CompareConfig::from_env`]
//! reads overrides from the process environment.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Environment variable selecting the [`TrailingPolicy`].
pub const TRAILING_POLICY_ENV: &str = "METAOP_TRAILING_POLICY";

/// What the commutative comparator does with reference operations left over
/// once the candidate is exhausted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingPolicy {
    /// Leftovers are accepted: they were never ordered against anything consumed.
    #[default]
    Ignore,
    /// The backlog must be empty and the reference fully consumed.
    RequireExhausted,
}

impl TrailingPolicy {
    const EXPECTED: &'static str = "ignore, require_exhausted";

    pub fn as_str(&self) -> &'static str {
        match self {
            TrailingPolicy::Ignore => "ignore",
            TrailingPolicy::RequireExhausted => "require_exhausted",
        }
    }
}

impl FromStr for TrailingPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(TrailingPolicy::Ignore),
            "require_exhausted" | "require-exhausted" => Ok(TrailingPolicy::RequireExhausted),
            _ => Err(ConfigError::InvalidValue {
                key: TRAILING_POLICY_ENV.to_string(),
                value: s.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// Settings for [`crate::compare::compare_commutative`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub trailing: TrailingPolicy,
}

impl CompareConfig {
    /// Config that also demands the reference be fully consumed.
    pub fn strict_tail() -> Self {
        Self {
            trailing: TrailingPolicy::RequireExhausted,
        }
    }

    /// Defaults overridden by [`TRAILING_POLICY_ENV`] when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(TRAILING_POLICY_ENV) {
            config.trailing = raw.parse()?;
        }
        Ok(config)
    }
}
