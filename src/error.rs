//! Error types for meta-operation construction and configuration.
//!
//! Construction errors are programmer errors: they are raised once, when a
//! meta-operation is built, and never during decomposition. Comparison
//! outcomes are not errors at all (see [`crate::compare`]).

/// Error type for meta-operation construction and sequence guards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetaError {
    /// The wrapped entity is not a generator, sequence, or composite.
    #[error("type mismatch: {0} is not a generator, sequence, composite or meta-operation")]
    TypeMismatch(String),
    /// A repetition count below zero was requested.
    #[error("repetition count must be non-negative, got {0}")]
    NegativeRepetition(i64),
    /// A sequence that was required to be non-empty turned out empty.
    #[error("flattened sequence is empty")]
    EmptySequence,
}

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable carried a value outside the accepted set.
    #[error("invalid value {value:?} for {key}: expected one of {expected}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
        /// Accepted spellings.
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            MetaError::NegativeRepetition(-3).to_string(),
            "repetition count must be non-negative, got -3"
        );
        assert_eq!(MetaError::EmptySequence.to_string(), "flattened sequence is empty");
        let err = ConfigError::InvalidValue {
            key: "METAOP_TRAILING_POLICY".into(),
            value: "sometimes".into(),
            expected: "ignore, require_exhausted",
        };
        assert!(err.to_string().contains("sometimes"));
    }
}
