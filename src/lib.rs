//! metaop: lazy composition, flattening and comparison of hierarchical operations.
//!
//! Atomic operations (anything touching a known set of resources, such as
//! quantum gates on qubits) are wrapped in meta-operations that repeat,
//! defer or cache their construction. A tree of meta-operations is never
//! materialized eagerly: the [`flatten`] iterator pulls one atomic operation at
//! a time, and the [`compare`] module checks a flattened stream against a
//! reference, either strictly or up to reordering of operations on disjoint
//! resources.
//!
//! This crate provides:
//! - [`meta::MetaOperation`] with the `Repeat`, `Deferred`, `Cached` and
//!   `ParamMap` variants.
//! - [`cache::SingletonCache`], the tag-keyed memo table behind `Cached`.
//! - [`flatten::flatten`] and the depth-bounded [`flatten::unfold`].
//! - [`compare::commutative_equal`] and [`compare::strict_equal`].
//!
//! # Evaluation model
//!
//! Evaluation is pull-based. Generators run when the consumer pulls the
//! element they produce, never earlier. Abandoning a stream half-way is
//! always safe.
//!
//! # References
//!
//! - Mazurkiewicz, A. "Trace theory" (1986) – equivalence up to commutation of independent actions
//! - Michie, D. "Memo functions and machine learning" (1968) – memoization
//!
//! # Example
//!
//! ```
//! use metaop::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Gate(&'static str, Vec<u32>);
//!
//! impl AtomicOperation for Gate {
//!     type Resource = u32;
//!     fn resources(&self) -> &[u32] {
//!         &self.1
//!     }
//! }
//!
//! let bell: Sequence<Gate> = vec![Gate("H", vec![0]), Gate("CNOT", vec![0, 1])]
//!     .into_iter()
//!     .collect();
//! let root: MetaOperation<Gate> = Repeat::new(bell, 3).unwrap().into();
//! assert_eq!(flatten(&root).count(), 6);
//!
//! let reference = vec![Gate("H", vec![0]), Gate("H", vec![1])];
//! let candidate = vec![Gate("H", vec![1]), Gate("H", vec![0])];
//! assert!(commutative_equal(reference, candidate));
//! ```

pub mod args;
pub mod cache;
pub mod compare;
pub mod config;
pub mod core;
pub mod error;
pub mod fingerprint;
pub mod flatten;
pub mod meta;
pub mod resource;

#[cfg(test)]
mod testing;

pub use crate::args::{Args, OperationGenerator};
pub use crate::cache::{reset_global_cache, CacheMetrics, SingletonCache, TagKey};
pub use crate::compare::{commutative_equal, compare_commutative, strict_equal, CompareStats, Mismatch};
pub use crate::config::{CompareConfig, TrailingPolicy};
pub use crate::core::{AtomicOperation, Decomposition, Element, Sequence};
pub use crate::error::{ConfigError, MetaError};
pub use crate::flatten::{ensure_non_empty, flatten, unfold, Flatten, Unfold};
pub use crate::meta::{Cached, Composite, Deferred, Entity, MetaOperation, ParamMap, ParamSource, Repeat};
pub use crate::resource::ResourceMap;

/// Prelude for convenient usage.
pub mod prelude {
    pub use crate::args::{Args, OperationGenerator};
    pub use crate::cache::{reset_global_cache, SingletonCache, TagKey};
    pub use crate::compare::{commutative_equal, compare_commutative, strict_equal};
    pub use crate::config::{CompareConfig, TrailingPolicy};
    pub use crate::core::{AtomicOperation, Element, Sequence};
    pub use crate::error::MetaError;
    pub use crate::flatten::{ensure_non_empty, flatten, unfold};
    pub use crate::meta::{Cached, Composite, Deferred, Entity, MetaOperation, ParamMap, ParamSource, Repeat};
    pub use crate::resource::ResourceMap;
}
