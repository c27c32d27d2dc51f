//! Meta-operations: lazily decomposable wrappers around operation sources.
//!
//! A meta-operation never materializes its full expansion. It exposes
//! [`MetaOperation::decompose_once`] (one expansion of the wrapped entity) and
//! [`MetaOperation::decompose`] (the full contract, e.g. `n` repetitions), both
//! returning lazy streams of [`Element`]s that the flattener drives further.
//!
//! Variants:
//! - [`Repeat`]: `n` consecutive expansions of a generator, sequence,
//!   composite or nested meta-operation, optionally replayed from a cache slot.
//! - [`Deferred`]: postpones a generator call until decomposition; fresh
//!   instantiation on every call.
//! - [`Cached`]: postpones a generator call and memoizes the result
//!   process-wide under a tag.
//! - [`ParamMap`]: binds a stream of argument tuples to deferred items.
//!
//! # Invariants
//! - Configuration (repetitions, generator, tag, strategy) is fixed at
//!   construction. Only cache slots are populated lazily.
//! - Cloning a meta-operation clones a handle: clones share cache slots and
//!   (for `Deferred`) the late-binding slot.

mod cached;
mod deferred;
mod map;
mod repeat;

pub use cached::Cached;
pub use deferred::Deferred;
pub use map::{ParamMap, ParamSource};
pub use repeat::Repeat;

use crate::args::{Args, OperationGenerator};
use crate::core::{AtomicOperation, Decomposition, Element, Sequence};
use crate::resource::ResourceMap;
use std::fmt;
use std::sync::Arc;

/// A structure that knows how to decompose itself.
///
/// The hook receives the arguments stored on the wrapping meta-operation and
/// an optional resource table mapping its local slots to caller resources.
pub trait Composite<A: AtomicOperation>: Send + Sync {
    /// Label used in display output.
    fn name(&self) -> String;

    /// Produces one expansion of the composite.
    fn decompose_with(&self, args: &Args, resources: Option<&ResourceMap<A::Resource>>)
        -> Element<A>;
}

/// Anything a collaborator may hand to [`Repeat`].
///
/// Only the first four kinds are repeatable; a bare atomic operation is
/// rejected at construction with [`crate::MetaError::TypeMismatch`].
pub enum Entity<A: AtomicOperation> {
    /// A generator invoked with the repeat's stored arguments.
    Generator(OperationGenerator<A>),
    /// A pre-built flat sequence, replayed moment by moment.
    Sequence(Sequence<A>),
    /// A structure with its own decomposition hook.
    Composite(Arc<dyn Composite<A>>),
    /// A nested meta-operation.
    Meta(Arc<MetaOperation<A>>),
    /// A single, already-built operation.
    Op(A),
}

impl<A: AtomicOperation> Entity<A> {
    /// Wraps a composite value.
    pub fn composite<C>(composite: C) -> Self
    where
        C: Composite<A> + 'static,
    {
        Entity::Composite(Arc::new(composite))
    }
}

impl<A: AtomicOperation> From<OperationGenerator<A>> for Entity<A> {
    fn from(generator: OperationGenerator<A>) -> Self {
        Entity::Generator(generator)
    }
}

impl<A: AtomicOperation> From<Sequence<A>> for Entity<A> {
    fn from(seq: Sequence<A>) -> Self {
        Entity::Sequence(seq)
    }
}

impl<A: AtomicOperation> From<MetaOperation<A>> for Entity<A> {
    fn from(op: MetaOperation<A>) -> Self {
        Entity::Meta(Arc::new(op))
    }
}

impl<A: AtomicOperation> From<Arc<MetaOperation<A>>> for Entity<A> {
    fn from(op: Arc<MetaOperation<A>>) -> Self {
        Entity::Meta(op)
    }
}

/// Closed set of meta-operation variants.
#[derive(Clone)]
pub enum MetaOperation<A: AtomicOperation> {
    /// Repeated expansion.
    Repeat(Repeat<A>),
    /// Deferred instantiation.
    Deferred(Deferred<A>),
    /// Tag-cached instantiation.
    Cached(Cached<A>),
    /// Parameter mapping over deferred items.
    Map(ParamMap<A>),
}

impl<A: AtomicOperation> MetaOperation<A> {
    /// One expansion of the wrapped entity.
    pub fn decompose_once(&self) -> Decomposition<A> {
        match self {
            MetaOperation::Repeat(op) => op.decompose_once(),
            MetaOperation::Deferred(op) => op.decompose_once(),
            MetaOperation::Cached(op) => op.decompose_once(),
            MetaOperation::Map(op) => op.decompose_once(),
        }
    }

    /// Full decomposition. Differs from [`Self::decompose_once`] only for `Repeat`.
    pub fn decompose(&self) -> Decomposition<A> {
        match self {
            MetaOperation::Repeat(op) => op.decompose(),
            other => other.decompose_once(),
        }
    }

    /// Variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            MetaOperation::Repeat(_) => "repeat",
            MetaOperation::Deferred(_) => "deferred",
            MetaOperation::Cached(_) => "cached",
            MetaOperation::Map(_) => "map",
        }
    }
}

impl<A: AtomicOperation> fmt::Display for MetaOperation<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaOperation::Repeat(op) => fmt::Display::fmt(op, f),
            MetaOperation::Deferred(op) => fmt::Display::fmt(op, f),
            MetaOperation::Cached(op) => fmt::Display::fmt(op, f),
            MetaOperation::Map(op) => fmt::Display::fmt(op, f),
        }
    }
}

impl<A: AtomicOperation> fmt::Debug for MetaOperation<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetaOperation::{}({})", self.kind(), self)
    }
}

impl<A: AtomicOperation> From<Repeat<A>> for MetaOperation<A> {
    fn from(op: Repeat<A>) -> Self {
        MetaOperation::Repeat(op)
    }
}

impl<A: AtomicOperation> From<Deferred<A>> for MetaOperation<A> {
    fn from(op: Deferred<A>) -> Self {
        MetaOperation::Deferred(op)
    }
}

impl<A: AtomicOperation> From<Cached<A>> for MetaOperation<A> {
    fn from(op: Cached<A>) -> Self {
        MetaOperation::Cached(op)
    }
}

impl<A: AtomicOperation> From<ParamMap<A>> for MetaOperation<A> {
    fn from(op: ParamMap<A>) -> Self {
        MetaOperation::Map(op)
    }
}
