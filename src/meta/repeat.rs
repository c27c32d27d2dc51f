//! Repeated expansion of a wrapped entity.
//!
//! The decomposition strategy is picked once, from the kind of the wrapped
//! [`Entity`], when the repeat is constructed:
//! - generator: each expansion invokes the generator with the stored arguments;
//! - sequence: each expansion replays the sequence moment by moment;
//! - composite: each expansion invokes the composite's hook, threading the
//!   stored arguments and optional resource table;
//! - nested meta-operation: each expansion is the nested full decomposition.
//!
//! With caching enabled the first expansion is collected into a shared slice
//! and replayed verbatim for every later expansion, so generator side effects
//! happen at most once.

use super::{Composite, Entity, MetaOperation};
use crate::args::{Args, OperationGenerator};
use crate::core::{AtomicOperation, Decomposition, Element, Sequence};
use crate::error::MetaError;
use crate::resource::ResourceMap;
use once_cell::sync::OnceCell;
use std::fmt;
use std::iter;
use std::sync::Arc;

/// Decomposition strategy, fixed at construction.
#[derive(Clone)]
enum Strategy<A: AtomicOperation> {
    Generator(OperationGenerator<A>),
    Sequence(Sequence<A>),
    Composite(Arc<dyn Composite<A>>),
    Nested(Arc<MetaOperation<A>>),
}

impl<A: AtomicOperation> Strategy<A> {
    fn resolve(inner: Entity<A>) -> Result<Self, MetaError> {
        match inner {
            Entity::Generator(generator) => Ok(Strategy::Generator(generator)),
            Entity::Sequence(seq) => Ok(Strategy::Sequence(seq)),
            Entity::Composite(composite) => Ok(Strategy::Composite(composite)),
            Entity::Meta(meta) => Ok(Strategy::Nested(meta)),
            Entity::Op(op) => Err(MetaError::TypeMismatch(format!("atomic operation {:?}", op))),
        }
    }
}

/// `n` consecutive expansions of an inner entity.
///
/// # Invariants
/// - `decompose()` yields exactly `repetitions` expansions, in order.
/// - With caching, the inner entity is expanded at most once per cache slot.
#[derive(Clone)]
pub struct Repeat<A: AtomicOperation> {
    strategy: Strategy<A>,
    repetitions: usize,
    caching: bool,
    args: Args,
    resource_map: Option<Arc<ResourceMap<A::Resource>>>,
    cached: Arc<OnceCell<Arc<[Element<A>]>>>,
}

impl<A: AtomicOperation> Repeat<A> {
    /// Creates a repeat of `inner`, without caching.
    ///
    /// Fails with [`MetaError::NegativeRepetition`] if `repetitions < 0` and with
    /// [`MetaError::TypeMismatch`] if `inner` is not a repeatable kind.
    pub fn new(inner: impl Into<Entity<A>>, repetitions: i64) -> Result<Self, MetaError> {
        if repetitions < 0 {
            return Err(MetaError::NegativeRepetition(repetitions));
        }
        let strategy = Strategy::resolve(inner.into())?;
        Ok(Self {
            strategy,
            repetitions: usize::try_from(repetitions).unwrap_or(usize::MAX),
            caching: false,
            args: Args::new(),
            resource_map: None,
            cached: Arc::new(OnceCell::new()),
        })
    }

    /// Enables or disables replay caching.
    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self.cached = Arc::new(OnceCell::new());
        self
    }

    /// Stores arguments for generator and composite strategies.
    pub fn with_args(mut self, args: Args) -> Self {
        self.args = args;
        self.cached = Arc::new(OnceCell::new());
        self
    }

    /// Stores the resource table handed to composite hooks.
    pub fn with_resource_map(mut self, map: ResourceMap<A::Resource>) -> Self {
        self.resource_map = Some(Arc::new(map));
        self.cached = Arc::new(OnceCell::new());
        self
    }

    /// Number of repetitions.
    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    /// Returns `true` if expansions are replayed from a cache slot.
    pub fn caching(&self) -> bool {
        self.caching
    }

    /// Returns `true` once the cache slot holds an expansion.
    pub fn is_cache_populated(&self) -> bool {
        self.cached.get().is_some()
    }

    /// Stored arguments.
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// One expansion of the inner entity.
    pub fn decompose_once(&self) -> Decomposition<A> {
        if !self.caching {
            return self.expand_inner();
        }
        let cached = Arc::clone(self.cached.get_or_init(|| {
            let items: Vec<Element<A>> = self.expand_inner().collect();
            tracing::debug!(repeat = %self, elements = items.len(), "repeat cache populated");
            Arc::from(items)
        }));
        Box::new((0..cached.len()).map(move |i| cached[i].clone()))
    }

    /// `repetitions` consecutive expansions.
    pub fn decompose(&self) -> Decomposition<A> {
        let this = self.clone();
        Box::new((0..self.repetitions).flat_map(move |_| this.decompose_once()))
    }

    fn expand_inner(&self) -> Decomposition<A> {
        match &self.strategy {
            Strategy::Generator(generator) => {
                let generator = generator.clone();
                let args = self.args.clone();
                Box::new(iter::once_with(move || generator.invoke(&args)))
            }
            Strategy::Sequence(seq) => Box::new(seq.clone().into_iter()),
            Strategy::Composite(composite) => {
                let composite = Arc::clone(composite);
                let args = self.args.clone();
                let map = self.resource_map.clone();
                Box::new(iter::once_with(move || {
                    composite.decompose_with(&args, map.as_deref())
                }))
            }
            Strategy::Nested(meta) => meta.decompose(),
        }
    }
}

impl<A: AtomicOperation> fmt::Display for Repeat<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REPEAT(")?;
        match &self.strategy {
            Strategy::Generator(generator) => write!(f, "{}", generator.name())?,
            Strategy::Sequence(seq) => write!(f, "SEQUENCE[{}]", seq.len())?,
            Strategy::Composite(composite) => write!(f, "{}", composite.name())?,
            Strategy::Nested(meta) => write!(f, "{}", meta)?,
        }
        write!(f, ", {})", self.repetitions)
    }
}
