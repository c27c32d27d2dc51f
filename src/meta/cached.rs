//! Postponed instantiation memoized under a tag.

use crate::args::{Args, OperationGenerator};
use crate::cache::{SingletonCache, TagKey};
use crate::core::{AtomicOperation, Decomposition, Element};
use std::fmt;
use std::iter;
use std::sync::Arc;

/// Like [`super::Deferred`], but resolved through a [`SingletonCache`].
///
/// For a fixed tag the generator runs at most once per cache, however many
/// `Cached` instances share the tag and however often they are decomposed.
/// The realized value is yielded as [`Element::Shared`], aliased across all
/// holders, and must be treated as read-only.
#[derive(Clone)]
pub struct Cached<A: AtomicOperation> {
    tag: TagKey,
    generator: OperationGenerator<A>,
    args: Args,
    cache: Arc<SingletonCache>,
}

impl<A: AtomicOperation> Cached<A> {
    /// Creates a cached instantiation backed by the process-wide cache.
    pub fn new(tag: impl Into<TagKey>, generator: OperationGenerator<A>) -> Self {
        Self {
            tag: tag.into(),
            generator,
            args: Args::new(),
            cache: SingletonCache::global(),
        }
    }

    /// Binds the generator's arguments.
    ///
    /// Arguments only matter on the first miss; a hit returns the stored value
    /// regardless of what this instance would have produced.
    pub fn with_args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    /// Resolves through `cache` instead of the process-wide one.
    pub fn with_cache(mut self, cache: Arc<SingletonCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn tag(&self) -> &TagKey {
        &self.tag
    }

    /// Looks up the tag, invoking the generator on a miss.
    pub fn resolve(&self) -> Arc<Element<A>> {
        self.cache
            .resolve(&self.tag, || self.generator.invoke(&self.args))
    }

    /// Single-element stream holding the shared value; resolution happens on pull.
    pub fn decompose_once(&self) -> Decomposition<A> {
        let this = self.clone();
        Box::new(iter::once_with(move || Element::Shared(this.resolve())))
    }
}

impl<A: AtomicOperation> fmt::Display for Cached<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CACHE({})", self.tag)
    }
}

impl<A: AtomicOperation> fmt::Debug for Cached<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cached")
            .field("tag", &self.tag)
            .field("generator", &self.generator.name())
            .finish_non_exhaustive()
    }
}
