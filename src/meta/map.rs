//! Binding a stream of argument tuples to deferred items.

use super::MetaOperation;
use crate::args::Args;
use crate::core::{AtomicOperation, Decomposition, Element};
use std::fmt;
use std::sync::Arc;

/// Where a [`ParamMap`] takes its argument tuples from.
#[derive(Debug, Clone)]
pub enum ParamSource {
    /// The same tuple for every deferred item.
    Repeat(Args),
    /// One tuple per deferred item, in order.
    Each(Arc<[Args]>),
}

impl ParamSource {
    /// Builds an `Each` source from a list of tuples.
    pub fn each<I: IntoIterator<Item = Args>>(params: I) -> Self {
        ParamSource::Each(params.into_iter().collect())
    }

    /// Tuple for the `idx`-th deferred item, `None` once an `Each` list runs out.
    pub fn get(&self, idx: usize) -> Option<&Args> {
        match self {
            ParamSource::Repeat(args) => Some(args),
            ParamSource::Each(list) => list.get(idx),
        }
    }
}

/// Walks a list of items, instantiating deferred ones with successive
/// parameter tuples.
///
/// Items that are not [`super::Deferred`] pass through unchanged and do not
/// consume a tuple. With [`ParamSource::Each`] the decomposition ends as soon
/// as a deferred item finds no tuple left.
#[derive(Clone)]
pub struct ParamMap<A: AtomicOperation> {
    params: ParamSource,
    items: Arc<[Element<A>]>,
}

impl<A: AtomicOperation> ParamMap<A> {
    pub fn new<I>(params: ParamSource, items: I) -> Self
    where
        I: IntoIterator<Item = Element<A>>,
    {
        Self {
            params,
            items: items.into_iter().collect(),
        }
    }

    pub fn params(&self) -> &ParamSource {
        &self.params
    }

    /// Number of items, deferred or not.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn decompose_once(&self) -> Decomposition<A> {
        Box::new(ParamMapIter {
            params: self.params.clone(),
            items: Arc::clone(&self.items),
            pos: 0,
            consumed: 0,
        })
    }
}

impl<A: AtomicOperation> fmt::Display for ParamMap<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MAP({} items)", self.items.len())
    }
}

impl<A: AtomicOperation> fmt::Debug for ParamMap<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamMap")
            .field("params", &self.params)
            .field("items", &self.items)
            .finish()
    }
}

struct ParamMapIter<A: AtomicOperation> {
    params: ParamSource,
    items: Arc<[Element<A>]>,
    pos: usize,
    consumed: usize,
}

impl<A: AtomicOperation> Iterator for ParamMapIter<A> {
    type Item = Element<A>;

    fn next(&mut self) -> Option<Element<A>> {
        let item = self.items.get(self.pos)?;
        let out = match item {
            Element::Meta(meta) => match meta.as_ref() {
                MetaOperation::Deferred(deferred) => {
                    let Some(args) = self.params.get(self.consumed) else {
                        // Exhausted: stop here for good.
                        self.pos = self.items.len();
                        return None;
                    };
                    self.consumed += 1;
                    deferred.instantiate_with(args)
                }
                _ => item.clone(),
            },
            _ => item.clone(),
        };
        self.pos += 1;
        Some(out)
    }
}
