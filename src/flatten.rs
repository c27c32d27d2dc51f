//! Lazy flattening of nested meta-operations.
//!
//! The flattener keeps an explicit stack of open decomposition streams. Each
//! pull advances the innermost stream; nested elements push a new stream and
//! leaves are yielded. Order is depth-first and preserves the order produced
//! at every level. Nothing is materialized ahead of the consumer.
//!
//! # Preconditions
//! The composition graph is acyclic. A meta-operation that (directly or
//! through generators) yields itself makes the stream infinite.

use crate::core::{AtomicOperation, Decomposition, Element, Expansion};
use crate::error::MetaError;
use crate::meta::MetaOperation;
use std::iter::Peekable;
use std::sync::Arc;

/// Flattens `root` into a lazy stream of atomic operations.
pub fn flatten<A: AtomicOperation>(root: &MetaOperation<A>) -> Flatten<A> {
    Flatten::new(root.decompose())
}

/// Depth-first iterator over the leaves of a decomposition tree.
pub struct Flatten<A: AtomicOperation> {
    stack: Vec<Decomposition<A>>,
}

impl<A: AtomicOperation> Flatten<A> {
    /// Flattens an already-open decomposition stream.
    pub fn new(root: Decomposition<A>) -> Self {
        Self { stack: vec![root] }
    }

    /// Flattens a list of elements (operations, sequences, meta-operations).
    pub fn from_elements<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = Element<A>>,
        I::IntoIter: 'static,
    {
        Self::new(Box::new(elements.into_iter()))
    }

    /// Number of open streams.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl<A: AtomicOperation> Iterator for Flatten<A> {
    type Item = A;

    fn next(&mut self) -> Option<A> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(element) => match element.expand() {
                    Expansion::Leaf(op) => return Some(op),
                    Expansion::Nested(stream) => self.stack.push(stream),
                },
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Decomposes `root` by at most `depth` levels.
///
/// Elements that would need a further level are yielded as-is. `depth = 0`
/// yields `root` itself as a single [`Element::Meta`].
pub fn unfold<A: AtomicOperation>(root: &MetaOperation<A>, depth: usize) -> Unfold<A> {
    if depth == 0 {
        let root: Decomposition<A> = Box::new(std::iter::once(Element::Meta(Arc::new(root.clone()))));
        return Unfold {
            stack: vec![(root, 0)],
        };
    }
    Unfold {
        stack: vec![(root.decompose(), depth - 1)],
    }
}

/// Depth-bounded variant of [`Flatten`]. Yields elements, not operations.
pub struct Unfold<A: AtomicOperation> {
    // Each stream carries the number of levels it may still expand.
    stack: Vec<(Decomposition<A>, usize)>,
}

impl<A: AtomicOperation> Iterator for Unfold<A> {
    type Item = Element<A>;

    fn next(&mut self) -> Option<Element<A>> {
        loop {
            let (top, budget) = self.stack.last_mut()?;
            let budget = *budget;
            let Some(element) = top.next() else {
                self.stack.pop();
                continue;
            };
            if budget == 0 || element.is_atomic() {
                return Some(element);
            }
            match element.expand() {
                Expansion::Leaf(op) => return Some(Element::Op(op)),
                Expansion::Nested(stream) => self.stack.push((stream, budget - 1)),
            }
        }
    }
}

/// Returns the stream, peekable, or [`MetaError::EmptySequence`] if it yields nothing.
pub fn ensure_non_empty<I: Iterator>(iter: I) -> Result<Peekable<I>, MetaError> {
    let mut iter = iter.peekable();
    if iter.peek().is_none() {
        return Err(MetaError::EmptySequence);
    }
    Ok(iter)
}
