//! Core data structures: atomic operations, decomposition elements and
//! pre-built sequences.
//!
//! Atomic operations are produced by collaborators; the engine only needs
//! their resource set (for interference tests) and their equality relation.
//! Everything a decomposition step yields is an [`Element`]: either an atomic
//! operation or something that decomposes further.

use crate::meta::MetaOperation;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// An opaque, immutable operation touching a known set of resources.
///
/// # Invariants
/// - `resources()` is finite and stable for the lifetime of the value.
/// - Equality is decidable (`PartialEq`).
pub trait AtomicOperation: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Resource identifier (e.g. a qubit label). Used only for overlap tests.
    type Resource: Clone + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static;

    /// Resources this operation acts on.
    fn resources(&self) -> &[Self::Resource];

    /// Returns `true` if the two operations share at least one resource.
    ///
    /// Operations that do not interfere may be reordered freely.
    fn interferes_with(&self, other: &Self) -> bool {
        let theirs = other.resources();
        self.resources().iter().any(|r| theirs.contains(r))
    }
}

/// A lazy, single-pass stream of decomposition elements.
pub type Decomposition<A> = Box<dyn Iterator<Item = Element<A>>>;

/// One item yielded by a decomposition step.
///
/// Every variant except `Op` is expanded further by the flattener.
pub enum Element<A: AtomicOperation> {
    /// A leaf operation.
    Op(A),
    /// A pre-built flat sequence.
    Sequence(Sequence<A>),
    /// A nested meta-operation.
    Meta(Arc<MetaOperation<A>>),
    /// A value shared through the singleton cache. Aliased, never copied.
    Shared(Arc<Element<A>>),
}

/// Result of expanding one element by one level.
pub enum Expansion<A: AtomicOperation> {
    /// The element is an atomic operation.
    Leaf(A),
    /// The element decomposes into a further stream.
    Nested(Decomposition<A>),
}

impl<A: AtomicOperation> Element<A> {
    /// Wraps a meta-operation as an element.
    pub fn meta(op: MetaOperation<A>) -> Self {
        Element::Meta(Arc::new(op))
    }

    /// Returns the atomic operation if this element is a leaf.
    pub fn as_op(&self) -> Option<&A> {
        match self {
            Element::Op(op) => Some(op),
            Element::Shared(inner) => inner.as_op(),
            _ => None,
        }
    }

    /// Returns `true` if the element needs no further decomposition.
    pub fn is_atomic(&self) -> bool {
        self.as_op().is_some()
    }

    /// Expands the element by one level.
    ///
    /// Shared values are transparent: expanding `Shared(x)` expands `x`.
    pub fn expand(self) -> Expansion<A> {
        match self {
            Element::Op(op) => Expansion::Leaf(op),
            Element::Sequence(seq) => Expansion::Nested(Box::new(seq.into_iter())),
            Element::Meta(meta) => Expansion::Nested(meta.decompose()),
            Element::Shared(inner) => Element::clone(&inner).expand(),
        }
    }
}

impl<A: AtomicOperation> Clone for Element<A> {
    fn clone(&self) -> Self {
        match self {
            Element::Op(op) => Element::Op(op.clone()),
            Element::Sequence(seq) => Element::Sequence(seq.clone()),
            Element::Meta(meta) => Element::Meta(Arc::clone(meta)),
            Element::Shared(inner) => Element::Shared(Arc::clone(inner)),
        }
    }
}

impl<A: AtomicOperation> fmt::Debug for Element<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Op(op) => f.debug_tuple("Op").field(op).finish(),
            Element::Sequence(seq) => f.debug_tuple("Sequence").field(seq).finish(),
            Element::Meta(meta) => write!(f, "Meta({})", meta),
            Element::Shared(inner) => f.debug_tuple("Shared").field(inner).finish(),
        }
    }
}

impl<A: AtomicOperation> From<A> for Element<A> {
    fn from(op: A) -> Self {
        Element::Op(op)
    }
}

impl<A: AtomicOperation> From<Sequence<A>> for Element<A> {
    fn from(seq: Sequence<A>) -> Self {
        Element::Sequence(seq)
    }
}

impl<A: AtomicOperation> From<MetaOperation<A>> for Element<A> {
    fn from(op: MetaOperation<A>) -> Self {
        Element::meta(op)
    }
}

/// An immutable, pre-built sequence of elements grouped into moments.
///
/// Iteration yields elements moment by moment, in original order. Cloning is
/// cheap: the moments are shared.
///
/// # Invariants
/// - Moments are never empty.
pub struct Sequence<A: AtomicOperation> {
    moments: Arc<[Vec<Element<A>>]>,
}

impl<A: AtomicOperation> Sequence<A> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self {
            moments: Arc::from(Vec::new()),
        }
    }

    /// Builds a sequence with one operation per moment.
    pub fn from_ops<I>(ops: I) -> Self
    where
        I: IntoIterator<Item = A>,
    {
        Self::from_elements(ops.into_iter().map(Element::Op))
    }

    /// Builds a sequence with one element per moment.
    pub fn from_elements<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = Element<A>>,
    {
        let moments: Vec<Vec<Element<A>>> = elements.into_iter().map(|e| vec![e]).collect();
        Self {
            moments: Arc::from(moments),
        }
    }

    /// Builds a sequence from explicit moments. Empty moments are dropped.
    pub fn from_moments<I, M>(moments: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: IntoIterator<Item = Element<A>>,
    {
        let moments: Vec<Vec<Element<A>>> = moments
            .into_iter()
            .map(|m| m.into_iter().collect::<Vec<_>>())
            .filter(|m| !m.is_empty())
            .collect();
        Self {
            moments: Arc::from(moments),
        }
    }

    /// Number of moments.
    pub fn moment_count(&self) -> usize {
        self.moments.len()
    }

    /// Total number of elements across all moments.
    pub fn len(&self) -> usize {
        self.moments.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the sequence has no elements.
    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// Iterates over elements by reference.
    pub fn iter(&self) -> impl Iterator<Item = &Element<A>> + '_ {
        self.moments.iter().flatten()
    }
}

impl<A: AtomicOperation> Default for Sequence<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AtomicOperation> Clone for Sequence<A> {
    fn clone(&self) -> Self {
        Self {
            moments: Arc::clone(&self.moments),
        }
    }
}

impl<A: AtomicOperation> fmt::Debug for Sequence<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<A: AtomicOperation> FromIterator<A> for Sequence<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::from_ops(iter)
    }
}

impl<A: AtomicOperation> IntoIterator for Sequence<A> {
    type Item = Element<A>;
    type IntoIter = SequenceIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        SequenceIter {
            moments: self.moments,
            moment: 0,
            pos: 0,
        }
    }
}

/// Owning iterator over a [`Sequence`].
///
/// Holds a handle on the shared moments, so it outlives the sequence value
/// it was created from.
pub struct SequenceIter<A: AtomicOperation> {
    moments: Arc<[Vec<Element<A>>]>,
    moment: usize,
    pos: usize,
}

impl<A: AtomicOperation> Iterator for SequenceIter<A> {
    type Item = Element<A>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.moments.get(self.moment) {
            if let Some(element) = current.get(self.pos) {
                self.pos += 1;
                return Some(element.clone());
            }
            self.moment += 1;
            self.pos = 0;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{cnot, h, x, Gate};

    #[test]
    fn interference_is_resource_overlap() {
        assert!(cnot(0, 1).interferes_with(&h(1)));
        assert!(h(0).interferes_with(&h(0)));
        assert!(!h(0).interferes_with(&x(1)));
    }

    #[test]
    fn sequence_iterates_moment_by_moment() {
        let seq: Sequence<Gate> = Sequence::from_moments(vec![
            vec![Element::Op(h(0)), Element::Op(h(1))],
            vec![],
            vec![Element::Op(cnot(0, 1))],
        ]);
        assert_eq!(seq.moment_count(), 2);
        assert_eq!(seq.len(), 3);
        let ops: Vec<Gate> = seq
            .into_iter()
            .map(|e| e.as_op().cloned().expect("leaf"))
            .collect();
        assert_eq!(ops, vec![h(0), h(1), cnot(0, 1)]);
    }

    #[test]
    fn sequence_iterator_outlives_value() {
        let iter = {
            let seq: Sequence<Gate> = [h(0), x(2)].into_iter().collect();
            seq.into_iter()
        };
        assert_eq!(iter.count(), 2);
    }

    #[test]
    fn shared_element_is_transparent() {
        let shared = Element::Shared(Arc::new(Element::Op(h(3))));
        assert_eq!(shared.as_op(), Some(&h(3)));
        match shared.expand() {
            Expansion::Leaf(op) => assert_eq!(op, h(3)),
            Expansion::Nested(_) => panic!("expected a leaf"),
        }
    }

    #[test]
    fn empty_sequence() {
        let seq: Sequence<Gate> = Sequence::new();
        assert!(seq.is_empty());
        assert_eq!(seq.into_iter().count(), 0);
    }
}
