//! Positional resource tables.
//!
//! A composite that decomposes in terms of local slots (its first, second, …
//! resource) needs a table mapping those slots back to the caller's resource
//! labels. [`ResourceMap`] is that table: sorted, de-duplicated, so the slot
//! order matches the canonical ordering of the labels.

use crate::core::AtomicOperation;

/// Sorted, de-duplicated table of resource labels addressed by slot index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceMap<R> {
    slots: Vec<R>,
}

impl<R: Ord + Clone> ResourceMap<R> {
    /// Builds a table from arbitrary labels.
    pub fn new<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = R>,
    {
        let mut slots: Vec<R> = labels.into_iter().collect();
        slots.sort();
        slots.dedup();
        Self { slots }
    }

    /// Collects every resource touched by `ops`.
    pub fn from_operations<'a, A, I>(ops: I) -> Self
    where
        A: AtomicOperation<Resource = R>,
        I: IntoIterator<Item = &'a A>,
    {
        Self::new(ops.into_iter().flat_map(|op| op.resources().iter().cloned()))
    }

    /// Label at slot `idx`.
    pub fn get(&self, idx: usize) -> Option<&R> {
        self.slots.get(idx)
    }

    /// Slot index of `label`.
    pub fn slot_of(&self, label: &R) -> Option<usize> {
        self.slots.binary_search(label).ok()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Labels in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.slots.iter()
    }
}
