//! Tag-keyed singleton cache backing the `Cached` meta-operation.
//!
//! Each tag resolves to at most one realized value for the lifetime of the
//! cache (or until [`SingletonCache::clear`]). The first resolution invokes the
//! generator; every later resolution returns the same `Arc`, aliased across
//! all callers.
//!
//! # Lifecycle
//! - [`SingletonCache::global`] is the process-wide instance, created on first
//!   use and never dropped. [`reset_global_cache`] empties it (test isolation).
//! - Independent caches can be created with [`SingletonCache::new`] and injected
//!   into `Cached` meta-operations, so tests need not share global state.
//!
//! # Thread safety
//! The slot map is guarded by a mutex held only for lookup/insert. Generation
//! runs inside a per-tag `OnceCell`, so concurrent first misses on one tag
//! block on a single generator invocation. Resolving a tag from inside its own
//! generator deadlocks; such a composition is cyclic and unsupported.
//!
//! # References
//! - *Memoization*: Michie, "Memo functions and machine learning", Nature (1968)

use crate::core::{AtomicOperation, Element};
use crate::fingerprint::{Canonicalizable, HashValue};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Domain for cache tag digests (version 0).
const DOMAIN_CACHE_TAG_V0: &[u8] = b"CACHE_TAG_V0";

/// Opaque, fixed-width cache key.
///
/// Built from a label or from canonical bytes; two tags are equal iff their
/// sources are byte-equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagKey(HashValue);

impl TagKey {
    /// Creates a tag from a human-readable label.
    pub fn new(label: &str) -> Self {
        Self::from_bytes(label.as_bytes())
    }

    /// Creates a tag from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(HashValue::hash_with_domain(DOMAIN_CACHE_TAG_V0, bytes))
    }

    /// Creates a tag from any canonicalizable value.
    pub fn from_canonical<T: Canonicalizable + ?Sized>(value: &T) -> Self {
        Self::from_bytes(&value.to_canonical_bytes())
    }

    /// Underlying digest.
    pub fn digest(&self) -> HashValue {
        self.0
    }
}

impl From<&str> for TagKey {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl std::fmt::Display for TagKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tag:{}", self.0.short_hex())
    }
}

/// Hit/miss counters for a [`SingletonCache`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetrics {
    /// Resolutions served from an existing entry.
    pub hits: u64,
    /// Resolutions that invoked a generator.
    pub misses: u64,
    /// Number of times the cache was cleared.
    pub resets: u64,
}

impl CacheMetrics {
    /// Records a cache hit.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Records a cache miss.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records a reset.
    pub fn record_reset(&mut self) {
        self.resets += 1;
    }

    /// Fraction of resolutions served from the cache, `0.0` if none happened.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Serializes the counters to CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    /// Deserializes counters from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, serde_cbor::Error> {
        serde_cbor::from_slice(bytes)
    }
}

type ErasedSlot = Arc<dyn Any + Send + Sync>;
type TypedSlot<A> = Arc<OnceCell<Arc<Element<A>>>>;

/// Process-wide (or injected) mapping from tag to realized value.
///
/// Entries are keyed by `(operation type, tag)`, so one tag can be reused for
/// unrelated operation types without collision. Entries are never evicted.
#[derive(Default)]
pub struct SingletonCache {
    slots: Mutex<HashMap<(TypeId, TagKey), ErasedSlot>>,
    metrics: Mutex<CacheMetrics>,
}

static GLOBAL_CACHE: Lazy<Arc<SingletonCache>> = Lazy::new(|| Arc::new(SingletonCache::new()));

impl SingletonCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle on the process-wide cache.
    pub fn global() -> Arc<SingletonCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    /// Returns the value stored under `tag`, invoking `generate` on first miss.
    ///
    /// `generate` runs at most once per `(A, tag)` for the lifetime of the
    /// entry, even under concurrent resolution.
    pub fn resolve<A, F>(&self, tag: &TagKey, generate: F) -> Arc<Element<A>>
    where
        A: AtomicOperation,
        F: FnOnce() -> Element<A>,
    {
        let slot = self.slot::<A>(tag);
        let mut generated = false;
        let value = slot.get_or_init(|| {
            generated = true;
            Arc::new(generate())
        });
        let mut metrics = self.metrics.lock();
        if generated {
            metrics.record_miss();
            tracing::debug!(%tag, "singleton cache miss");
        } else {
            metrics.record_hit();
            tracing::trace!(%tag, "singleton cache hit");
        }
        Arc::clone(value)
    }

    /// Returns the stored value without generating.
    pub fn get<A: AtomicOperation>(&self, tag: &TagKey) -> Option<Arc<Element<A>>> {
        let slots = self.slots.lock();
        let erased = slots.get(&(TypeId::of::<A>(), *tag))?;
        let typed = Arc::clone(erased).downcast::<OnceCell<Arc<Element<A>>>>().ok()?;
        typed.get().cloned()
    }

    /// Returns `true` if a value is stored under `tag` for operation type `A`.
    pub fn contains<A: AtomicOperation>(&self, tag: &TagKey) -> bool {
        self.get::<A>(tag).is_some()
    }

    /// Number of tags with a slot (realized or in flight).
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Drops every entry. Values already handed out stay alive in their holders.
    pub fn clear(&self) {
        let dropped = {
            let mut slots = self.slots.lock();
            let n = slots.len();
            slots.clear();
            n
        };
        self.metrics.lock().record_reset();
        tracing::trace!(dropped, "singleton cache cleared");
    }

    /// Snapshot of the hit/miss counters.
    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.lock().clone()
    }

    fn slot<A: AtomicOperation>(&self, tag: &TagKey) -> TypedSlot<A> {
        let key = (TypeId::of::<A>(), *tag);
        let mut slots = self.slots.lock();
        if let Some(existing) = slots.get(&key) {
            if let Ok(typed) = Arc::clone(existing).downcast::<OnceCell<Arc<Element<A>>>>() {
                return typed;
            }
        }
        let typed: TypedSlot<A> = Arc::new(OnceCell::new());
        slots.insert(key, Arc::clone(&typed) as ErasedSlot);
        typed
    }
}

impl std::fmt::Debug for SingletonCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonCache")
            .field("entries", &self.len())
            .field("metrics", &self.metrics())
            .finish()
    }
}

/// Clears the process-wide cache. Affects every tag.
pub fn reset_global_cache() {
    GLOBAL_CACHE.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{h, x, Gate};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn tag_keys_are_deterministic() {
        assert_eq!(TagKey::new("oracle"), TagKey::from("oracle"));
        assert_ne!(TagKey::new("oracle"), TagKey::new("oracle2"));
        assert_eq!(TagKey::new("ab"), TagKey::from_bytes(b"ab"));
    }

    #[test]
    fn generator_runs_once_per_tag() {
        let cache = SingletonCache::new();
        let calls = AtomicUsize::new(0);
        let tag = TagKey::new("X");
        for _ in 0..5 {
            let value = cache.resolve::<Gate, _>(&tag, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Element::Op(h(0))
            });
            assert_eq!(value.as_op(), Some(&h(0)));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let metrics = cache.metrics();
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.hits, 4);
        assert!((metrics.hit_rate() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn hits_are_aliased() {
        let cache = SingletonCache::new();
        let tag = TagKey::new("alias");
        let first = cache.resolve::<Gate, _>(&tag, || Element::Op(h(1)));
        let second = cache.resolve::<Gate, _>(&tag, || Element::Op(x(1)));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.as_op(), Some(&h(1)));
    }

    #[test]
    fn clear_forgets_entries() {
        let cache = SingletonCache::new();
        let tag = TagKey::new("reset");
        let _ = cache.resolve::<Gate, _>(&tag, || Element::Op(h(0)));
        assert!(cache.contains::<Gate>(&tag));
        cache.clear();
        assert!(cache.is_empty());
        let fresh = cache.resolve::<Gate, _>(&tag, || Element::Op(x(0)));
        assert_eq!(fresh.as_op(), Some(&x(0)));
        assert_eq!(cache.metrics().resets, 1);
    }

    #[test]
    fn concurrent_first_miss_generates_once() {
        let cache = Arc::new(SingletonCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let tag = TagKey::new("race");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    cache.resolve::<Gate, _>(&tag, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(5));
                        Element::Op(h(2))
                    })
                })
            })
            .collect();
        let values: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(values.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn metrics_cbor_roundtrip() {
        let metrics = CacheMetrics {
            hits: 3,
            misses: 1,
            resets: 2,
        };
        let bytes = metrics.to_cbor().expect("serialization should succeed");
        let decoded = CacheMetrics::from_cbor(&bytes).expect("deserialization should succeed");
        assert_eq!(decoded, metrics);
    }
}
