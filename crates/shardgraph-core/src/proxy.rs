//! # Proxy Cache
//!
//! Local stand-ins for elements whose authoritative records live in a
//! remote partition.
//!
//! The original design held proxies in weak/soft references reclaimed by
//! an ambient garbage collector. Here the "may be forgotten" signal is
//! explicit: a bounded LRU plus explicit eviction. Entries may vanish at
//! any time; correctness never depends on residency, only performance
//! does, and recreation is idempotent (a recreated proxy carries the same
//! id and type).

use crate::types::{ElementId, TypeId};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// Cache capacity used when an invalid (zero) capacity is requested.
const MIN_CAPACITY: usize = 1;

// =============================================================================
// PROXY
// =============================================================================

/// Immutable stand-in for one remote element.
///
/// A proxy is never mutated and never authoritative: every access to the
/// element it names forwards through the owning partition's `RemoteAccess`
/// capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proxy {
    /// The remote element this proxy stands in for.
    pub id: ElementId,
    /// Type tag resolved from the owning partition when the proxy was minted.
    pub type_id: TypeId,
}

impl Proxy {
    /// Mint a stand-in for a remote element of known type.
    #[must_use]
    pub const fn new(id: ElementId, type_id: TypeId) -> Self {
        Self { id, type_id }
    }
}

// =============================================================================
// PROXY CACHE
// =============================================================================

/// Bounded LRU of remote stand-ins, keyed by kind-qualified element id.
///
/// `Rc` gives the observable the façade relies on: two resolves of the same
/// remote id without intervening eviction return the same instance.
#[derive(Debug)]
pub struct ProxyCache {
    entries: LruCache<ElementId, Rc<Proxy>>,
    hits: u64,
    misses: u64,
}

impl ProxyCache {
    /// Create a cache bounded to `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let bound = NonZeroUsize::new(capacity.max(MIN_CAPACITY)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(bound),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a resident proxy, refreshing its recency.
    pub fn get(&mut self, id: ElementId) -> Option<Rc<Proxy>> {
        match self.entries.get(&id) {
            Some(proxy) => {
                self.hits = self.hits.saturating_add(1);
                Some(Rc::clone(proxy))
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                None
            }
        }
    }

    /// Install a proxy, possibly displacing the least recently used entry.
    pub fn put(&mut self, proxy: Proxy) -> Rc<Proxy> {
        let shared = Rc::new(proxy);
        self.entries.put(proxy.id, Rc::clone(&shared));
        shared
    }

    /// Explicitly forget one entry (the reclamation signal).
    pub fn evict(&mut self, id: ElementId) -> bool {
        self.entries.pop(&id).is_some()
    }

    /// Forget every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of resident entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lifetime lookup hits.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Lifetime lookup misses.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementKind, LocalId, PartitionId};

    fn remote(local: u32) -> ElementId {
        ElementId::new(ElementKind::Vertex, PartitionId(9), LocalId(local))
    }

    #[test]
    fn resident_entry_returns_same_instance() {
        let mut cache = ProxyCache::new(8);
        let put = cache.put(Proxy::new(remote(1), TypeId(0)));
        let got = cache.get(remote(1)).expect("resident");
        assert!(Rc::ptr_eq(&put, &got));
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn eviction_forgets_the_instance() {
        let mut cache = ProxyCache::new(8);
        let first = cache.put(Proxy::new(remote(1), TypeId(0)));
        assert!(cache.evict(remote(1)));
        assert!(cache.get(remote(1)).is_none());

        // Recreation is idempotent: same id and type, new instance.
        let second = cache.put(Proxy::new(remote(1), TypeId(0)));
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(first.id, second.id);
        assert_eq!(first.type_id, second.type_id);
    }

    #[test]
    fn capacity_displaces_least_recently_used() {
        let mut cache = ProxyCache::new(2);
        cache.put(Proxy::new(remote(1), TypeId(0)));
        cache.put(Proxy::new(remote(2), TypeId(0)));
        cache.get(remote(1));
        cache.put(Proxy::new(remote(3), TypeId(0)));

        assert!(cache.get(remote(1)).is_some());
        assert!(cache.get(remote(2)).is_none());
        assert!(cache.get(remote(3)).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = ProxyCache::new(4);
        cache.put(Proxy::new(remote(1), TypeId(0)));
        cache.put(Proxy::new(remote(2), TypeId(0)));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut cache = ProxyCache::new(0);
        cache.put(Proxy::new(remote(1), TypeId(0)));
        assert_eq!(cache.len(), 1);
    }
}
