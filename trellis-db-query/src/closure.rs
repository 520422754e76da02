//! Predicate closure and its memo cache
//!
//! For patterns with a bound predicate, transitive resolution works over the
//! object → subjects map of that predicate (built from the POS index). This
//! module computes the transitive closure of such a map by iterative
//! fixed-point and memoizes the result in a small bounded cache.
//!
//! The closure computation is pure, so the cache is purely an optimization:
//! two threads racing on the same key compute identical values and either
//! insertion is correct.

use crate::ObjectSubjects;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;
use trellis_db_core::Node;

/// Default number of memoized closures
///
/// Deliberately tiny: the cache amortizes repeated closures of the same
/// predicate across queries, and callers must not rely on hits.
pub const DEFAULT_MEMO_CAPACITY: usize = 2;

/// Transitive closure of an object → subjects map
///
/// Repeatedly, for each object `o` and each subject `s ∈ M[o]` that is
/// itself a key of the map, merges `M[s]` into `M[o]`; stops when a full
/// pass changes nothing. The result is a fixed point: running one more
/// pass leaves it unchanged.
pub fn transitive_closure(map: &ObjectSubjects) -> ObjectSubjects {
    let mut closure = map.clone();
    let objects: Vec<Node> = closure.keys().cloned().collect();
    loop {
        let mut changed = false;
        for o in &objects {
            let mut additions: Vec<Node> = Vec::new();
            if let Some(subjects) = closure.get(o) {
                for s in subjects {
                    if s == o {
                        continue;
                    }
                    if let Some(reachable) = closure.get(s) {
                        additions.extend(
                            reachable
                                .iter()
                                .filter(|n| !subjects.contains(*n))
                                .cloned(),
                        );
                    }
                }
            }
            if !additions.is_empty() {
                changed = true;
                if let Some(subjects) = closure.get_mut(o) {
                    subjects.extend(additions);
                }
            }
        }
        if !changed {
            break;
        }
    }
    closure
}

/// Add reflexive entries for every node observed in the map
///
/// Used for `*` semantics: each key and each member gains itself as a
/// subject, so zero-length paths resolve.
pub(crate) fn reflexive_augment(closure: &mut ObjectSubjects) {
    let mut observed: Vec<Node> = closure.keys().cloned().collect();
    for subjects in closure.values() {
        observed.extend(subjects.iter().cloned());
    }
    for node in observed {
        closure.entry(node.clone()).or_default().insert(node);
    }
}

/// Bounded memo cache from an object → subjects map to its closure
///
/// Keys compare by value. Lookup moves a hit to the most-recent slot;
/// insertion beyond capacity evicts the least-recent entry. Shared across
/// threads behind a mutex; the computation itself runs outside the lock.
#[derive(Debug)]
pub struct ClosureCache {
    entries: Mutex<Vec<(ObjectSubjects, Arc<ObjectSubjects>)>>,
    capacity: usize,
}

impl ClosureCache {
    /// Create a cache with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMO_CAPACITY)
    }

    /// Create a cache holding at most `capacity` closures
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// The closure of `map`, computed on miss and memoized
    pub fn get_or_compute(&self, map: &ObjectSubjects) -> Arc<ObjectSubjects> {
        {
            let mut entries = self.entries.lock();
            if let Some(at) = entries.iter().position(|(key, _)| key == map) {
                let entry = entries.remove(at);
                let value = entry.1.clone();
                entries.push(entry);
                trace!(objects = map.len(), "closure cache hit");
                return value;
            }
        }

        // Compute outside the lock; a racing thread at worst repeats the
        // same pure computation.
        let value = Arc::new(transitive_closure(map));
        trace!(objects = map.len(), "closure cache miss");

        let mut entries = self.entries.lock();
        if let Some(at) = entries.iter().position(|(key, _)| key == map) {
            return entries[at].1.clone();
        }
        entries.push((map.clone(), value.clone()));
        if entries.len() > self.capacity {
            entries.remove(0);
        }
        value
    }

    /// Number of memoized closures
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop all memoized closures
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for ClosureCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn n(name: &str) -> Node {
        Node::iri(name)
    }

    fn map_of(edges: &[(&str, &str)]) -> ObjectSubjects {
        let mut map = ObjectSubjects::new();
        for (o, s) in edges {
            map.entry(n(o)).or_default().insert(n(s));
        }
        map
    }

    #[test]
    fn test_chain_closure() {
        // a -p-> b -p-> c as object → subjects: {b: {a}, c: {b}}
        let closure = transitive_closure(&map_of(&[("b", "a"), ("c", "b")]));
        assert_eq!(closure[&n("b")], HashSet::from([n("a")]));
        assert_eq!(closure[&n("c")], HashSet::from([n("a"), n("b")]));
    }

    #[test]
    fn test_closure_is_fixed_point() {
        let closure = transitive_closure(&map_of(&[
            ("b", "a"),
            ("c", "b"),
            ("d", "c"),
            ("a", "d"),
        ]));
        assert_eq!(transitive_closure(&closure), closure);
    }

    #[test]
    fn test_cycle_terminates() {
        let closure = transitive_closure(&map_of(&[("a", "b"), ("b", "a")]));
        assert_eq!(closure[&n("a")], HashSet::from([n("a"), n("b")]));
        assert_eq!(closure[&n("b")], HashSet::from([n("a"), n("b")]));
    }

    #[test]
    fn test_reflexive_augment() {
        let mut closure = transitive_closure(&map_of(&[("b", "a")]));
        reflexive_augment(&mut closure);
        assert_eq!(closure[&n("a")], HashSet::from([n("a")]));
        assert_eq!(closure[&n("b")], HashSet::from([n("a"), n("b")]));
    }

    #[test]
    fn test_cache_hit_returns_same_closure() {
        let cache = ClosureCache::new();
        let map = map_of(&[("b", "a"), ("c", "b")]);
        let first = cache.get_or_compute(&map);
        let second = cache.get_or_compute(&map);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_evicts_beyond_capacity() {
        let cache = ClosureCache::with_capacity(2);
        let first = map_of(&[("b", "a")]);
        let second = map_of(&[("c", "b")]);
        let third = map_of(&[("d", "c")]);
        cache.get_or_compute(&first);
        cache.get_or_compute(&second);
        cache.get_or_compute(&third);
        assert_eq!(cache.len(), 2);

        // The least-recent entry was evicted; recomputing it is a miss
        let recomputed = cache.get_or_compute(&first);
        assert_eq!(*recomputed, transitive_closure(&first));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_clear() {
        let cache = ClosureCache::new();
        cache.get_or_compute(&map_of(&[("b", "a")]));
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
