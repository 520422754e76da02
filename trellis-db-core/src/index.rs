//! The nested triple index
//!
//! [`TripleIndex`] holds the three coordinated maps over stored triples:
//!
//! - SPO: subject → predicate → objects
//! - POS: predicate → object → subjects
//! - OSP: object → subject → predicates
//!
//! Every stored triple appears in all three, so each of the eight pattern
//! shapes can be answered from the index whose leading keys are bound.
//!
//! The innermost container is abstracted by [`Leaf`]: a set for the
//! single-valued variant, an occurrence-count map for the multigraph
//! variant. Counts are strictly positive; removal prunes zero counts, and
//! emptied inner maps are pruned so two indexes holding the same triples
//! compare equal.

use crate::binding::{Binding, BindingValue};
use crate::datom::Triple;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::pattern::TriplePattern;
use crate::predicate::Predicate;
use hashbrown::{HashMap, HashSet};
use smallvec::smallvec;
use std::fmt::Debug;
use std::hash::Hash;

/// Innermost container of a nested triple index
///
/// Implemented by `HashSet<T>` (single-valued: at most one occurrence) and
/// `HashMap<T, u64>` (multigraph: a bag with strictly positive counts).
pub(crate) trait Leaf<T>: Clone + Default + PartialEq + Debug {
    /// Insert one occurrence. Returns false when the insert was a no-op
    /// (single-valued variant, element already present).
    fn insert_one(&mut self, item: T) -> bool;

    /// Remove one occurrence. Returns false when the element was absent.
    fn remove_one(&mut self, item: &T) -> bool;

    /// Check if the element is present
    fn contains(&self, item: &T) -> bool;

    /// Total occurrences, multiplicity included
    fn total(&self) -> u64;

    /// Check if the container holds no elements
    fn is_empty(&self) -> bool;

    /// Visit each distinct element with its multiplicity
    fn for_each(&self, f: impl FnMut(&T, u64));
}

impl<T: Clone + Eq + Hash + Debug> Leaf<T> for HashSet<T> {
    fn insert_one(&mut self, item: T) -> bool {
        HashSet::insert(self, item)
    }

    fn remove_one(&mut self, item: &T) -> bool {
        HashSet::remove(self, item)
    }

    fn contains(&self, item: &T) -> bool {
        HashSet::contains(self, item)
    }

    fn total(&self) -> u64 {
        self.len() as u64
    }

    fn is_empty(&self) -> bool {
        HashSet::is_empty(self)
    }

    fn for_each(&self, mut f: impl FnMut(&T, u64)) {
        for item in self.iter() {
            f(item, 1);
        }
    }
}

impl<T: Clone + Eq + Hash + Debug> Leaf<T> for HashMap<T, u64> {
    fn insert_one(&mut self, item: T) -> bool {
        *self.entry(item).or_insert(0) += 1;
        true
    }

    fn remove_one(&mut self, item: &T) -> bool {
        let Some(count) = self.get_mut(item) else {
            return false;
        };
        *count -= 1;
        let emptied = *count == 0;
        if emptied {
            HashMap::remove(self, item);
        }
        true
    }

    fn contains(&self, item: &T) -> bool {
        self.contains_key(item)
    }

    fn total(&self) -> u64 {
        self.values().sum()
    }

    fn is_empty(&self) -> bool {
        HashMap::is_empty(self)
    }

    fn for_each(&self, mut f: impl FnMut(&T, u64)) {
        for (item, count) in self.iter() {
            f(item, *count);
        }
    }
}

/// The three coordinated nested maps over stored triples
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TripleIndex<LN, LP> {
    spo: HashMap<Node, HashMap<Predicate, LN>>,
    pos: HashMap<Predicate, HashMap<Node, LN>>,
    osp: HashMap<Node, HashMap<Node, LP>>,
}

impl<LN, LP> TripleIndex<LN, LP>
where
    LN: Leaf<Node>,
    LP: Leaf<Predicate>,
{
    /// Insert a triple occurrence into all three maps
    ///
    /// Returns false when nothing changed (single-valued variant, triple
    /// already present); the maps are untouched in that case.
    pub(crate) fn insert(&mut self, s: Node, p: Predicate, o: Node) -> bool {
        let changed = self
            .spo
            .entry(s.clone())
            .or_default()
            .entry(p.clone())
            .or_default()
            .insert_one(o.clone());
        if !changed {
            return false;
        }
        let pos_changed = self
            .pos
            .entry(p.clone())
            .or_default()
            .entry(o.clone())
            .or_default()
            .insert_one(s.clone());
        let osp_changed = self
            .osp
            .entry(o)
            .or_default()
            .entry(s)
            .or_default()
            .insert_one(p);
        debug_assert!(pos_changed && osp_changed, "triple index desync on insert");
        true
    }

    /// Remove a triple occurrence from all three maps, pruning emptied
    /// inner maps
    ///
    /// Returns false when the triple was absent; the maps are untouched in
    /// that case.
    pub(crate) fn remove(&mut self, s: &Node, p: &Predicate, o: &Node) -> bool {
        let Some(preds) = self.spo.get_mut(s) else {
            return false;
        };
        let Some(leaf) = preds.get_mut(p) else {
            return false;
        };
        if !leaf.remove_one(o) {
            return false;
        }
        if leaf.is_empty() {
            preds.remove(p);
        }
        if preds.is_empty() {
            self.spo.remove(s);
        }

        if let Some(objs) = self.pos.get_mut(p) {
            let mut removed = false;
            let mut prune_leaf = false;
            if let Some(leaf) = objs.get_mut(o) {
                removed = leaf.remove_one(s);
                prune_leaf = leaf.is_empty();
            }
            debug_assert!(removed, "triple index desync on remove (POS)");
            if prune_leaf {
                objs.remove(o);
            }
            if objs.is_empty() {
                self.pos.remove(p);
            }
        }

        if let Some(subs) = self.osp.get_mut(o) {
            let mut removed = false;
            let mut prune_leaf = false;
            if let Some(leaf) = subs.get_mut(s) {
                removed = leaf.remove_one(p);
                prune_leaf = leaf.is_empty();
            }
            debug_assert!(removed, "triple index desync on remove (OSP)");
            if prune_leaf {
                subs.remove(s);
            }
            if subs.is_empty() {
                self.osp.remove(o);
            }
        }

        true
    }

    /// Check if the triple is present (in any multiplicity)
    pub(crate) fn contains(&self, s: &Node, p: &Predicate, o: &Node) -> bool {
        self.spo
            .get(s)
            .and_then(|preds| preds.get(p))
            .is_some_and(|leaf| leaf.contains(o))
    }

    /// Total stored triples, multiplicity included
    pub(crate) fn total(&self) -> u64 {
        self.spo
            .values()
            .flat_map(|preds| preds.values())
            .map(|leaf| leaf.total())
            .sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.spo.is_empty()
    }

    /// Resolve a pattern, projecting the unbound positions of each match
    ///
    /// Dispatches to the index whose leading keys are bound. In the
    /// multigraph variant each enumerated element is yielded once per
    /// stored occurrence. The fully ground shape yields at most one empty
    /// row regardless of multiplicity.
    pub(crate) fn resolve(&self, pattern: &TriplePattern) -> Vec<Binding> {
        let mut rows: Vec<Binding> = Vec::new();
        match (
            pattern.s.as_node(),
            pattern.p.as_predicate(),
            pattern.o.as_node(),
        ) {
            (Some(s), Some(p), Some(o)) => {
                if self.contains(s, p, o) {
                    rows.push(Binding::new());
                }
            }
            (Some(s), Some(p), None) => {
                if let Some(leaf) = self.spo.get(s).and_then(|preds| preds.get(p)) {
                    leaf.for_each(|o, n| {
                        for _ in 0..n {
                            rows.push(smallvec![BindingValue::Node(o.clone())]);
                        }
                    });
                }
            }
            (Some(s), None, Some(o)) => {
                if let Some(leaf) = self.osp.get(o).and_then(|subs| subs.get(s)) {
                    leaf.for_each(|p, n| {
                        for _ in 0..n {
                            rows.push(smallvec![BindingValue::Predicate(p.clone())]);
                        }
                    });
                }
            }
            (Some(s), None, None) => {
                if let Some(preds) = self.spo.get(s) {
                    for (p, leaf) in preds {
                        leaf.for_each(|o, n| {
                            for _ in 0..n {
                                rows.push(smallvec![
                                    BindingValue::Predicate(p.clone()),
                                    BindingValue::Node(o.clone()),
                                ]);
                            }
                        });
                    }
                }
            }
            (None, Some(p), Some(o)) => {
                if let Some(leaf) = self.pos.get(p).and_then(|objs| objs.get(o)) {
                    leaf.for_each(|s, n| {
                        for _ in 0..n {
                            rows.push(smallvec![BindingValue::Node(s.clone())]);
                        }
                    });
                }
            }
            (None, Some(p), None) => {
                if let Some(objs) = self.pos.get(p) {
                    for (o, leaf) in objs {
                        leaf.for_each(|s, n| {
                            for _ in 0..n {
                                rows.push(smallvec![
                                    BindingValue::Node(s.clone()),
                                    BindingValue::Node(o.clone()),
                                ]);
                            }
                        });
                    }
                }
            }
            (None, None, Some(o)) => {
                if let Some(subs) = self.osp.get(o) {
                    for (s, leaf) in subs {
                        leaf.for_each(|p, n| {
                            for _ in 0..n {
                                rows.push(smallvec![
                                    BindingValue::Node(s.clone()),
                                    BindingValue::Predicate(p.clone()),
                                ]);
                            }
                        });
                    }
                }
            }
            (None, None, None) => {
                for (s, preds) in &self.spo {
                    for (p, leaf) in preds {
                        leaf.for_each(|o, n| {
                            for _ in 0..n {
                                rows.push(smallvec![
                                    BindingValue::Node(s.clone()),
                                    BindingValue::Predicate(p.clone()),
                                    BindingValue::Node(o.clone()),
                                ]);
                            }
                        });
                    }
                }
            }
        }
        rows
    }

    /// Cardinality of `resolve` for the pattern, without materializing rows
    pub(crate) fn count(&self, pattern: &TriplePattern) -> u64 {
        match (
            pattern.s.as_node(),
            pattern.p.as_predicate(),
            pattern.o.as_node(),
        ) {
            (Some(s), Some(p), Some(o)) => u64::from(self.contains(s, p, o)),
            (Some(s), Some(p), None) => self
                .spo
                .get(s)
                .and_then(|preds| preds.get(p))
                .map_or(0, |leaf| leaf.total()),
            (Some(s), None, Some(o)) => self
                .osp
                .get(o)
                .and_then(|subs| subs.get(s))
                .map_or(0, |leaf| leaf.total()),
            (Some(s), None, None) => self
                .spo
                .get(s)
                .map_or(0, |preds| preds.values().map(|leaf| leaf.total()).sum()),
            (None, Some(p), Some(o)) => self
                .pos
                .get(p)
                .and_then(|objs| objs.get(o))
                .map_or(0, |leaf| leaf.total()),
            (None, Some(p), None) => self
                .pos
                .get(p)
                .map_or(0, |objs| objs.values().map(|leaf| leaf.total()).sum()),
            (None, None, Some(o)) => self
                .osp
                .get(o)
                .map_or(0, |subs| subs.values().map(|leaf| leaf.total()).sum()),
            (None, None, None) => self.total(),
        }
    }

    /// Distinct outgoing edges of a subject, as (predicate, object) pairs
    pub(crate) fn out_edges(&self, s: &Node) -> Vec<(Predicate, Node)> {
        let mut edges = Vec::new();
        if let Some(preds) = self.spo.get(s) {
            for (p, leaf) in preds {
                leaf.for_each(|o, _| edges.push((p.clone(), o.clone())));
            }
        }
        edges
    }

    /// Distinct incoming edges of an object, as (subject, predicate) pairs
    pub(crate) fn in_edges(&self, o: &Node) -> Vec<(Node, Predicate)> {
        let mut edges = Vec::new();
        if let Some(subs) = self.osp.get(o) {
            for (s, leaf) in subs {
                leaf.for_each(|p, _| edges.push((s.clone(), p.clone())));
            }
        }
        edges
    }

    /// Object → distinct subjects map for one predicate, from the POS index
    pub(crate) fn object_subjects(
        &self,
        p: &Predicate,
    ) -> std::collections::HashMap<Node, std::collections::HashSet<Node>> {
        let mut map = std::collections::HashMap::new();
        if let Some(objs) = self.pos.get(p) {
            for (o, leaf) in objs {
                let subs: &mut std::collections::HashSet<Node> =
                    map.entry(o.clone()).or_default();
                leaf.for_each(|s, _| {
                    subs.insert(s.clone());
                });
            }
        }
        map
    }

    /// All stored triples, one entry per occurrence
    pub(crate) fn triples(&self) -> Vec<Triple> {
        let mut out = Vec::new();
        for (s, preds) in &self.spo {
            for (p, leaf) in preds {
                leaf.for_each(|o, n| {
                    for _ in 0..n {
                        out.push(Triple::new(s.clone(), p.clone(), o.clone()));
                    }
                });
            }
        }
        out
    }

    /// Subjects whose SPO sub-index differs between the two indexes
    pub(crate) fn diff_subjects(&self, other: &Self) -> std::collections::HashSet<Node> {
        let mut out = std::collections::HashSet::new();
        for (s, entry) in &self.spo {
            if other.spo.get(s) != Some(entry) {
                out.insert(s.clone());
            }
        }
        for s in other.spo.keys() {
            if !self.spo.contains_key(s) {
                out.insert(s.clone());
            }
        }
        out
    }

    /// All subjects present in the SPO index
    pub(crate) fn subject_nodes(&self) -> std::collections::HashSet<Node> {
        self.spo.keys().cloned().collect()
    }

    /// Verify that the three maps agree and hold no empty entries
    ///
    /// The triple multiset reconstructed from each index must be identical,
    /// and pruning must have removed every emptied leaf and inner map.
    pub(crate) fn check_coherence(&self) -> Result<()> {
        type Counts = HashMap<(Node, Predicate, Node), u64>;

        let mut from_spo: Counts = HashMap::new();
        for (s, preds) in &self.spo {
            if preds.is_empty() {
                return Err(Error::internal(format!("empty SPO entry for subject {s}")));
            }
            for (p, leaf) in preds {
                if leaf.is_empty() {
                    return Err(Error::internal(format!("empty SPO leaf at [{s} {p}]")));
                }
                leaf.for_each(|o, n| {
                    from_spo.insert((s.clone(), p.clone(), o.clone()), n);
                });
            }
        }

        let mut from_pos: Counts = HashMap::new();
        for (p, objs) in &self.pos {
            if objs.is_empty() {
                return Err(Error::internal(format!("empty POS entry for predicate {p}")));
            }
            for (o, leaf) in objs {
                if leaf.is_empty() {
                    return Err(Error::internal(format!("empty POS leaf at [{p} {o}]")));
                }
                leaf.for_each(|s, n| {
                    from_pos.insert((s.clone(), p.clone(), o.clone()), n);
                });
            }
        }

        let mut from_osp: Counts = HashMap::new();
        for (o, subs) in &self.osp {
            if subs.is_empty() {
                return Err(Error::internal(format!("empty OSP entry for object {o}")));
            }
            for (s, leaf) in subs {
                if leaf.is_empty() {
                    return Err(Error::internal(format!("empty OSP leaf at [{o} {s}]")));
                }
                leaf.for_each(|p, n| {
                    from_osp.insert((s.clone(), p.clone(), o.clone()), n);
                });
            }
        }

        if from_spo != from_pos {
            return Err(Error::internal("SPO and POS indexes disagree"));
        }
        if from_spo != from_osp {
            return Err(Error::internal("SPO and OSP indexes disagree"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{NodeTerm, PredTerm};

    type SingleIndex = TripleIndex<HashSet<Node>, HashSet<Predicate>>;
    type MultiIndex = TripleIndex<HashMap<Node, u64>, HashMap<Predicate, u64>>;

    fn a() -> Node {
        Node::iri("a")
    }
    fn b() -> Node {
        Node::iri("b")
    }
    fn knows() -> Predicate {
        Predicate::new("knows")
    }

    #[test]
    fn test_single_insert_is_idempotent() {
        let mut ix = SingleIndex::default();
        assert!(ix.insert(a(), knows(), b()));
        let before = ix.clone();
        assert!(!ix.insert(a(), knows(), b()));
        assert_eq!(ix, before);
        assert_eq!(ix.total(), 1);
    }

    #[test]
    fn test_multi_insert_counts_occurrences() {
        let mut ix = MultiIndex::default();
        assert!(ix.insert(a(), knows(), b()));
        assert!(ix.insert(a(), knows(), b()));
        assert_eq!(ix.total(), 2);
        assert!(ix.check_coherence().is_ok());

        assert!(ix.remove(&a(), &knows(), &b()));
        assert_eq!(ix.total(), 1);
        assert!(ix.remove(&a(), &knows(), &b()));
        assert!(ix.is_empty());
        assert!(!ix.remove(&a(), &knows(), &b()));
    }

    #[test]
    fn test_remove_prunes_inner_maps() {
        let mut ix = SingleIndex::default();
        ix.insert(a(), knows(), b());
        ix.remove(&a(), &knows(), &b());
        assert_eq!(ix, SingleIndex::default());
        assert!(ix.check_coherence().is_ok());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut ix = SingleIndex::default();
        ix.insert(a(), knows(), b());
        let before = ix.clone();
        assert!(!ix.remove(&b(), &knows(), &a()));
        assert!(!ix.remove(&a(), &Predicate::new("other"), &b()));
        assert_eq!(ix, before);
    }

    #[test]
    fn test_multi_resolve_repeats_by_count() {
        let mut ix = MultiIndex::default();
        ix.insert(a(), knows(), b());
        ix.insert(a(), knows(), b());
        let pattern = TriplePattern::new(a(), knows(), NodeTerm::Var);
        assert_eq!(ix.resolve(&pattern).len(), 2);
        assert_eq!(ix.count(&pattern), 2);

        // The fully ground shape has no enumerated position
        let ground = TriplePattern::new(a(), knows(), b());
        assert_eq!(ix.resolve(&ground).len(), 1);
        assert_eq!(ix.count(&ground), 1);
    }

    #[test]
    fn test_full_scan() {
        let mut ix = SingleIndex::default();
        ix.insert(a(), knows(), b());
        ix.insert(b(), knows(), a());
        let all = TriplePattern::new(NodeTerm::Var, PredTerm::Var, NodeTerm::Var);
        assert_eq!(ix.resolve(&all).len(), 2);
        assert_eq!(ix.count(&all), 2);
        for row in ix.resolve(&all) {
            assert_eq!(row.len(), 3);
        }
    }

    #[test]
    fn test_out_and_in_edges() {
        let mut ix = SingleIndex::default();
        ix.insert(a(), knows(), b());
        ix.insert(a(), Predicate::new("likes"), Node::Long(5));
        let out = ix.out_edges(&a());
        assert_eq!(out.len(), 2);
        let into = ix.in_edges(&b());
        assert_eq!(into, vec![(a(), knows())]);
    }

    #[test]
    fn test_object_subjects() {
        let mut ix = SingleIndex::default();
        ix.insert(a(), knows(), b());
        ix.insert(b(), knows(), Node::iri("c"));
        let map = ix.object_subjects(&knows());
        assert_eq!(map.len(), 2);
        assert!(map[&b()].contains(&a()));
        assert!(map[&Node::iri("c")].contains(&b()));
    }

    #[test]
    fn test_diff_subjects() {
        let mut left = SingleIndex::default();
        left.insert(a(), knows(), b());
        left.insert(b(), knows(), a());
        let mut right = left.clone();
        right.remove(&b(), &knows(), &a());
        right.insert(Node::iri("c"), knows(), a());

        let diff = left.diff_subjects(&right);
        assert!(diff.contains(&b()));
        assert!(diff.contains(&Node::iri("c")));
        assert!(!diff.contains(&a()));
    }
}
