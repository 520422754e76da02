//! Immutable graph snapshots
//!
//! A [`Graph`] is an immutable snapshot of the triple store: three
//! coordinated indexes plus a variant tag. The single-valued variant holds
//! each triple at most once; the multigraph variant is a bag that counts
//! occurrences.
//!
//! ## Snapshots and successors
//!
//! Published graph values never mutate. [`Graph::add`] and [`Graph::delete`]
//! return a successor value together with a change flag; when the operation
//! was a no-op (duplicate add in the single variant, delete of an absent
//! triple) the successor is equal to the receiver and the flag is false.
//! The transactor keys datom emission on that flag.
//!
//! The mutating forms [`Graph::insert`] and [`Graph::remove`] exist for
//! code folding many writes into a graph it owns exclusively, before
//! publication. Snapshots handed to other components must only be advanced
//! through `add`/`delete`.
//!
//! Graphs are freely shareable across threads; every operation here is
//! synchronous and CPU-bound.

use crate::binding::Binding;
use crate::datom::Triple;
use crate::error::Result;
use crate::index::TripleIndex;
use crate::node::Node;
use crate::pattern::TriplePattern;
use crate::predicate::Predicate;
use std::collections::{HashMap, HashSet};

type SingleIndex = TripleIndex<hashbrown::HashSet<Node>, hashbrown::HashSet<Predicate>>;
type MultiIndex = TripleIndex<hashbrown::HashMap<Node, u64>, hashbrown::HashMap<Predicate, u64>>;

/// Object → subjects map for one predicate, as built from the POS index
///
/// The transitive resolver computes fixed-point closures of these maps.
pub type ObjectSubjects = HashMap<Node, HashSet<Node>>;

/// Variant of a graph value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphKind {
    /// Each triple stored at most once
    Single,
    /// Occurrence-counted multigraph
    Multi,
}

#[derive(Clone, Debug, PartialEq)]
enum Inner {
    Single(SingleIndex),
    Multi(MultiIndex),
}

/// An immutable graph-index snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    inner: Inner,
}

impl Graph {
    /// Create an empty single-valued graph
    pub fn single() -> Self {
        Graph {
            inner: Inner::Single(SingleIndex::default()),
        }
    }

    /// Create an empty multigraph
    pub fn multi() -> Self {
        Graph {
            inner: Inner::Multi(MultiIndex::default()),
        }
    }

    /// Create an empty graph of the same variant as this one
    pub fn empty(&self) -> Self {
        match self.kind() {
            GraphKind::Single => Graph::single(),
            GraphKind::Multi => Graph::multi(),
        }
    }

    /// The variant of this graph
    pub fn kind(&self) -> GraphKind {
        match &self.inner {
            Inner::Single(_) => GraphKind::Single,
            Inner::Multi(_) => GraphKind::Multi,
        }
    }

    /// Insert a triple into this owned, unpublished graph
    ///
    /// Returns false when nothing changed (single variant, triple already
    /// present). The multigraph variant always changes: the occurrence
    /// count increments.
    pub fn insert(&mut self, s: Node, p: Predicate, o: Node) -> bool {
        match &mut self.inner {
            Inner::Single(ix) => ix.insert(s, p, o),
            Inner::Multi(ix) => ix.insert(s, p, o),
        }
    }

    /// Remove one occurrence of a triple from this owned, unpublished graph
    ///
    /// Returns false when the triple was absent.
    pub fn remove(&mut self, s: &Node, p: &Predicate, o: &Node) -> bool {
        match &mut self.inner {
            Inner::Single(ix) => ix.remove(s, p, o),
            Inner::Multi(ix) => ix.remove(s, p, o),
        }
    }

    /// Successor graph with the triple added, plus a change flag
    ///
    /// When the triple is already present in the single variant the
    /// returned graph equals the receiver and the flag is false.
    pub fn add(&self, s: Node, p: Predicate, o: Node) -> (Graph, bool) {
        let mut next = self.clone();
        let changed = next.insert(s, p, o);
        (next, changed)
    }

    /// Successor graph with one occurrence of the triple removed, plus a
    /// change flag
    ///
    /// When the triple is absent the returned graph equals the receiver and
    /// the flag is false.
    pub fn delete(&self, s: &Node, p: &Predicate, o: &Node) -> (Graph, bool) {
        let mut next = self.clone();
        let changed = next.remove(s, p, o);
        (next, changed)
    }

    /// Check if the triple is present (in any multiplicity)
    pub fn contains(&self, s: &Node, p: &Predicate, o: &Node) -> bool {
        match &self.inner {
            Inner::Single(ix) => ix.contains(s, p, o),
            Inner::Multi(ix) => ix.contains(s, p, o),
        }
    }

    /// Total stored triples, multiplicity included
    pub fn len(&self) -> u64 {
        match &self.inner {
            Inner::Single(ix) => ix.total(),
            Inner::Multi(ix) => ix.total(),
        }
    }

    /// Check if the graph holds no triples
    pub fn is_empty(&self) -> bool {
        match &self.inner {
            Inner::Single(ix) => ix.is_empty(),
            Inner::Multi(ix) => ix.is_empty(),
        }
    }

    /// Resolve a pattern against the stored triples
    ///
    /// Each row projects the pattern's unbound positions in s, p, o order.
    /// Row ordering is unspecified. Absent keys yield empty results, never
    /// errors.
    pub fn resolve(&self, pattern: &TriplePattern) -> Vec<Binding> {
        match &self.inner {
            Inner::Single(ix) => ix.resolve(pattern),
            Inner::Multi(ix) => ix.resolve(pattern),
        }
    }

    /// Cardinality of `resolve` for the pattern, without materializing rows
    pub fn count(&self, pattern: &TriplePattern) -> u64 {
        match &self.inner {
            Inner::Single(ix) => ix.count(pattern),
            Inner::Multi(ix) => ix.count(pattern),
        }
    }

    /// Subjects whose SPO sub-index differs between the two graphs
    ///
    /// Used for change tracking between graph generations. Graphs of
    /// different variants differ at every subject present in either.
    pub fn diff(&self, other: &Graph) -> HashSet<Node> {
        match (&self.inner, &other.inner) {
            (Inner::Single(a), Inner::Single(b)) => a.diff_subjects(b),
            (Inner::Multi(a), Inner::Multi(b)) => a.diff_subjects(b),
            (Inner::Single(a), Inner::Multi(b)) => {
                let mut subjects = a.subject_nodes();
                subjects.extend(b.subject_nodes());
                subjects
            }
            (Inner::Multi(a), Inner::Single(b)) => {
                let mut subjects = a.subject_nodes();
                subjects.extend(b.subject_nodes());
                subjects
            }
        }
    }

    /// Distinct outgoing edges of a subject, as (predicate, object) pairs
    pub fn out_edges(&self, s: &Node) -> Vec<(Predicate, Node)> {
        match &self.inner {
            Inner::Single(ix) => ix.out_edges(s),
            Inner::Multi(ix) => ix.out_edges(s),
        }
    }

    /// Distinct incoming edges of an object, as (subject, predicate) pairs
    pub fn in_edges(&self, o: &Node) -> Vec<(Node, Predicate)> {
        match &self.inner {
            Inner::Single(ix) => ix.in_edges(o),
            Inner::Multi(ix) => ix.in_edges(o),
        }
    }

    /// Object → distinct subjects map for one predicate
    pub fn object_subjects(&self, p: &Predicate) -> ObjectSubjects {
        match &self.inner {
            Inner::Single(ix) => ix.object_subjects(p),
            Inner::Multi(ix) => ix.object_subjects(p),
        }
    }

    /// All stored triples, one entry per occurrence
    pub fn triples(&self) -> Vec<Triple> {
        match &self.inner {
            Inner::Single(ix) => ix.triples(),
            Inner::Multi(ix) => ix.triples(),
        }
    }

    /// Verify that the three indexes agree and hold no empty entries
    ///
    /// Returns [`InternalInvariant`](crate::Error::InternalInvariant) on
    /// desync; a failure indicates a bug in the engine itself.
    pub fn check_coherence(&self) -> Result<()> {
        match &self.inner {
            Inner::Single(ix) => ix.check_coherence(),
            Inner::Multi(ix) => ix.check_coherence(),
        }
    }
}
