//! Transitive pattern resolution
//!
//! Resolves the eight pattern shapes under `*` (reflexive-transitive) or
//! `+` (transitive) semantics. Each shape has its own strategy:
//!
//! - all three positions bound: path existence between two nodes
//! - subject and object bound: the first-found shortest predicate path
//! - only subject (or only object) bound: forward (reverse) reachability
//! - predicate bound: fixed-point closure of that predicate's
//!   object → subjects map, then projection
//! - nothing bound: an error; closing over every predicate is unsupported
//!
//! Path traversal follows edges into reference nodes only; literals can
//! terminate a path but never continue one. The path-existence strategy
//! deliberately ignores the bound predicate and asks whether the object is
//! reachable from the subject over any edge.

use crate::closure::{reflexive_augment, ClosureCache};
use crate::error::{QueryError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::smallvec;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;
use trellis_db_core::{
    Binding, BindingValue, Graph, Node, ObjectSubjects, PredTerm, Predicate, Transitivity,
    TriplePattern,
};

/// Resolver for transitive patterns
///
/// Owns the closure memo cache, so dropping the resolver (or calling
/// [`reset`](TransitiveResolver::reset)) discards all memoized closures.
/// Shareable across threads.
#[derive(Debug, Default)]
pub struct TransitiveResolver {
    cache: ClosureCache,
}

impl TransitiveResolver {
    /// Create a resolver with the default memo capacity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver around an explicitly configured cache
    pub fn with_cache(cache: ClosureCache) -> Self {
        Self { cache }
    }

    /// Drop all memoized closures
    pub fn reset(&self) {
        self.cache.clear();
    }

    /// Resolve a pattern under the given transitivity mode
    ///
    /// Bound predicates are reduced to their [plain](Predicate::plain) form
    /// before consulting the indexes, so tagged and untagged spellings
    /// reach the same stored triples.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnboundClosure`] when all three positions are
    /// variables.
    pub fn resolve(
        &self,
        graph: &Graph,
        mode: Transitivity,
        pattern: &TriplePattern,
    ) -> Result<Vec<Binding>> {
        match (
            pattern.s.as_node(),
            pattern.p.as_predicate(),
            pattern.o.as_node(),
        ) {
            (None, None, None) => Err(QueryError::UnboundClosure {
                pattern: pattern.clone(),
            }),
            // Path existence ignores the bound predicate: "is o reachable
            // from s over any edge"
            (Some(s), Some(_), Some(o)) => Ok(path_exists(graph, mode, s, o)),
            (Some(s), None, Some(o)) => Ok(predicate_path(graph, mode, s, o)),
            (Some(s), Some(p), None) => Ok(self.closure_objects(graph, mode, s, p)),
            (Some(s), None, None) => Ok(reach_from(graph, mode, s)),
            (None, Some(p), Some(o)) => Ok(self.closure_subjects(graph, mode, p, o)),
            (None, Some(p), None) => Ok(self.closure_pairs(graph, mode, p)),
            (None, None, Some(o)) => Ok(reach_into(graph, mode, o)),
        }
    }

    /// (v,v,?) - objects transitively reachable from `s` over `p`
    fn closure_objects(
        &self,
        graph: &Graph,
        mode: Transitivity,
        s: &Node,
        p: &Predicate,
    ) -> Vec<Binding> {
        let closed = self.closed_map(graph, mode, p);
        closed
            .iter()
            .filter(|(_, subjects)| subjects.contains(s))
            .map(|(o, _)| smallvec![BindingValue::Node(o.clone())])
            .collect()
    }

    /// (?,v,v) - subjects transitively reaching `o` over `p`
    fn closure_subjects(
        &self,
        graph: &Graph,
        mode: Transitivity,
        p: &Predicate,
        o: &Node,
    ) -> Vec<Binding> {
        let closed = self.closed_map(graph, mode, p);
        closed.get(o).map_or_else(Vec::new, |subjects| {
            subjects
                .iter()
                .map(|s| smallvec![BindingValue::Node(s.clone())])
                .collect()
        })
    }

    /// (?,v,?) - every (subject, object) pair in the closure of `p`
    fn closure_pairs(&self, graph: &Graph, mode: Transitivity, p: &Predicate) -> Vec<Binding> {
        let closed = self.closed_map(graph, mode, p);
        let mut rows = Vec::new();
        for (o, subjects) in closed.iter() {
            for s in subjects {
                rows.push(smallvec![
                    BindingValue::Node(s.clone()),
                    BindingValue::Node(o.clone()),
                ]);
            }
        }
        rows
    }

    /// The (memoized) closed object → subjects map of a predicate, with
    /// reflexive entries added under `*` semantics
    fn closed_map(&self, graph: &Graph, mode: Transitivity, p: &Predicate) -> Arc<ObjectSubjects> {
        let map = graph.object_subjects(&p.plain());
        let closed = self.cache.get_or_compute(&map);
        match mode {
            Transitivity::Plus => closed,
            Transitivity::Star => {
                let mut augmented = (*closed).clone();
                reflexive_augment(&mut augmented);
                Arc::new(augmented)
            }
        }
    }
}

/// Route a pattern to direct or transitive resolution
///
/// The query layer's entry point: a pattern whose bound predicate carries a
/// transitivity tag goes to the resolver; everything else resolves directly
/// against the graph.
pub fn resolve_pattern(
    resolver: &TransitiveResolver,
    graph: &Graph,
    pattern: &TriplePattern,
) -> Result<Vec<Binding>> {
    if let PredTerm::Predicate(p) = &pattern.p {
        if let Some(mode) = p.transitivity() {
            debug!(%pattern, ?mode, "transitive resolve");
            return resolver.resolve(graph, mode, pattern);
        }
    }
    Ok(graph.resolve(pattern))
}

/// (v,v,v) - is `o` reachable from `s` over any edge?
///
/// Breadth-first from `s`; succeeds the moment `o` shows up as an edge
/// target. Under `*` semantics identical endpoints succeed immediately.
fn path_exists(graph: &Graph, mode: Transitivity, s: &Node, o: &Node) -> Vec<Binding> {
    if mode == Transitivity::Star && s == o {
        return vec![Binding::new()];
    }
    let mut visited: FxHashSet<Node> = FxHashSet::default();
    visited.insert(s.clone());
    let mut queue: VecDeque<Node> = VecDeque::from([s.clone()]);
    while let Some(current) = queue.pop_front() {
        for (_, target) in graph.out_edges(&current) {
            if target == *o {
                return vec![Binding::new()];
            }
            if target.is_ref() && visited.insert(target.clone()) {
                queue.push_back(target);
            }
        }
    }
    Vec::new()
}

/// (v,?,v) - the first-found shortest predicate path from `s` to `o`
///
/// Returns at most one row holding the sequence of predicates taken. Under
/// `*` semantics identical endpoints yield the empty path.
fn predicate_path(graph: &Graph, mode: Transitivity, s: &Node, o: &Node) -> Vec<Binding> {
    if mode == Transitivity::Star && s == o {
        return vec![smallvec![BindingValue::Path(Vec::new())]];
    }
    let mut visited: FxHashSet<Node> = FxHashSet::default();
    visited.insert(s.clone());
    let mut parent: FxHashMap<Node, (Node, Predicate)> = FxHashMap::default();
    let mut queue: VecDeque<Node> = VecDeque::from([s.clone()]);
    while let Some(current) = queue.pop_front() {
        for (p, target) in graph.out_edges(&current) {
            if target == *o {
                // Walk back from the hop's source to s, then append the hop
                let mut path = vec![p];
                let mut node = current.clone();
                while node != *s {
                    match parent.get(&node) {
                        Some((prev, pred)) => {
                            path.push(pred.clone());
                            node = prev.clone();
                        }
                        None => break,
                    }
                }
                path.reverse();
                return vec![smallvec![BindingValue::Path(path)]];
            }
            if target.is_ref() && visited.insert(target.clone()) {
                parent.insert(target.clone(), (current.clone(), p));
                queue.push_back(target);
            }
        }
    }
    Vec::new()
}

/// (v,?,?) - reachability from `s`
///
/// For each predicate out of `s`: the direct objects plus every node
/// transitively downstream of them over any edge, paired with that
/// predicate. Under `*` semantics `s` itself joins each downstream set.
fn reach_from(graph: &Graph, mode: Transitivity, s: &Node) -> Vec<Binding> {
    let mut by_predicate: FxHashMap<Predicate, Vec<Node>> = FxHashMap::default();
    for (p, o) in graph.out_edges(s) {
        by_predicate.entry(p).or_default().push(o);
    }

    let mut rows = Vec::new();
    for (p, directs) in by_predicate {
        let mut downstream: FxHashSet<Node> = FxHashSet::default();
        let mut queue: VecDeque<Node> = VecDeque::new();
        for o in directs {
            if downstream.insert(o.clone()) && o.is_ref() {
                queue.push_back(o);
            }
        }
        while let Some(current) = queue.pop_front() {
            for (_, target) in graph.out_edges(&current) {
                if downstream.insert(target.clone()) && target.is_ref() {
                    queue.push_back(target);
                }
            }
        }
        if mode == Transitivity::Star {
            downstream.insert(s.clone());
        }
        for node in downstream {
            rows.push(smallvec![
                BindingValue::Predicate(p.clone()),
                BindingValue::Node(node),
            ]);
        }
    }
    rows
}

/// (?,?,v) - reverse reachability into `o`
///
/// Mirror image of [`reach_from`]: for each predicate terminating at `o`,
/// the direct subjects plus every node transitively upstream of them over
/// any edge. Under `*` semantics `o` itself joins each upstream set.
fn reach_into(graph: &Graph, mode: Transitivity, o: &Node) -> Vec<Binding> {
    let mut by_predicate: FxHashMap<Predicate, Vec<Node>> = FxHashMap::default();
    for (s, p) in graph.in_edges(o) {
        by_predicate.entry(p).or_default().push(s);
    }

    let mut rows = Vec::new();
    for (p, directs) in by_predicate {
        let mut upstream: FxHashSet<Node> = FxHashSet::default();
        let mut queue: VecDeque<Node> = VecDeque::new();
        for s in directs {
            if upstream.insert(s.clone()) && s.is_ref() {
                queue.push_back(s);
            }
        }
        while let Some(current) = queue.pop_front() {
            for (source, _) in graph.in_edges(&current) {
                if upstream.insert(source.clone()) && source.is_ref() {
                    queue.push_back(source);
                }
            }
        }
        if mode == Transitivity::Star {
            upstream.insert(o.clone());
        }
        for node in upstream {
            rows.push(smallvec![
                BindingValue::Node(node),
                BindingValue::Predicate(p.clone()),
            ]);
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_db_core::NodeTerm;

    fn n(name: &str) -> Node {
        Node::iri(name)
    }

    fn p() -> Predicate {
        Predicate::new("p")
    }

    fn chain(names: &[&str]) -> Graph {
        let mut graph = Graph::single();
        for pair in names.windows(2) {
            graph.insert(n(pair[0]), p(), n(pair[1]));
        }
        graph
    }

    fn rows_as_nodes(rows: &[Binding]) -> Vec<Node> {
        rows.iter()
            .filter_map(|row| row[0].as_node().cloned())
            .collect()
    }

    #[test]
    fn test_path_exists_ignores_predicate() {
        let mut graph = chain(&["a", "b"]);
        graph.insert(n("b"), Predicate::new("other"), n("c"));
        // a reaches c even though no single predicate spans the path
        let pattern = TriplePattern::new(n("a"), p(), n("c"));
        let resolver = TransitiveResolver::new();
        let rows = resolver
            .resolve(&graph, Transitivity::Plus, &pattern)
            .unwrap();
        assert_eq!(rows, vec![Binding::new()]);
    }

    #[test]
    fn test_path_does_not_pass_through_literals() {
        let mut graph = Graph::single();
        graph.insert(n("a"), p(), Node::string("stop"));
        // The literal terminates the walk; nothing lies beyond it
        let pattern = TriplePattern::new(n("a"), p(), n("c"));
        let resolver = TransitiveResolver::new();
        let rows = resolver
            .resolve(&graph, Transitivity::Plus, &pattern)
            .unwrap();
        assert!(rows.is_empty());

        // But the literal itself is reachable as an endpoint
        let to_literal = TriplePattern::new(n("a"), p(), Node::string("stop"));
        let rows = resolver
            .resolve(&graph, Transitivity::Plus, &to_literal)
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_path_exists_survives_cycles() {
        let mut graph = chain(&["a", "b", "c"]);
        graph.insert(n("c"), p(), n("a"));
        let resolver = TransitiveResolver::new();
        let missing = TriplePattern::new(n("a"), p(), n("z"));
        let rows = resolver
            .resolve(&graph, Transitivity::Plus, &missing)
            .unwrap();
        assert!(rows.is_empty());

        // A cycle makes a node reachable from itself even under `+`
        let reflexive = TriplePattern::new(n("a"), p(), n("a"));
        let rows = resolver
            .resolve(&graph, Transitivity::Plus, &reflexive)
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_predicate_path_shortest_first() {
        let mut graph = chain(&["a", "b", "c"]);
        graph.insert(n("a"), Predicate::new("shortcut"), n("c"));
        let pattern = TriplePattern::new(n("a"), PredTerm::Var, n("c"));
        let resolver = TransitiveResolver::new();
        let rows = resolver
            .resolve(&graph, Transitivity::Plus, &pattern)
            .unwrap();
        assert_eq!(rows.len(), 1);
        match &rows[0][0] {
            BindingValue::Path(path) => {
                assert_eq!(path, &vec![Predicate::new("shortcut")]);
            }
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn test_predicate_path_multi_hop() {
        let graph = chain(&["a", "b", "c", "d"]);
        let pattern = TriplePattern::new(n("a"), PredTerm::Var, n("d"));
        let resolver = TransitiveResolver::new();
        let rows = resolver
            .resolve(&graph, Transitivity::Star, &pattern)
            .unwrap();
        match &rows[0][0] {
            BindingValue::Path(path) => assert_eq!(path.len(), 3),
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn test_predicate_path_reflexive_star() {
        let graph = Graph::single();
        let pattern = TriplePattern::new(n("a"), PredTerm::Var, n("a"));
        let resolver = TransitiveResolver::new();
        let rows = resolver
            .resolve(&graph, Transitivity::Star, &pattern)
            .unwrap();
        assert_eq!(rows, vec![Binding::from_vec(vec![BindingValue::Path(Vec::new())])]);

        let rows = resolver
            .resolve(&graph, Transitivity::Plus, &pattern)
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_reach_from() {
        let graph = chain(&["a", "b", "c"]);
        let pattern = TriplePattern::new(n("a"), PredTerm::Var, NodeTerm::Var);
        let resolver = TransitiveResolver::new();

        let plus = resolver
            .resolve(&graph, Transitivity::Plus, &pattern)
            .unwrap();
        let nodes: Vec<Node> = plus
            .iter()
            .filter_map(|row| row[1].as_node().cloned())
            .collect();
        assert_eq!(plus.len(), 2);
        assert!(nodes.contains(&n("b")) && nodes.contains(&n("c")));
        for row in &plus {
            assert_eq!(row[0].as_predicate(), Some(&p()));
        }

        let star = resolver
            .resolve(&graph, Transitivity::Star, &pattern)
            .unwrap();
        assert_eq!(star.len(), 3);
        let nodes: Vec<Node> = star
            .iter()
            .filter_map(|row| row[1].as_node().cloned())
            .collect();
        assert!(nodes.contains(&n("a")));
    }

    #[test]
    fn test_reach_into() {
        let graph = chain(&["a", "b", "c"]);
        let pattern = TriplePattern::new(NodeTerm::Var, PredTerm::Var, n("c"));
        let resolver = TransitiveResolver::new();

        let plus = resolver
            .resolve(&graph, Transitivity::Plus, &pattern)
            .unwrap();
        let subjects: Vec<Node> = rows_as_nodes(&plus);
        assert_eq!(plus.len(), 2);
        assert!(subjects.contains(&n("a")) && subjects.contains(&n("b")));

        let star = resolver
            .resolve(&graph, Transitivity::Star, &pattern)
            .unwrap();
        assert_eq!(star.len(), 3);
        assert!(rows_as_nodes(&star).contains(&n("c")));
    }

    #[test]
    fn test_closure_objects_star_and_plus() {
        let graph = chain(&["a", "b", "c"]);
        let pattern = TriplePattern::new(n("a"), Predicate::new("p*"), NodeTerm::Var);
        let resolver = TransitiveResolver::new();

        let star = resolver
            .resolve(&graph, Transitivity::Star, &pattern)
            .unwrap();
        let mut objects = rows_as_nodes(&star);
        objects.sort_by_key(|node| node.to_string());
        assert_eq!(objects, vec![n("a"), n("b"), n("c")]);

        let plus = resolver
            .resolve(&graph, Transitivity::Plus, &pattern)
            .unwrap();
        let mut objects = rows_as_nodes(&plus);
        objects.sort_by_key(|node| node.to_string());
        assert_eq!(objects, vec![n("b"), n("c")]);
    }

    #[test]
    fn test_closure_uses_plain_predicate() {
        // Stored under "p"; queried as "p+"
        let graph = chain(&["a", "b", "c"]);
        let pattern = TriplePattern::new(NodeTerm::Var, Predicate::new("p+"), n("c"));
        let resolver = TransitiveResolver::new();
        let rows = resolver
            .resolve(&graph, Transitivity::Plus, &pattern)
            .unwrap();
        let mut subjects = rows_as_nodes(&rows);
        subjects.sort_by_key(|node| node.to_string());
        assert_eq!(subjects, vec![n("a"), n("b")]);
    }

    #[test]
    fn test_closure_pairs() {
        let graph = chain(&["a", "b", "c"]);
        let pattern = TriplePattern::new(NodeTerm::Var, p(), NodeTerm::Var);
        let resolver = TransitiveResolver::new();
        let plus = resolver
            .resolve(&graph, Transitivity::Plus, &pattern)
            .unwrap();
        // (a,b) (a,c) (b,c)
        assert_eq!(plus.len(), 3);
        for row in &plus {
            assert_eq!(row.len(), 2);
        }
    }

    #[test]
    fn test_unbound_closure_fails() {
        let graph = Graph::single();
        let pattern = TriplePattern::new(NodeTerm::Var, PredTerm::Var, NodeTerm::Var);
        let resolver = TransitiveResolver::new();
        let err = resolver
            .resolve(&graph, Transitivity::Star, &pattern)
            .unwrap_err();
        assert!(matches!(err, QueryError::UnboundClosure { .. }));
    }

    #[test]
    fn test_resolve_pattern_routes_on_tag() {
        let graph = chain(&["a", "b", "c"]);
        let resolver = TransitiveResolver::new();

        // Untagged: direct resolution sees only the single hop
        let direct = resolve_pattern(
            &resolver,
            &graph,
            &TriplePattern::new(n("a"), p(), NodeTerm::Var),
        )
        .unwrap();
        assert_eq!(direct.len(), 1);

        // Tagged: transitive resolution walks the chain
        let transitive = resolve_pattern(
            &resolver,
            &graph,
            &TriplePattern::new(n("a"), Predicate::new("p+"), NodeTerm::Var),
        )
        .unwrap();
        assert_eq!(transitive.len(), 2);

        // Metadata opt-in without an in-name tag defaults to star
        let starred = resolve_pattern(
            &resolver,
            &graph,
            &TriplePattern::new(n("a"), Predicate::with_trans("p", true), NodeTerm::Var),
        )
        .unwrap();
        assert_eq!(starred.len(), 3);
    }
}
