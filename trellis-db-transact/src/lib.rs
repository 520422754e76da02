//! # Trellis DB Transact
//!
//! Atomic batch application of assertions and retractions to a graph
//! snapshot.
//!
//! [`transact`] folds a batch into a graph and returns the successor
//! snapshot together with the datoms actually produced: retractions of
//! absent triples and duplicate assertions (in the single-valued variant)
//! change nothing and emit nothing. In the multigraph variant every
//! assertion increments an occurrence count, so every assertion emits.
//!
//! ## Ordering
//!
//! Within one call, retractions apply before assertions, each in input
//! order; the emitted datom lists preserve that order. Nothing is promised
//! across calls - callers advancing one graph lineage must serialize their
//! transactions.

use tracing::{debug, debug_span};
use trellis_db_core::{Datom, Graph, Triple};

/// Outcome of a transaction: the successor graph and its datom delta
#[derive(Clone, Debug, PartialEq)]
pub struct TransactResult {
    /// The successor graph snapshot
    pub graph: Graph,
    /// Datoms for assertions that changed the graph, in input order
    pub asserted: Vec<Datom>,
    /// Datoms for retractions that changed the graph, in input order
    pub retracted: Vec<Datom>,
}

impl TransactResult {
    /// Check if the transaction changed nothing
    pub fn is_noop(&self) -> bool {
        self.asserted.is_empty() && self.retracted.is_empty()
    }
}

/// Apply a batch of retractions and assertions to a graph snapshot
///
/// Retractions fold first, then assertions, each in input order. A datom
/// is emitted for an entry exactly when applying it changed the graph, so
/// replaying the emitted datoms against the input graph reproduces the
/// returned one.
///
/// The input snapshot is untouched; the result holds a successor value.
pub fn transact(
    graph: &Graph,
    assertions: &[Triple],
    retractions: &[Triple],
    t: u64,
) -> TransactResult {
    let span = debug_span!(
        "transact",
        t,
        assertions = assertions.len(),
        retractions = retractions.len()
    );
    let _enter = span.enter();

    let mut next = graph.clone();

    let mut retracted = Vec::new();
    for triple in retractions {
        if next.remove(&triple.s, &triple.p, &triple.o) {
            retracted.push(Datom::new(
                triple.s.clone(),
                triple.p.clone(),
                triple.o.clone(),
                t,
                false,
            ));
        }
    }

    let mut asserted = Vec::new();
    for triple in assertions {
        if next.insert(triple.s.clone(), triple.p.clone(), triple.o.clone()) {
            asserted.push(Datom::new(
                triple.s.clone(),
                triple.p.clone(),
                triple.o.clone(),
                t,
                true,
            ));
        }
    }

    debug!(
        asserted = asserted.len(),
        retracted = retracted.len(),
        "transaction applied"
    );

    TransactResult {
        graph: next,
        asserted,
        retracted,
    }
}
