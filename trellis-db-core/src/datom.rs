//! Triples and datoms
//!
//! A [`Triple`] is a directed edge `(subject, predicate, object)`. A
//! [`Datom`] is the observation of a change to a triple: the triple plus the
//! transaction id that produced the change and whether it was asserted or
//! retracted. Datoms are what the transactor emits as the diff between a
//! graph and its successor.

use crate::node::Node;
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed edge in the graph
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject node
    pub s: Node,
    /// Predicate (edge label)
    pub p: Predicate,
    /// Object node
    pub o: Node,
}

impl Triple {
    /// Create a new triple
    pub fn new(s: Node, p: Predicate, o: Node) -> Self {
        Self { s, p, o }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {}]", self.s, self.p, self.o)
    }
}

/// An observed change to a triple
///
/// The components are:
/// - `s`, `p`, `o`: the triple the change concerns
/// - `t`: transaction id that produced the change
/// - `op`: operation, true = asserted, false = retracted
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Datom {
    /// Subject node
    pub s: Node,
    /// Predicate (edge label)
    pub p: Predicate,
    /// Object node
    pub o: Node,
    /// Transaction id
    pub t: u64,
    /// Operation: true = assert, false = retract
    pub op: bool,
}

impl Datom {
    /// Create a new datom
    pub fn new(s: Node, p: Predicate, o: Node, t: u64, op: bool) -> Self {
        Self { s, p, o, t, op }
    }

    /// The triple this datom concerns
    pub fn triple(&self) -> Triple {
        Triple::new(self.s.clone(), self.p.clone(), self.o.clone())
    }
}

impl fmt::Display for Datom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = if self.op { "+" } else { "-" };
        write!(f, "[{} {} {} t:{} {}]", self.s, self.p, self.o, self.t, op_str)
    }
}
