//! Query patterns
//!
//! A [`TriplePattern`] is a triple where each position is either a ground
//! value or an unbound variable. The eight possible combinations of
//! bound/unbound positions form the closed [`PatternShape`] enum, which
//! resolution, counting, and transitive resolution all dispatch on.

use crate::node::Node;
use crate::predicate::Predicate;
use std::fmt;

/// A subject or object position: variable or ground node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeTerm {
    /// Unbound variable
    Var,
    /// Ground node
    Node(Node),
}

impl NodeTerm {
    /// Check if this term is a variable
    pub fn is_var(&self) -> bool {
        matches!(self, NodeTerm::Var)
    }

    /// Check if this term is bound (not a variable)
    pub fn is_bound(&self) -> bool {
        !self.is_var()
    }

    /// Get the node if this term is bound
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            NodeTerm::Node(n) => Some(n),
            NodeTerm::Var => None,
        }
    }
}

impl From<Node> for NodeTerm {
    fn from(node: Node) -> Self {
        NodeTerm::Node(node)
    }
}

/// A predicate position: variable or ground predicate
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PredTerm {
    /// Unbound variable
    Var,
    /// Ground predicate
    Predicate(Predicate),
}

impl PredTerm {
    /// Check if this term is a variable
    pub fn is_var(&self) -> bool {
        matches!(self, PredTerm::Var)
    }

    /// Check if this term is bound (not a variable)
    pub fn is_bound(&self) -> bool {
        !self.is_var()
    }

    /// Get the predicate if this term is bound
    pub fn as_predicate(&self) -> Option<&Predicate> {
        match self {
            PredTerm::Predicate(p) => Some(p),
            PredTerm::Var => None,
        }
    }
}

impl From<Predicate> for PredTerm {
    fn from(predicate: Predicate) -> Self {
        PredTerm::Predicate(predicate)
    }
}

/// The eight bound/unbound combinations of a triple pattern
///
/// Named by the positions that are bound: `Sp` is subject and predicate
/// bound with the object variable, `All` is the full scan with nothing
/// bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternShape {
    /// (v,v,v) - existence check
    Spo,
    /// (v,v,?) - objects of a subject/predicate pair
    Sp,
    /// (v,?,v) - predicates linking two nodes
    So,
    /// (v,?,?) - all edges out of a subject
    S,
    /// (?,v,v) - subjects of a predicate/object pair
    Po,
    /// (?,v,?) - all edges with a predicate
    P,
    /// (?,?,v) - all edges into an object
    O,
    /// (?,?,?) - full scan
    All,
}

/// A triple pattern for matching against the graph
///
/// Result rows project only the unbound positions, in s, p, o order, so a
/// row's arity equals the number of variables in the pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriplePattern {
    /// Subject term
    pub s: NodeTerm,
    /// Predicate term
    pub p: PredTerm,
    /// Object term
    pub o: NodeTerm,
}

impl TriplePattern {
    /// Create a new triple pattern
    pub fn new(s: impl Into<NodeTerm>, p: impl Into<PredTerm>, o: impl Into<NodeTerm>) -> Self {
        Self {
            s: s.into(),
            p: p.into(),
            o: o.into(),
        }
    }

    /// Check if subject is bound (not a variable)
    pub fn s_bound(&self) -> bool {
        self.s.is_bound()
    }

    /// Check if predicate is bound (not a variable)
    pub fn p_bound(&self) -> bool {
        self.p.is_bound()
    }

    /// Check if object is bound (not a variable)
    pub fn o_bound(&self) -> bool {
        self.o.is_bound()
    }

    /// Number of variable positions, which is also the arity of result rows
    pub fn arity(&self) -> usize {
        [self.s.is_var(), self.p.is_var(), self.o.is_var()]
            .iter()
            .filter(|v| **v)
            .count()
    }

    /// The shape this pattern dispatches on
    pub fn shape(&self) -> PatternShape {
        match (self.s.is_bound(), self.p.is_bound(), self.o.is_bound()) {
            (true, true, true) => PatternShape::Spo,
            (true, true, false) => PatternShape::Sp,
            (true, false, true) => PatternShape::So,
            (true, false, false) => PatternShape::S,
            (false, true, true) => PatternShape::Po,
            (false, true, false) => PatternShape::P,
            (false, false, true) => PatternShape::O,
            (false, false, false) => PatternShape::All,
        }
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        match &self.s {
            NodeTerm::Var => write!(f, "?s")?,
            NodeTerm::Node(n) => write!(f, "{n}")?,
        }
        match &self.p {
            PredTerm::Var => write!(f, " ?p")?,
            PredTerm::Predicate(p) => write!(f, " {p}")?,
        }
        match &self.o {
            NodeTerm::Var => write!(f, " ?o")?,
            NodeTerm::Node(n) => write!(f, " {n}")?,
        }
        write!(f, "]")
    }
}
