//! Result rows
//!
//! Resolving a pattern yields one [`Binding`] per match: the values of the
//! pattern's unbound positions, in s, p, o order. Bound positions are
//! dropped, so a fully ground pattern yields empty rows.

use crate::node::Node;
use crate::predicate::Predicate;
use smallvec::SmallVec;

/// A single value in a result row
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindingValue {
    /// A node (subject or object position)
    Node(Node),
    /// A predicate
    Predicate(Predicate),
    /// A predicate path, as returned by transitive path-finding between
    /// two bound nodes
    Path(Vec<Predicate>),
}

impl BindingValue {
    /// Get the node if this value is one
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            BindingValue::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Get the predicate if this value is one
    pub fn as_predicate(&self) -> Option<&Predicate> {
        match self {
            BindingValue::Predicate(p) => Some(p),
            _ => None,
        }
    }
}

/// A result row: the projection of a pattern's unbound positions
pub type Binding = SmallVec<[BindingValue; 3]>;
