//! Graph node values
//!
//! A [`Node`] is an addressable value in the graph: either a reference
//! (a named vertex or an internal blank node) or a literal (string, number,
//! boolean). Nodes are value types and are cloned freely; named and string
//! nodes use `Arc<str>` so clones are cheap.
//!
//! ## Equality and hashing
//!
//! Nodes are used as keys in all three indexes, so `Eq` and `Hash` must be
//! consistent. Doubles compare and hash by their bit pattern, which keeps
//! NaN values usable as keys (a NaN equals itself under bit comparison).
//! Numeric equality is not cross-type: `Long(3)` and `Double(3.0)` are
//! distinct keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A graph node: reference or literal
///
/// References ([`Node::Iri`] and [`Node::Internal`]) can act as vertices in
/// path traversal. Literals terminate paths; traversal never descends
/// through them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Node {
    /// Named node (IRI or keyword-style identifier)
    Iri(Arc<str>),
    /// Internal (blank) node id
    Internal(u64),
    /// String literal
    String(Arc<str>),
    /// Integer literal
    Long(i64),
    /// Floating-point literal
    Double(f64),
    /// Boolean literal
    Boolean(bool),
}

impl Node {
    /// Create a named node
    pub fn iri(name: impl AsRef<str>) -> Self {
        Node::Iri(Arc::from(name.as_ref()))
    }

    /// Create a string literal
    pub fn string(value: impl AsRef<str>) -> Self {
        Node::String(Arc::from(value.as_ref()))
    }

    /// Check if this node is a reference (named or internal node)
    ///
    /// Path traversal only follows edges into references; literals never
    /// act as intermediate path nodes.
    pub fn is_ref(&self) -> bool {
        matches!(self, Node::Iri(_) | Node::Internal(_))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Iri(a), Node::Iri(b)) => a == b,
            (Node::Internal(a), Node::Internal(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Long(a), Node::Long(b)) => a == b,
            // Bit equality keeps Eq reflexive for NaN values
            (Node::Double(a), Node::Double(b)) => a.to_bits() == b.to_bits(),
            (Node::Boolean(a), Node::Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Node::Iri(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Node::Internal(id) => {
                1u8.hash(state);
                id.hash(state);
            }
            Node::String(s) => {
                2u8.hash(state);
                s.hash(state);
            }
            Node::Long(v) => {
                3u8.hash(state);
                v.hash(state);
            }
            Node::Double(v) => {
                4u8.hash(state);
                v.to_bits().hash(state);
            }
            Node::Boolean(b) => {
                5u8.hash(state);
                b.hash(state);
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri(s) => write!(f, "{s}"),
            Node::Internal(id) => write!(f, "_:b{id}"),
            Node::String(s) => write!(f, "{s:?}"),
            Node::Long(v) => write!(f, "{v}"),
            Node::Double(v) => write!(f, "{v}"),
            Node::Boolean(b) => write!(f, "{b}"),
        }
    }
}
