//! Edge labels and transitivity tags
//!
//! A [`Predicate`] names an edge. The name may carry a trailing transitivity
//! marker: `*` for reflexive-transitive closure, `+` for transitive closure.
//! A `'` immediately before the marker escapes it, so `knows'*` is an
//! ordinary predicate whose name ends in `*`.
//!
//! Out-of-band metadata can override the in-name marker via the `trans`
//! field: `Some(true)` makes the predicate transitive even without a marker
//! (defaulting to `*` semantics), `Some(false)` suppresses any marker.
//!
//! Triples are always stored under the [plain](Predicate::plain) predicate;
//! the query layer strips the tag before consulting the indexes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Transitivity mode of a tagged predicate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transitivity {
    /// Reflexive-transitive closure (`*`): zero-length paths included
    Star,
    /// Transitive closure (`+`): paths of length one or more
    Plus,
}

/// An edge label, with optional out-of-band transitivity metadata
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    /// Predicate name; may end in a `*`/`+` transitivity marker
    pub name: Arc<str>,
    /// Transitivity override: `Some(true)` forces transitive resolution
    /// (default `*`), `Some(false)` suppresses an in-name marker
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trans: Option<bool>,
}

impl Predicate {
    /// Create a predicate with no metadata
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            trans: None,
        }
    }

    /// Create a predicate with an explicit transitivity override
    pub fn with_trans(name: impl AsRef<str>, trans: bool) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            trans: Some(trans),
        }
    }

    /// Get the name as a string slice
    pub fn name_str(&self) -> &str {
        &self.name
    }

    /// The transitivity marker carried by the name itself, if any
    ///
    /// Requires a name of at least two characters ending in `*` or `+`,
    /// with no `'` escape immediately before the marker.
    fn name_tag(&self) -> Option<Transitivity> {
        let bytes = self.name.as_bytes();
        let len = bytes.len();
        if len < 2 || bytes[len - 2] == b'\'' {
            return None;
        }
        match bytes[len - 1] {
            b'*' => Some(Transitivity::Star),
            b'+' => Some(Transitivity::Plus),
            _ => None,
        }
    }

    /// Effective transitivity of this predicate
    ///
    /// The `trans` metadata takes precedence: `Some(false)` suppresses any
    /// in-name marker, `Some(true)` keeps the in-name marker if present and
    /// otherwise defaults to [`Transitivity::Star`].
    pub fn transitivity(&self) -> Option<Transitivity> {
        match self.trans {
            Some(false) => None,
            Some(true) => Some(self.name_tag().unwrap_or(Transitivity::Star)),
            None => self.name_tag(),
        }
    }

    /// The predicate under which triples are stored
    ///
    /// Strips the trailing marker character when a transitivity tag is
    /// recognized and active. A suppressed marker (`trans == Some(false)`)
    /// is an ordinary character of the name and is kept. Metadata is
    /// cleared in the result.
    pub fn plain(&self) -> Predicate {
        let strip = self.name_tag().is_some() && self.trans != Some(false);
        let name = if strip {
            Arc::from(&self.name[..self.name.len() - 1])
        } else {
            self.name.clone()
        };
        Predicate { name, trans: None }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
