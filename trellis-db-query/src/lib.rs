//! # Trellis DB Query
//!
//! Transitive resolution over Trellis DB graphs.
//!
//! This crate provides:
//! - [`TransitiveResolver`]: the eight pattern shapes under `*`
//!   (reflexive-transitive) and `+` (transitive) semantics
//! - [`resolve_pattern`]: the routing entry that sends tagged predicates
//!   through the resolver and everything else to direct resolution
//! - [`ClosureCache`]: a small bounded memo for predicate closures
//!
//! ## Quick Start
//!
//! Build a graph in `trellis-db-core`, create a [`TransitiveResolver`], and
//! call [`resolve_pattern`] with patterns whose predicates may carry `*` or
//! `+` tags.

pub mod closure;
pub mod error;
pub mod transitive;

// Re-exports
pub use closure::{transitive_closure, ClosureCache, DEFAULT_MEMO_CAPACITY};
pub use error::{QueryError, Result};
pub use transitive::{resolve_pattern, TransitiveResolver};
pub use trellis_db_core::ObjectSubjects;
