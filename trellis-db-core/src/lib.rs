//! # Trellis DB Core
//!
//! In-memory graph-index engine: the value model and the three coordinated
//! triple indexes behind every Trellis DB graph.
//!
//! This crate provides:
//! - Core types: [`Node`], [`Predicate`], [`Triple`], [`Datom`]
//! - [`Graph`]: immutable snapshots over SPO, POS, and OSP indexes, in a
//!   single-valued and an occurrence-counted multigraph variant
//! - Pattern resolution and counting for all eight bound/unbound shapes
//! - Graph diffing for change tracking between generations
//!
//! ## Design Principles
//!
//! 1. **Immutable snapshots**: published graphs never mutate; writes
//!    produce successor values plus a change flag
//! 2. **Synchronous and CPU-bound**: no I/O, no blocking; graphs are
//!    freely shareable across threads
//! 3. **Empty, not missing**: reads over absent keys return empty results,
//!    never errors
//!
//! Transitive resolution lives in `trellis-db-query`; the transactor in
//! `trellis-db-transact`.

pub mod binding;
pub mod datom;
pub mod error;
pub mod graph;
mod index;
pub mod node;
pub mod pattern;
pub mod predicate;

// Re-export main types
pub use binding::{Binding, BindingValue};
pub use datom::{Datom, Triple};
pub use error::{Error, Result};
pub use graph::{Graph, GraphKind, ObjectSubjects};
pub use node::Node;
pub use pattern::{NodeTerm, PatternShape, PredTerm, TriplePattern};
pub use predicate::{Predicate, Transitivity};
