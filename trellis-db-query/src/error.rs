//! Error types for transitive resolution

use thiserror::Error;
use trellis_db_core::TriplePattern;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, QueryError>;

/// Transitive resolution errors
#[derive(Error, Debug)]
pub enum QueryError {
    /// Error from trellis-db-core
    #[error("Core error: {0}")]
    Core(#[from] trellis_db_core::Error),

    /// Transitive resolve called with all three positions unbound
    ///
    /// Closing over every predicate at once is unbounded and not supported;
    /// at least one position must be ground.
    #[error("Unbound closure: transitive resolve requires a bound position, got {pattern}")]
    UnboundClosure {
        /// The offending pattern
        pattern: TriplePattern,
    },
}
