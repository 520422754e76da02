//! Error types for trellis-db-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
///
/// Read operations never fail on missing keys: absent entries produce empty
/// results. These errors cover malformed caller input and engine bugs.
#[derive(Error, Debug)]
pub enum Error {
    /// Pattern supplied in a form the engine cannot evaluate
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Index desync detected during an operation; indicates a bug
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl Error {
    /// Create an internal invariant error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::InternalInvariant(msg.into())
    }
}
