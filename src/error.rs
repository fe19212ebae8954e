//! Error types for tributary.
//!
//! This module provides a unified error type [`TributaryError`] for all lineage
//! extraction operations, along with a convenient [`Result`] type alias.
//!
//! Most extraction-time failures are *recoverable-local*: an identifier that
//! cannot be resolved, a catalog entry that is gone, an optional field that is
//! absent. Those are handled by skipping the affected dataset or facet, never
//! by aborting the event being built. The [`TributaryError::is_recoverable`]
//! predicate tells the two classes apart.
//!
//! # Example
//!
//! ```rust
//! use tributary::error::{Result, TributaryError};
//!
//! fn check_location(raw: &str) -> Result<()> {
//!     if raw.is_empty() {
//!         return Err(TributaryError::UnresolvableLocation(
//!             "empty location descriptor".into(),
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! let err = check_location("").unwrap_err();
//! assert!(err.is_recoverable());
//! ```

use std::io;
use thiserror::Error;

/// Main error type for tributary operations.
#[derive(Error, Debug)]
pub enum TributaryError {
    // Identifier resolution errors
    #[error("Unresolvable location: {0}")]
    UnresolvableLocation(String),

    // Catalog errors
    #[error("Catalog lookup failed for {table}: {reason}")]
    CatalogLookup { table: String, reason: String },

    #[error("No catalog available to resolve table: {0}")]
    CatalogUnavailable(String),

    // Facet construction errors
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    // Lifecycle errors
    #[error("Lifecycle violation: {0}")]
    LifecycleViolation(String),

    // Emission errors
    #[error("Event channel full, dropping event for run {0}")]
    ChannelFull(uuid::Uuid),

    #[error("Event channel closed")]
    ChannelClosed,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // External errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl TributaryError {
    /// Check if the error is local to a single dataset or facet, meaning
    /// extraction can continue over the remaining nodes.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TributaryError::UnresolvableLocation(_)
                | TributaryError::CatalogLookup { .. }
                | TributaryError::CatalogUnavailable(_)
                | TributaryError::MalformedSchema(_)
                | TributaryError::ChannelFull(_)
        )
    }
}

impl From<serde_json::Error> for TributaryError {
    fn from(e: serde_json::Error) -> Self {
        TributaryError::Serialization(e.to_string())
    }
}

/// Result type alias for tributary operations.
pub type Result<T> = std::result::Result<T, TributaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(TributaryError::UnresolvableLocation("x".into()).is_recoverable());
        assert!(TributaryError::CatalogUnavailable("db.t".into()).is_recoverable());
        assert!(TributaryError::MalformedSchema("no fields".into()).is_recoverable());
        assert!(
            !TributaryError::LifecycleViolation("checkpoint before submit".into())
                .is_recoverable()
        );
        assert!(!TributaryError::Config("bad".into()).is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = TributaryError::CatalogLookup {
            table: "db.orders".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "Catalog lookup failed for db.orders: connection refused"
        );
    }
}
