//! Error taxonomy for catalog resources.
//!
//! Identity failures are fatal to node construction. Data-store failures are
//! surfaced from `resolve` wrapped in [`ResolveError::Io`]. Missing
//! capabilities are not errors at all; they come back as `Ok(None)`.

use thiserror::Error;

/// Errors from deriving a resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("resource name must not be empty")]
    EmptyName,

    #[error("resource name '{0}' must not contain '#'")]
    InvalidName(String),

    #[error("service identifier '{0}' must not contain a '#'")]
    FragmentInParent(String),

    #[error("identifier '{identifier}' is not a valid url: {reason}")]
    Malformed { identifier: String, reason: String },
}

/// Failures reported by the backing data store collaborator.
#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("schema unavailable for '{table}': {reason}")]
    Schema { table: String, reason: String },

    #[error("operation cancelled")]
    Cancelled,
}

/// Errors surfaced by capability resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("backing store error")]
    Io(#[source] DataStoreError),

    #[error("resource '{0}' is detached from its service")]
    Detached(String),

    #[error("adapter '{name}' failed: {reason}")]
    Adapter { name: String, reason: String },
}

impl From<DataStoreError> for ResolveError {
    fn from(err: DataStoreError) -> Self {
        ResolveError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn invalid_name_display_names_the_offender() {
        let err = IdentityError::InvalidName("bad#name".to_string());
        assert_eq!(err.to_string(), "resource name 'bad#name' must not contain '#'");
    }

    #[test]
    fn io_error_keeps_underlying_cause() {
        let err = ResolveError::from(DataStoreError::Connection("refused".into()));
        assert!(matches!(err, ResolveError::Io(DataStoreError::Connection(_))));
        let source = err.source().expect("io errors carry a source");
        assert_eq!(source.to_string(), "connection failed: refused");
    }
}
