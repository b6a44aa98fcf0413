//! Error types for the restaurant admin crate.
//!
//! Two families live here. [`AdminError`] covers infrastructure failures
//! (configuration, the hosted index client, local persistence) and is what
//! fallible constructors and the event handler return. [`SyncFailure`] is the
//! user-facing taxonomy the coordinators convert every remote or pre-flight
//! failure into; each one ends up as a dismissible notice and none of them
//! clears the table.

use crate::domain::restaurant::Field;
use thiserror::Error;

/// The main error type for infrastructure operations.
///
/// # Examples
///
/// ```
/// use restaurant_admin::AdminError;
///
/// fn check_index_name(name: &str) -> Result<(), AdminError> {
///     if name.is_empty() {
///         return Err(AdminError::Config("index_name must not be empty".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(check_index_name("").is_err());
/// ```
#[derive(Debug, Error)]
pub enum AdminError {
    /// The search index rejected or failed an operation.
    ///
    /// The string carries the index's own description of the failure.
    #[error("Index error: {0}")]
    Index(String),

    /// Transport-level failure talking to the hosted index.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local snapshot storage is unusable.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A page size outside the configured options was requested.
    #[error("page size {requested} is not one of {allowed:?}")]
    InvalidPageSize {
        /// The rejected value.
        requested: usize,
        /// The sizes the table offers.
        allowed: Vec<usize>,
    },
}

/// A specialized `Result` type for infrastructure operations.
pub type Result<T> = std::result::Result<T, AdminError>;

/// The mutation a [`SyncFailure::MutationFailed`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Delete,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => f.write_str("adding restaurant"),
            Self::Delete => f.write_str("deleting restaurant"),
        }
    }
}

/// Failures surfaced to the user by the query and mutation coordinators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncFailure {
    /// Pre-flight validation failed; lists every missing required field.
    #[error("Please fill in all required fields: {}", join_fields(.missing))]
    ValidationFailed {
        missing: Vec<Field>,
    },

    /// A search against the index failed. Stale results stay on screen.
    #[error("Error loading restaurants: {cause}")]
    QueryFailed {
        cause: String,
    },

    /// A create or delete failed. Local state keeps its pre-mutation truth.
    #[error("Error {operation}. Please try again. ({cause})")]
    MutationFailed {
        operation: MutationKind,
        cause: String,
    },

    /// `confirm_delete` was called with nothing awaiting confirmation.
    #[error("There is no deletion awaiting confirmation")]
    NoPendingMutation,
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_field() {
        let failure = SyncFailure::ValidationFailed {
            missing: vec![Field::Name, Field::PhoneNumber],
        };

        assert_eq!(
            failure.to_string(),
            "Please fill in all required fields: name, phone number"
        );
    }

    #[test]
    fn mutation_message_names_the_operation() {
        let failure = SyncFailure::MutationFailed {
            operation: MutationKind::Delete,
            cause: "503".to_string(),
        };

        assert!(failure.to_string().starts_with("Error deleting restaurant."));
    }
}
