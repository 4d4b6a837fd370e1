//! Error types for swimclub storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was missing.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The requested counter does not exist on the target entity
    /// (e.g. a comment counter on a comment).
    #[error("counter {field} not present on {entity}")]
    MissingCounter {
        /// The target entity kind.
        entity: &'static str,
        /// The requested counter field.
        field: &'static str,
    },
}
