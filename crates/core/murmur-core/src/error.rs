//! Error types for Murmur

use thiserror::Error;

/// Main error type for Murmur operations
#[derive(Debug, Error)]
pub enum MurmurError {
    /// Missing or invalid required setting, raised before any I/O
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid filter field supplied by the caller
    #[error("Validation error in '{field}': {message}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// What was wrong with it
        message: String,
    },

    /// Embedding endpoint returned a non-success status or a malformed payload
    #[error("Embedding provider error{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    EmbeddingProvider {
        /// HTTP status code, when the failure came from a response
        status: Option<u16>,
        /// Response body or parse failure description
        message: String,
    },

    /// Placeholder count in a template does not match the bound parameters.
    ///
    /// Always a builder/executor contract violation, never user-triggered.
    #[error(
        "Binding arity mismatch: template has {placeholders} placeholders but {parameters} parameters were supplied"
    )]
    BindingArity {
        /// Placeholders found in the template
        placeholders: usize,
        /// Parameters supplied, embedding included
        parameters: usize,
    },

    /// Store rejected or failed the query
    #[error("Query execution error: {0}")]
    QueryExecution(#[from] sqlx::Error),

    /// Embedding length differs from the store's vector dimension
    #[error("Embedding dimension mismatch: got {dimension}, expected {expected}")]
    DimensionMismatch {
        /// Actual embedding dimension
        dimension: usize,
        /// Dimension declared by the store
        expected: usize,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type using MurmurError
pub type Result<T> = std::result::Result<T, MurmurError>;

impl MurmurError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        MurmurError::Config(msg.into())
    }

    /// Create a validation error for a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MurmurError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an embedding provider error that came from an HTTP response
    pub fn embedding_status(status: u16, body: impl Into<String>) -> Self {
        MurmurError::EmbeddingProvider {
            status: Some(status),
            message: body.into(),
        }
    }

    /// Create an embedding provider error without a status (transport or payload)
    pub fn embedding(msg: impl Into<String>) -> Self {
        MurmurError::EmbeddingProvider {
            status: None,
            message: msg.into(),
        }
    }

    /// Create a binding arity error
    pub fn binding_arity(placeholders: usize, parameters: usize) -> Self {
        MurmurError::BindingArity {
            placeholders,
            parameters,
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(dimension: usize, expected: usize) -> Self {
        MurmurError::DimensionMismatch {
            dimension,
            expected,
        }
    }

    /// Whether this error should be reported as caller input problem
    pub fn is_validation(&self) -> bool {
        matches!(self, MurmurError::Validation { .. })
    }
}
