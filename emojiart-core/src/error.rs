//! Error types for editor operations.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
///
/// Mutations that target an item which no longer exists are not errors;
/// they are silent no-ops reported through their return value.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted document parsed as JSON but violates the document format.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// No document with the given name exists in the library.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Palette index out of range.
    #[error("Palette not found at index {0}")]
    PaletteNotFound(usize),

    /// Invalid operation requested.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Filesystem error during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
