//! Error types for the async runtime.

use emojiart_core::CoreError;
use thiserror::Error;

/// Result type for background image fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Why a background image could not be produced.
///
/// These never escape the fetch boundary: the editor records them as a
/// failed fetch status.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP layer failed (connection, TLS, body read).
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("image request returned status {0}")]
    Status(u16),

    /// The response or inline payload was empty.
    #[error("image payload is empty")]
    Empty,

    /// The bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The decoding task was cancelled or panicked.
    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors surfaced by the editor runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Document or persistence error from the core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The autosave task has stopped.
    #[error("autosave task is no longer running")]
    AutosaveStopped,
}
