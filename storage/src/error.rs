//! Error types for storage-layer operations.
//!
//! Covers registration-document loading and the save pipeline's
//! anti-replay check. Per-field validation failures are not errors — they
//! travel inside [`SaveReport`](crate::SaveReport).

use thiserror::Error;

/// Errors raised by document loading and the save pipeline.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A document path with an extension the loader does not understand.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// A save with a configured nonce guard but no submitted token.
    #[error("save request is missing its anti-replay token")]
    NonceMissing,

    /// The host rejected the submitted anti-replay token.
    #[error("anti-replay token verification failed")]
    NonceRejected,
}

/// Convenience alias for results with [`StorageError`].
pub type Result<T> = std::result::Result<T, StorageError>;
