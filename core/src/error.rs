//! Error types for field construction.
//!
//! Configuration defects that make a field impossible to construct are
//! reported as [`ConfigError`] and fail that field fast. Per-submission
//! validation problems are never errors — they travel as data in
//! [`ValidationResult`](crate::ValidationResult).

use thiserror::Error;

/// Errors raised while constructing a field from raw configuration.
///
/// These indicate a programming mistake in the configuration tree. Callers
/// are expected to catch them and skip the offending field; sibling fields
/// are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration node has no `name` key (or it is not a string).
    #[error("field configuration is missing a name")]
    MissingName,

    /// The configuration node has no `type` key (or it is not a string).
    #[error("field configuration is missing a type")]
    MissingType,

    /// The `type` tag is not present in the type registry.
    #[error("unknown field type: {0}")]
    UnknownType(String),

    /// A structurally invalid value inside an otherwise well-formed node.
    #[error("invalid configuration for field {field}: {message}")]
    InvalidConfig {
        /// Name of the field the defect belongs to.
        field: String,
        /// Human-readable description of the defect.
        message: String,
    },
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
