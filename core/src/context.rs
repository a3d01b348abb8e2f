//! Persistence context kinds and render-time context tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three persistence scopes a namespace of fields can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// Data attached to a single content record.
    Record,
    /// Data attached to a single taxonomy term.
    Term,
    /// Named configuration values on a settings page.
    Settings,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContextKind::Record => "record",
            ContextKind::Term => "term",
            ContextKind::Settings => "settings",
        };
        f.write_str(s)
    }
}

/// Context threaded through rendering so descendants know where their
/// value lives.
///
/// Terms are a storage-layer concern only and never appear during
/// rendering, so this token has two arms.
///
/// # Examples
///
/// ```
/// use formfield_core::ContextToken;
///
/// let ctx = ContextToken::Record(42);
/// assert_eq!(ctx.kind(), formfield_core::ContextKind::Record);
///
/// let ctx = ContextToken::Settings("shop_options".into());
/// assert_eq!(ctx.kind(), formfield_core::ContextKind::Settings);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextToken {
    /// Editing a content record with this id.
    Record(i64),
    /// Editing a settings page with this id.
    Settings(String),
}

impl ContextToken {
    /// The persistence scope this token resolves into.
    pub fn kind(&self) -> ContextKind {
        match self {
            ContextToken::Record(_) => ContextKind::Record,
            ContextToken::Settings(_) => ContextKind::Settings,
        }
    }
}
