//! Storage context resolution, the save pipeline, and registration
//! documents for the formfield engine.
//!
//! This crate is everything persistence-facing:
//!
//! - [`MetaStore`] — the host collaborator interface over the three
//!   persistence scopes (record meta, term meta, named options), with
//!   [`MemoryStore`] for tests and previews.
//! - [`StorageAdapter`] — key derivation per context kind, the
//!   [`get_field`](StorageAdapter::get_field) read API, and the value
//!   resolver the render layer uses.
//! - [`save_fields`] / [`TransformHooks`] — the per-field
//!   transform → sanitize → validate → commit pipeline.
//! - [`RegistrationDoc`] — the JSON/YAML document hosts register
//!   everything through, and [`Engine`], the facade tying it all
//!   together.
//!
//! # Quick start
//!
//! ```
//! use formfield_core::ContextKind;
//! use formfield_storage::{Engine, MemoryStore, RegistrationDoc, StorageAdapter, StorageContext};
//! use serde_json::json;
//!
//! let doc = RegistrationDoc::from_json_str(r#"{
//!     "settings_pages": [{"id": "shop", "fields": [
//!         {"name": "currency", "type": "select", "options": ["USD", "EUR"], "default": "USD"}
//!     ]}]
//! }"#).unwrap();
//!
//! let mut engine = Engine::new();
//! engine.register_document(&doc).unwrap();
//!
//! // Never submitted: the read API falls back to the supplied default.
//! let adapter = StorageAdapter::new(MemoryStore::new());
//! let ctx = StorageContext::Settings("shop".into());
//! assert_eq!(engine.get_field("currency", &ctx, &adapter, json!("USD")), json!("USD"));
//! ```

mod adapter;
mod doc;
mod engine;
mod error;
mod pipeline;
mod store;

pub use adapter::{StorageAdapter, StorageContext, settings_field_key, settings_key};
pub use doc::{RegistrationDoc, RegistrationEntry};
pub use engine::Engine;
pub use error::{Result, StorageError};
pub use pipeline::{
    FieldError, NONCE_FIELD, NonceGuard, SaveReport, TransformHooks, Transformed, checkbox_marker,
    save_fields,
};
pub use store::{MemoryStore, MetaStore};
