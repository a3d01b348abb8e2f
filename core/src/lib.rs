//! Core field model, composition, and validation for structured content
//! forms.
//!
//! This crate defines the building blocks a host content application uses
//! to describe data-entry forms as configuration trees:
//!
//! - [`Field`] — a named, typed unit of user-entered data with render,
//!   sanitize, and validate behavior.
//! - [`FieldKind`] — the closed set of fourteen leaf kinds and four
//!   container kinds (group, metabox, tabs, repeater).
//! - [`FieldTypeRegistry`] — the explicit type-tag → constructor table
//!   every field is built through.
//! - [`FieldRegistry`] — per-namespace flat registries produced by the
//!   recursive flatten walk over container trees.
//! - [`SchemaValidator`] — pure structural validation of raw
//!   configuration, run before any field is constructed.
//!
//! Persistence is deliberately absent here: rendering resolves values
//! through the [`render::ValueSource`] seam, and the companion storage
//! crate supplies the context adapter and save pipeline.
//!
//! # Example
//!
//! ```
//! use formfield_core::{ContextKind, FieldRegistry, FieldTypeRegistry, SchemaValidator};
//! use serde_json::json;
//!
//! let config = json!({
//!     "name": "pricing",
//!     "type": "group",
//!     "fields": [
//!         {"name": "price", "type": "number", "min": 0, "required": true},
//!         {"name": "currency", "type": "select", "options": ["USD", "EUR"]},
//!     ],
//! });
//! let config = config.as_object().unwrap();
//!
//! // Structural validation first, with precise diagnostics.
//! let report = SchemaValidator::new().validate_config(config);
//! assert!(report.valid, "{}", report.to_message());
//!
//! // Then construction and the flatten walk.
//! let types = FieldTypeRegistry::default();
//! let mut registry = FieldRegistry::new();
//! registry
//!     .add_field(&types, ContextKind::Record, "product", config)
//!     .unwrap();
//!
//! let price = registry.field(ContextKind::Record, "product", "price").unwrap();
//! assert!(registry.is_nested(ContextKind::Record, "product", "price"));
//! assert_eq!(price.sanitize(&json!("3.5")), json!(3.5));
//! assert!(!price.validate(&json!("abc")).valid);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod field;
pub mod kind;
pub mod registry;
pub mod render;
pub mod sanitize;
pub mod schema;
pub mod validate;
pub mod value;

pub use config::{ConfigMap, FieldConfig, SelectOption};
pub use context::{ContextKind, ContextToken};
pub use error::{ConfigError, Result};
pub use factory::{Constructor, FieldTypeRegistry};
pub use field::Field;
pub use kind::{
    DateSpec, FieldKind, MetaboxContext, MetaboxPriority, NumberSpec, Tab, TabOrientation,
    TextSpec, TYPE_TAGS,
};
pub use registry::FieldRegistry;
pub use render::{KeyStyle, ValueSource};
pub use schema::{SchemaReport, SchemaValidator};
pub use validate::ValidationResult;
