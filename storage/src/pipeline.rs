//! The per-field save pipeline.
//!
//! Saving runs over a namespace's full flat field map, one field at a
//! time: read the submitted raw value, apply the field's pre-save
//! transform hook, sanitize, validate, then commit or record a labeled
//! error. No field's failure aborts its siblings — there is no
//! transactional behavior across fields.
//!
//! Absence is meaningful: a field missing from the submission deletes its
//! stored value rather than leaving it untouched. The one exception is a
//! single checkbox whose hidden companion marker was posted — that means
//! the form carried the box and the user left it unchecked, so `"0"` is
//! stored instead.

use std::collections::HashMap;
use std::fmt;

use formfield_core::{ContextKind, FieldKind, FieldRegistry, KeyStyle};
use serde_json::{Map, Value};
use tracing::debug;

use crate::adapter::{StorageAdapter, StorageContext};
use crate::store::MetaStore;

/// Key a save submission carries its anti-replay token under.
pub const NONCE_FIELD: &str = "_formfield_nonce";

/// Outcome of a pre-save transform hook.
pub enum Transformed {
    /// Continue the save with this (possibly replaced) value.
    Value(Value),
    /// Abort this field's save; counted as a skip, not an error.
    Skip,
}

type TransformFn = Box<dyn Fn(Value, &StorageContext) -> Transformed>;

/// Externally registered pre-save transform hooks, keyed by field name.
///
/// # Examples
///
/// ```
/// use formfield_storage::{StorageContext, TransformHooks, Transformed};
/// use serde_json::{Value, json};
///
/// let mut hooks = TransformHooks::new();
/// hooks.register("sku", |value, _ctx| {
///     match value.as_str() {
///         Some(s) => Transformed::Value(Value::String(s.to_uppercase())),
///         None => Transformed::Skip,
///     }
/// });
///
/// let ctx = StorageContext::Record(1);
/// match hooks.apply("sku", json!("abc"), &ctx) {
///     Transformed::Value(v) => assert_eq!(v, json!("ABC")),
///     Transformed::Skip => unreachable!(),
/// }
/// ```
#[derive(Default)]
pub struct TransformHooks {
    hooks: HashMap<String, TransformFn>,
}

impl fmt::Debug for TransformHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TransformHooks").field("fields", &names).finish()
    }
}

impl TransformHooks {
    /// An empty hook table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the hook for a field name.
    pub fn register(
        &mut self,
        field: impl Into<String>,
        hook: impl Fn(Value, &StorageContext) -> Transformed + 'static,
    ) {
        self.hooks.insert(field.into(), Box::new(hook));
    }

    /// Removes the hook for a field name.
    pub fn unregister(&mut self, field: &str) -> bool {
        self.hooks.remove(field).is_some()
    }

    /// Runs the hook for a field; fields without a hook pass through.
    pub fn apply(&self, field: &str, value: Value, ctx: &StorageContext) -> Transformed {
        match self.hooks.get(field) {
            Some(hook) => hook(value, ctx),
            None => Transformed::Value(value),
        }
    }
}

/// Host anti-replay verification, supplied per request.
pub trait NonceGuard {
    /// Whether the submitted token is acceptable.
    fn verify(&self, token: &str) -> bool;
}

/// A labeled validation failure for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Display label for user-facing reporting.
    pub label: String,
    /// Accumulated validation messages.
    pub messages: Vec<String>,
}

/// What a save pass did, field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Fields whose sanitized value was committed.
    pub saved: Vec<String>,
    /// Fields whose stored value was deleted because the submission
    /// omitted them.
    pub deleted: Vec<String>,
    /// Fields whose transform hook returned the skip sentinel.
    pub skipped: Vec<String>,
    /// Fields that failed validation; nothing was committed for them.
    pub errors: Vec<FieldError>,
}

impl SaveReport {
    /// Whether every processed field either saved, deleted, or skipped
    /// cleanly.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

fn is_single_checkbox(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Checkbox { options } if options.is_empty())
}

/// Name of the hidden companion input a single checkbox renders.
pub fn checkbox_marker(name: &str) -> String {
    format!("_{name}_submitted")
}

/// Runs the save pipeline for one namespace.
///
/// Processes every stored field in the namespace's flat map in
/// registration order; containers that store nothing are passed over.
/// Settings-page keys use the per-field derivation helper
/// ([`KeyStyle::FieldPreference`]).
pub fn save_fields<S: MetaStore>(
    registry: &FieldRegistry,
    kind: ContextKind,
    namespace: &str,
    ctx: &StorageContext,
    submitted: &Map<String, Value>,
    hooks: &TransformHooks,
    adapter: &mut StorageAdapter<S>,
) -> SaveReport {
    let mut report = SaveReport::default();

    for field in registry.fields(kind, namespace) {
        if !field.stores_value() {
            continue;
        }
        let name = field.name();

        let raw = match submitted.get(name) {
            Some(value) => value.clone(),
            None if is_single_checkbox(field.kind())
                && submitted.contains_key(&checkbox_marker(name)) =>
            {
                // The form carried the box; absence means unchecked.
                Value::String("0".to_string())
            }
            None => {
                if adapter.get(ctx, field, KeyStyle::FieldPreference).is_some() {
                    debug!(field = %name, "absent from submission, deleting stored value");
                    adapter.delete(ctx, field, KeyStyle::FieldPreference);
                    report.deleted.push(name.to_string());
                }
                continue;
            }
        };

        let value = match hooks.apply(name, raw, ctx) {
            Transformed::Value(value) => value,
            Transformed::Skip => {
                debug!(field = %name, "transform hook skipped save");
                report.skipped.push(name.to_string());
                continue;
            }
        };

        let clean = field.sanitize(&value);
        let result = field.validate(&clean);
        if result.valid {
            adapter.set(ctx, field, KeyStyle::FieldPreference, clean);
            report.saved.push(name.to_string());
        } else {
            report.errors.push(FieldError {
                field: name.to_string(),
                label: field.label().to_string(),
                messages: result.errors,
            });
        }
    }

    report
}
