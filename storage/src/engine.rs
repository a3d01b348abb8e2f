//! The engine facade a host embeds.
//!
//! [`Engine`] owns the type registry, the per-namespace field registries,
//! and the pre-save transform hooks, and exposes the three operations a
//! host request performs: register configuration, render a namespace, and
//! save a submission. Registration is idempotent per request — every
//! namespace named in the document is rebuilt from scratch.

use formfield_core::{ContextKind, ContextToken, FieldRegistry, FieldTypeRegistry, SchemaReport,
    SchemaValidator};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::adapter::{StorageAdapter, StorageContext};
use crate::doc::RegistrationDoc;
use crate::error::{Result, StorageError};
use crate::pipeline::{NonceGuard, SaveReport, TransformHooks, save_fields, NONCE_FIELD};
use crate::store::MetaStore;

/// Field engine facade: registration, rendering, saving, reading.
///
/// # Examples
///
/// ```
/// use formfield_core::{ContextKind, ContextToken};
/// use formfield_storage::{Engine, MemoryStore, RegistrationDoc, StorageAdapter, StorageContext};
/// use serde_json::json;
///
/// let doc = RegistrationDoc::from_json_str(r#"{
///     "cpts": [{"id": "product", "fields": [
///         {"name": "sku", "type": "text", "required": true}
///     ]}]
/// }"#).unwrap();
///
/// let mut engine = Engine::new();
/// engine.register_document(&doc).unwrap();
///
/// let mut adapter = StorageAdapter::new(MemoryStore::new());
/// let ctx = StorageContext::Record(7);
/// let submitted = json!({"sku": "abc-1"});
/// let report = engine
///     .save(ContextKind::Record, "product", &ctx, submitted.as_object().unwrap(), &mut adapter, None)
///     .unwrap();
/// assert!(report.is_ok());
///
/// assert_eq!(engine.get_field("sku", &ctx, &adapter, json!(null)), json!("abc-1"));
///
/// let html = engine.render(ContextKind::Record, "product", &ContextToken::Record(7), &adapter);
/// assert!(html.contains("value=\"abc-1\""));
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    types: FieldTypeRegistry,
    registry: FieldRegistry,
    hooks: TransformHooks,
    validator: SchemaValidator,
}

impl Engine {
    /// An engine with the built-in field types and no registered
    /// configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// The type-tag → constructor table.
    pub fn types(&self) -> &FieldTypeRegistry {
        &self.types
    }

    /// Mutable access for hosts registering custom type tags.
    pub fn types_mut(&mut self) -> &mut FieldTypeRegistry {
        &mut self.types
    }

    /// The per-namespace field registries.
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Mutable access for registering pre-save transform hooks.
    pub fn hooks_mut(&mut self) -> &mut TransformHooks {
        &mut self.hooks
    }

    /// Registers everything a document describes.
    ///
    /// The document is schema-validated first; structural defects block
    /// registration entirely and come back as the accumulated report. A
    /// field that passes the schema but still fails construction is
    /// skipped with a warning — its siblings register normally.
    pub fn register_document(&mut self, doc: &RegistrationDoc) -> std::result::Result<(), SchemaReport> {
        let report = doc.validate(&self.validator);
        if !report.valid {
            return Err(report);
        }

        for (kind, entry) in doc.entries() {
            // Re-registration rebuilds the namespace from scratch.
            self.registry.clear_namespace(kind, &entry.id);
            debug!(%kind, namespace = %entry.id, fields = entry.fields.len(), "registering namespace");
            for field in &entry.fields {
                let Some(config) = field.as_object() else {
                    continue;
                };
                if let Err(err) = self.registry.add_field(&self.types, kind, &entry.id, config) {
                    warn!(%err, namespace = %entry.id, "skipping field that failed construction");
                }
            }
        }
        Ok(())
    }

    /// Renders a namespace's top-level fields in registration order.
    ///
    /// Nested fields render only through their owning container, never
    /// independently.
    pub fn render<S: MetaStore>(
        &self,
        kind: ContextKind,
        namespace: &str,
        ctx: &ContextToken,
        adapter: &StorageAdapter<S>,
    ) -> String {
        let mut out = String::new();
        for field in self.registry.top_level_fields(kind, namespace) {
            out.push_str(&field.render(ctx, adapter));
        }
        out
    }

    /// Runs the save pipeline for a submission against one namespace.
    ///
    /// When a nonce guard is supplied, the submission must carry its
    /// token under [`NONCE_FIELD`] and verification happens before any
    /// write.
    ///
    /// # Errors
    ///
    /// [`StorageError::NonceMissing`] or [`StorageError::NonceRejected`]
    /// when a guard is configured and the token is absent or bad; the
    /// whole save is aborted in that case.
    pub fn save<S: MetaStore>(
        &self,
        kind: ContextKind,
        namespace: &str,
        ctx: &StorageContext,
        submitted: &Map<String, Value>,
        adapter: &mut StorageAdapter<S>,
        guard: Option<&dyn NonceGuard>,
    ) -> Result<SaveReport> {
        if let Some(guard) = guard {
            let token = submitted
                .get(NONCE_FIELD)
                .and_then(Value::as_str)
                .ok_or(StorageError::NonceMissing)?;
            if !guard.verify(token) {
                return Err(StorageError::NonceRejected);
            }
        }
        Ok(save_fields(
            &self.registry,
            kind,
            namespace,
            ctx,
            submitted,
            &self.hooks,
            adapter,
        ))
    }

    /// The host read API: stored value if present and non-empty, else
    /// `default`.
    pub fn get_field<S: MetaStore>(
        &self,
        name: &str,
        ctx: &StorageContext,
        adapter: &StorageAdapter<S>,
        default: Value,
    ) -> Value {
        adapter.get_field(name, ctx, default)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn doc(input: serde_json::Value) -> RegistrationDoc {
        serde_json::from_value(input).expect("valid document shape")
    }

    #[test]
    fn test_schema_errors_block_registration_entirely() {
        let mut engine = Engine::new();
        let result = engine.register_document(&doc(json!({
            "cpts": [{"id": "product", "fields": [
                {"name": "ok", "type": "text"},
                {"name": "bad", "type": "select"},
            ]}]
        })));

        let report = result.unwrap_err();
        assert!(report.errors.iter().any(|e| e.contains("options")));
        // Nothing registered, not even the valid sibling.
        assert!(
            engine
                .registry()
                .fields(ContextKind::Record, "product")
                .is_empty()
        );
    }

    #[test]
    fn test_reregistration_rebuilds_namespace() {
        let mut engine = Engine::new();
        engine
            .register_document(&doc(json!({
                "cpts": [{"id": "product", "fields": [{"name": "old", "type": "text"}]}]
            })))
            .unwrap();
        engine
            .register_document(&doc(json!({
                "cpts": [{"id": "product", "fields": [{"name": "new", "type": "text"}]}]
            })))
            .unwrap();

        assert!(engine.registry().field(ContextKind::Record, "product", "old").is_none());
        assert!(engine.registry().field(ContextKind::Record, "product", "new").is_some());
    }

    #[test]
    fn test_nonce_guard_runs_before_any_write() {
        struct RejectAll;
        impl NonceGuard for RejectAll {
            fn verify(&self, _: &str) -> bool {
                false
            }
        }

        let mut engine = Engine::new();
        engine
            .register_document(&doc(json!({
                "cpts": [{"id": "product", "fields": [{"name": "sku", "type": "text"}]}]
            })))
            .unwrap();

        let mut adapter = StorageAdapter::new(MemoryStore::new());
        let ctx = StorageContext::Record(7);

        let missing = engine.save(
            ContextKind::Record,
            "product",
            &ctx,
            json!({"sku": "a"}).as_object().unwrap(),
            &mut adapter,
            Some(&RejectAll),
        );
        assert!(matches!(missing, Err(StorageError::NonceMissing)));

        let rejected = engine.save(
            ContextKind::Record,
            "product",
            &ctx,
            json!({"sku": "a", "_formfield_nonce": "tok"})
                .as_object()
                .unwrap(),
            &mut adapter,
            Some(&RejectAll),
        );
        assert!(matches!(rejected, Err(StorageError::NonceRejected)));
        assert_eq!(adapter.store().get_record_meta(7, "sku"), None);
    }

    #[test]
    fn test_taxonomy_fields_save_to_term_meta() {
        let mut engine = Engine::new();
        engine
            .register_document(&doc(json!({
                "taxonomies": [{"id": "brand", "object_type": "product", "fields": [
                    {"name": "accent", "type": "color", "default": "#000000"},
                ]}]
            })))
            .unwrap();

        let mut adapter = StorageAdapter::new(MemoryStore::new());
        let ctx = StorageContext::Term(3);
        let report = engine
            .save(
                ContextKind::Term,
                "brand",
                &ctx,
                json!({"accent": "ff8800"}).as_object().unwrap(),
                &mut adapter,
                None,
            )
            .unwrap();

        assert!(report.is_ok());
        assert_eq!(
            adapter.store().get_term_meta(3, "accent"),
            Some(json!("#ff8800"))
        );
    }
}
