//! Storage context resolution and key derivation.
//!
//! The adapter reconciles three persistence scopes under one naming
//! scheme. For records and terms the field name is the storage key
//! verbatim. For settings pages there are two derivations, both kept
//! deliberately:
//!
//! - [`settings_key`] — the raw `page_id + "_" + field_name`
//!   concatenation used by metabox- and tabs-owned fields and by the
//!   [`get_field`](StorageAdapter::get_field) read API;
//! - [`settings_field_key`] — the per-field helper, used by group-owned
//!   fields and the save pipeline, which honors a field-level
//!   `use_name_prefix: false` by using the bare field name.
//!
//! The two only partially agree; the divergence is observed behavior and
//! is pinned by tests rather than reconciled.

use formfield_core::value::is_empty_value;
use formfield_core::{ContextKind, ContextToken, Field, KeyStyle, ValueSource};
use serde_json::Value;

use crate::store::MetaStore;

/// Identifies one concrete persistence location scope.
///
/// Unlike the render-time [`ContextToken`], this has a taxonomy-term arm:
/// terms exist only at the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageContext {
    /// Attached data of the content record with this id.
    Record(i64),
    /// Attached data of the taxonomy term with this id.
    Term(i64),
    /// Named configuration values of the settings page with this id.
    Settings(String),
}

impl StorageContext {
    /// The persistence scope of this context.
    pub fn kind(&self) -> ContextKind {
        match self {
            StorageContext::Record(_) => ContextKind::Record,
            StorageContext::Term(_) => ContextKind::Term,
            StorageContext::Settings(_) => ContextKind::Settings,
        }
    }
}

impl From<&ContextToken> for StorageContext {
    fn from(token: &ContextToken) -> Self {
        match token {
            ContextToken::Record(id) => StorageContext::Record(*id),
            ContextToken::Settings(page) => StorageContext::Settings(page.clone()),
        }
    }
}

/// The raw settings-page key concatenation.
pub fn settings_key(page: &str, name: &str) -> String {
    format!("{page}_{name}")
}

/// The per-field settings-page key derivation.
///
/// Applies the page prefix unless the field configures
/// `use_name_prefix: false`, in which case the bare field name is the
/// key.
pub fn settings_field_key(page: &str, field: &Field) -> String {
    match field.config().bool_key("use_name_prefix") {
        Some(false) => field.name().to_string(),
        _ => settings_key(page, field.name()),
    }
}

/// Resolves `(field, context, key style)` triples to concrete persisted
/// values in a host [`MetaStore`].
///
/// # Examples
///
/// ```
/// use formfield_storage::{MemoryStore, MetaStore, StorageAdapter, StorageContext};
/// use serde_json::json;
///
/// let mut adapter = StorageAdapter::new(MemoryStore::new());
/// let ctx = StorageContext::Record(7);
///
/// // The read API falls back to the default for absent or empty values.
/// assert_eq!(adapter.get_field("sku", &ctx, json!("n/a")), json!("n/a"));
///
/// adapter.store_mut().set_record_meta(7, "sku", json!("abc-1"));
/// assert_eq!(adapter.get_field("sku", &ctx, json!("n/a")), json!("abc-1"));
/// ```
#[derive(Debug)]
pub struct StorageAdapter<S: MetaStore> {
    store: S,
}

impl<S: MetaStore> StorageAdapter<S> {
    /// Wraps a host store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Unwraps the adapter.
    pub fn into_inner(self) -> S {
        self.store
    }

    fn key_for(ctx: &StorageContext, field: &Field, style: KeyStyle) -> String {
        match ctx {
            StorageContext::Record(_) | StorageContext::Term(_) => field.name().to_string(),
            StorageContext::Settings(page) => match style {
                KeyStyle::Concat => settings_key(page, field.name()),
                KeyStyle::FieldPreference => settings_field_key(page, field),
            },
        }
    }

    /// Reads the stored value for a field, if any.
    pub fn get(&self, ctx: &StorageContext, field: &Field, style: KeyStyle) -> Option<Value> {
        let key = Self::key_for(ctx, field, style);
        match ctx {
            StorageContext::Record(id) => self.store.get_record_meta(*id, &key),
            StorageContext::Term(id) => self.store.get_term_meta(*id, &key),
            StorageContext::Settings(_) => self.store.get_option(&key),
        }
    }

    /// Commits a value for a field.
    pub fn set(&mut self, ctx: &StorageContext, field: &Field, style: KeyStyle, value: Value) {
        let key = Self::key_for(ctx, field, style);
        match ctx {
            StorageContext::Record(id) => self.store.set_record_meta(*id, &key, value),
            StorageContext::Term(id) => self.store.set_term_meta(*id, &key, value),
            StorageContext::Settings(_) => self.store.set_option(&key, value),
        }
    }

    /// Deletes a field's stored value.
    pub fn delete(&mut self, ctx: &StorageContext, field: &Field, style: KeyStyle) {
        let key = Self::key_for(ctx, field, style);
        match ctx {
            StorageContext::Record(id) => self.store.delete_record_meta(*id, &key),
            StorageContext::Term(id) => self.store.delete_term_meta(*id, &key),
            StorageContext::Settings(_) => self.store.delete_option(&key),
        }
    }

    /// The host read API: the stored value if present and non-empty, else
    /// `default`.
    ///
    /// Emptiness is the host's falsy/blank semantics
    /// ([`is_empty_value`]): `0`, `false`, and `""` all fall back to the
    /// default, while the string `"0"` does not.
    pub fn get_field(&self, name: &str, ctx: &StorageContext, default: Value) -> Value {
        let stored = match ctx {
            StorageContext::Record(id) => self.store.get_record_meta(*id, name),
            StorageContext::Term(id) => self.store.get_term_meta(*id, name),
            StorageContext::Settings(page) => self.store.get_option(&settings_key(page, name)),
        };
        match stored {
            Some(value) if !is_empty_value(&value) => value,
            _ => default,
        }
    }
}

impl<S: MetaStore> ValueSource for StorageAdapter<S> {
    fn resolve(&self, field: &Field, ctx: &ContextToken, style: KeyStyle) -> Option<Value> {
        let ctx = StorageContext::from(ctx);
        self.get(&ctx, field, style).filter(|v| !is_empty_value(v))
    }
}

#[cfg(test)]
mod tests {
    use formfield_core::FieldTypeRegistry;
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn build(config: serde_json::Value) -> Field {
        FieldTypeRegistry::default()
            .create(config.as_object().expect("object"))
            .expect("constructible")
    }

    #[test]
    fn test_record_and_term_keys_are_verbatim() {
        let mut adapter = StorageAdapter::new(MemoryStore::new());
        let field = build(json!({"name": "sku", "type": "text"}));

        adapter.set(&StorageContext::Record(1), &field, KeyStyle::Concat, json!("a"));
        assert_eq!(adapter.store().get_record_meta(1, "sku"), Some(json!("a")));

        adapter.set(&StorageContext::Term(9), &field, KeyStyle::FieldPreference, json!("b"));
        assert_eq!(adapter.store().get_term_meta(9, "sku"), Some(json!("b")));
    }

    #[test]
    fn test_settings_concat_key() {
        let mut adapter = StorageAdapter::new(MemoryStore::new());
        let field = build(json!({"name": "currency", "type": "text"}));
        let ctx = StorageContext::Settings("shop".to_string());

        adapter.set(&ctx, &field, KeyStyle::Concat, json!("USD"));
        assert_eq!(adapter.store().get_option("shop_currency"), Some(json!("USD")));
    }

    #[test]
    fn test_settings_field_preference_honors_flag() {
        let mut adapter = StorageAdapter::new(MemoryStore::new());
        let ctx = StorageContext::Settings("shop".to_string());

        let unprefixed = build(json!({
            "name": "currency",
            "type": "text",
            "use_name_prefix": false,
        }));
        adapter.set(&ctx, &unprefixed, KeyStyle::FieldPreference, json!("USD"));
        assert_eq!(adapter.store().get_option("currency"), Some(json!("USD")));
        assert_eq!(adapter.store().get_option("shop_currency"), None);

        // Without the flag, the helper agrees with the raw concatenation.
        let prefixed = build(json!({"name": "tax_rate", "type": "number"}));
        adapter.set(&ctx, &prefixed, KeyStyle::FieldPreference, json!(20));
        assert_eq!(adapter.store().get_option("shop_tax_rate"), Some(json!(20)));
    }

    #[test]
    fn test_the_two_settings_derivations_diverge() {
        // The same flagged field lands on different keys depending on the
        // style the call site picks. Observed behavior, kept literally.
        let field = build(json!({
            "name": "currency",
            "type": "text",
            "use_name_prefix": false,
        }));
        assert_eq!(settings_key("shop", field.name()), "shop_currency");
        assert_eq!(settings_field_key("shop", &field), "currency");
    }

    #[test]
    fn test_get_field_empty_means_default() {
        let mut adapter = StorageAdapter::new(MemoryStore::new());
        let ctx = StorageContext::Record(5);

        assert_eq!(adapter.get_field("qty", &ctx, json!(10)), json!(10));

        // Zero-like stored values fall back too; the sharp edge callers
        // must know about.
        adapter.store_mut().set_record_meta(5, "qty", json!(0));
        assert_eq!(adapter.get_field("qty", &ctx, json!(10)), json!(10));
        adapter.store_mut().set_record_meta(5, "qty", json!(""));
        assert_eq!(adapter.get_field("qty", &ctx, json!(10)), json!(10));
        adapter.store_mut().set_record_meta(5, "qty", json!(false));
        assert_eq!(adapter.get_field("qty", &ctx, json!(10)), json!(10));

        // The string "0" is a real value.
        adapter.store_mut().set_record_meta(5, "qty", json!("0"));
        assert_eq!(adapter.get_field("qty", &ctx, json!(10)), json!("0"));
    }

    #[test]
    fn test_value_source_resolves_through_token() {
        let mut adapter = StorageAdapter::new(MemoryStore::new());
        let field = build(json!({"name": "sku", "type": "text"}));
        adapter.store_mut().set_record_meta(3, "sku", json!("abc"));

        let token = ContextToken::Record(3);
        assert_eq!(
            adapter.resolve(&field, &token, KeyStyle::Concat),
            Some(json!("abc"))
        );
        assert_eq!(
            adapter.resolve(&field, &ContextToken::Record(4), KeyStyle::Concat),
            None
        );
    }
}
