//! Per-namespace field registration and the flatten walk.
//!
//! A namespace is the scope within which field names are unique: one
//! record type, one taxonomy, or one settings page. Adding a top-level
//! field flattens its whole container tree into the namespace's flat map
//! with a depth-first pre-order walk, marking every descendant as nested.
//! Nested names are excluded from the top-level listing — they render and
//! register with the host only through their owning container — but they
//! are still part of the full flat map the save loop iterates.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::config::ConfigMap;
use crate::context::ContextKind;
use crate::error::Result;
use crate::factory::FieldTypeRegistry;
use crate::field::Field;

#[derive(Debug, Default)]
struct NamespaceFields {
    order: Vec<String>,
    fields: HashMap<String, Field>,
    nested: HashSet<String>,
}

impl NamespaceFields {
    fn insert(&mut self, field: Field, nested: bool) {
        let name = field.name().to_string();
        if self.fields.insert(name.clone(), field).is_some() {
            // Duplicate names within a namespace overwrite, last write
            // wins. Observable behavior; kept, but not kept quiet.
            warn!(field = %name, "duplicate field name in namespace, overwriting");
        } else {
            self.order.push(name.clone());
        }
        if nested {
            self.nested.insert(name);
        } else {
            self.nested.remove(&name);
        }
    }
}

/// Flat per-namespace registries of constructed fields.
///
/// An explicit object with no global state: tests isolate themselves by
/// constructing a fresh instance.
///
/// # Examples
///
/// ```
/// use formfield_core::{ContextKind, FieldRegistry, FieldTypeRegistry};
/// use serde_json::json;
///
/// let types = FieldTypeRegistry::default();
/// let mut registry = FieldRegistry::new();
///
/// let config = json!({
///     "name": "pricing",
///     "type": "group",
///     "fields": [
///         {"name": "price", "type": "number"},
///         {"name": "currency", "type": "select", "options": ["USD", "EUR"]},
///     ],
/// });
/// registry
///     .add_field(&types, ContextKind::Record, "product", config.as_object().unwrap())
///     .unwrap();
///
/// // Every descendant lands in the flat map exactly once.
/// assert!(registry.field(ContextKind::Record, "product", "price").is_some());
/// assert!(registry.is_nested(ContextKind::Record, "product", "price"));
///
/// // The top-level listing only shows the container.
/// let top: Vec<&str> = registry
///     .top_level_fields(ContextKind::Record, "product")
///     .iter()
///     .map(|f| f.name())
///     .collect();
/// assert_eq!(top, vec!["pricing"]);
/// ```
#[derive(Debug, Default)]
pub struct FieldRegistry {
    spaces: HashMap<(ContextKind, String), NamespaceFields>,
}

impl FieldRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a field from raw configuration and flattens it (and
    /// every descendant) into the namespace.
    ///
    /// Returns the top-level field's name.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`](crate::ConfigError) from construction;
    /// nothing is registered when construction fails.
    pub fn add_field(
        &mut self,
        types: &FieldTypeRegistry,
        kind: ContextKind,
        namespace: &str,
        config: &ConfigMap,
    ) -> Result<String> {
        let field = types.create(config)?;
        let name = field.name().to_string();
        debug!(%kind, namespace, field = %name, "registering field");
        let space = self
            .spaces
            .entry((kind, namespace.to_string()))
            .or_default();
        Self::flatten(space, field, false);
        Ok(name)
    }

    fn flatten(space: &mut NamespaceFields, field: Field, nested: bool) {
        let children: Vec<Field> = field.nested_fields().into_iter().cloned().collect();
        space.insert(field, nested);
        for child in children {
            Self::flatten(space, child, true);
        }
    }

    fn space(&self, kind: ContextKind, namespace: &str) -> Option<&NamespaceFields> {
        self.spaces.get(&(kind, namespace.to_string()))
    }

    /// Looks up one field by name.
    pub fn field(&self, kind: ContextKind, namespace: &str, name: &str) -> Option<&Field> {
        self.space(kind, namespace)?.fields.get(name)
    }

    /// Every field in the namespace, registration order. This is the save
    /// loop's input; the nested flag is deliberately ignored here.
    pub fn fields(&self, kind: ContextKind, namespace: &str) -> Vec<&Field> {
        let Some(space) = self.space(kind, namespace) else {
            return Vec::new();
        };
        space
            .order
            .iter()
            .filter_map(|name| space.fields.get(name))
            .collect()
    }

    /// Fields the host may surface independently: registration order,
    /// nested names excluded.
    pub fn top_level_fields(&self, kind: ContextKind, namespace: &str) -> Vec<&Field> {
        let Some(space) = self.space(kind, namespace) else {
            return Vec::new();
        };
        space
            .order
            .iter()
            .filter(|name| !space.nested.contains(*name))
            .filter_map(|name| space.fields.get(name))
            .collect()
    }

    /// Whether a name is owned by an ancestor container in this
    /// namespace.
    pub fn is_nested(&self, kind: ContextKind, namespace: &str, name: &str) -> bool {
        self.space(kind, namespace)
            .map(|space| space.nested.contains(name))
            .unwrap_or(false)
    }

    /// All registered namespaces, sorted.
    pub fn namespaces(&self) -> Vec<(ContextKind, &str)> {
        let mut spaces: Vec<(ContextKind, &str)> = self
            .spaces
            .keys()
            .map(|(kind, ns)| (*kind, ns.as_str()))
            .collect();
        spaces.sort_unstable();
        spaces
    }

    /// Drops a namespace so it can be rebuilt from scratch.
    pub fn clear_namespace(&mut self, kind: ContextKind, namespace: &str) {
        self.spaces.remove(&(kind, namespace.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn add(
        registry: &mut FieldRegistry,
        types: &FieldTypeRegistry,
        namespace: &str,
        config: serde_json::Value,
    ) {
        registry
            .add_field(
                types,
                ContextKind::Record,
                namespace,
                config.as_object().expect("object"),
            )
            .expect("constructible");
    }

    #[test]
    fn test_flatten_registers_each_descendant_once() {
        let types = FieldTypeRegistry::default();
        let mut registry = FieldRegistry::new();
        add(
            &mut registry,
            &types,
            "product",
            json!({
                "name": "panels",
                "type": "tabs",
                "tabs": [
                    {"id": "a", "label": "A", "fields": [
                        {"name": "sku", "type": "text"},
                        {"name": "inner", "type": "group", "fields": [
                            {"name": "weight", "type": "number"},
                        ]},
                    ]},
                    {"id": "b", "label": "B", "fields": [
                        {"name": "notes", "type": "textarea"},
                    ]},
                ],
            }),
        );

        let names: Vec<&str> = registry
            .fields(ContextKind::Record, "product")
            .iter()
            .map(|f| f.name())
            .collect();
        assert_eq!(names, vec!["panels", "sku", "inner", "weight", "notes"]);

        for nested in ["sku", "inner", "weight", "notes"] {
            assert!(registry.is_nested(ContextKind::Record, "product", nested));
        }
        assert!(!registry.is_nested(ContextKind::Record, "product", "panels"));
    }

    #[test]
    fn test_top_level_listing_excludes_nested() {
        let types = FieldTypeRegistry::default();
        let mut registry = FieldRegistry::new();
        add(&mut registry, &types, "product", json!({"name": "sku", "type": "text"}));
        add(
            &mut registry,
            &types,
            "product",
            json!({"name": "g", "type": "group", "fields": [
                {"name": "inner_a", "type": "text"},
            ]}),
        );

        let top: Vec<&str> = registry
            .top_level_fields(ContextKind::Record, "product")
            .iter()
            .map(|f| f.name())
            .collect();
        assert_eq!(top, vec!["sku", "g"]);

        // But the save loop sees everything.
        assert_eq!(registry.fields(ContextKind::Record, "product").len(), 3);
    }

    #[test]
    fn test_duplicate_name_overwrites_last_write_wins() {
        let types = FieldTypeRegistry::default();
        let mut registry = FieldRegistry::new();
        add(
            &mut registry,
            &types,
            "product",
            json!({"name": "sku", "type": "text", "label": "First"}),
        );
        add(
            &mut registry,
            &types,
            "product",
            json!({"name": "sku", "type": "number", "label": "Second"}),
        );

        let field = registry.field(ContextKind::Record, "product", "sku").unwrap();
        assert_eq!(field.type_tag(), "number");
        assert_eq!(field.label(), "Second");
        assert_eq!(registry.fields(ContextKind::Record, "product").len(), 1);
        // A later top-level registration clears the nested mark too.
        assert!(!registry.is_nested(ContextKind::Record, "product", "sku"));
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let types = FieldTypeRegistry::default();
        let mut registry = FieldRegistry::new();
        add(&mut registry, &types, "product", json!({"name": "sku", "type": "text"}));
        registry
            .add_field(
                &types,
                ContextKind::Settings,
                "shop",
                json!({"name": "sku", "type": "number"}).as_object().unwrap(),
            )
            .unwrap();

        assert_eq!(
            registry
                .field(ContextKind::Record, "product", "sku")
                .unwrap()
                .type_tag(),
            "text"
        );
        assert_eq!(
            registry
                .field(ContextKind::Settings, "shop", "sku")
                .unwrap()
                .type_tag(),
            "number"
        );
        assert_eq!(registry.namespaces().len(), 2);
    }

    #[test]
    fn test_clear_namespace_rebuilds_from_scratch() {
        let types = FieldTypeRegistry::default();
        let mut registry = FieldRegistry::new();
        add(&mut registry, &types, "product", json!({"name": "old", "type": "text"}));
        registry.clear_namespace(ContextKind::Record, "product");
        add(&mut registry, &types, "product", json!({"name": "new", "type": "text"}));

        assert!(registry.field(ContextKind::Record, "product", "old").is_none());
        assert!(registry.field(ContextKind::Record, "product", "new").is_some());
    }

    #[test]
    fn test_failed_construction_registers_nothing() {
        let types = FieldTypeRegistry::default();
        let mut registry = FieldRegistry::new();
        let config = json!({"name": "g", "type": "group", "fields": [
            {"name": "ok", "type": "text"},
            {"name": "bad", "type": "hologram"},
        ]});
        let result = registry.add_field(
            &types,
            ContextKind::Record,
            "product",
            config.as_object().unwrap(),
        );
        assert!(result.is_err());
        assert!(registry.fields(ContextKind::Record, "product").is_empty());
    }
}
