//! The field contract.
//!
//! A [`Field`] is a named, typed unit of user-entered data carrying its
//! render, sanitize, and validate behavior. Fields are constructed once per
//! configuration load through the
//! [`FieldTypeRegistry`](crate::FieldTypeRegistry) and are immutable from
//! then on.

use serde_json::Value;

use crate::config::{ConfigMap, FieldConfig};
use crate::context::ContextToken;
use crate::kind::FieldKind;
use crate::render::ValueSource;
use crate::validate::ValidationResult;

/// A single field definition with behavior.
///
/// # Examples
///
/// ```
/// use formfield_core::FieldTypeRegistry;
/// use serde_json::json;
///
/// let types = FieldTypeRegistry::default();
/// let config = json!({
///     "name": "sku",
///     "type": "text",
///     "label": "SKU",
///     "required": true,
///     "max_length": 32,
/// });
/// let field = types.create(config.as_object().unwrap()).unwrap();
///
/// assert_eq!(field.name(), "sku");
/// assert_eq!(field.label(), "SKU");
/// assert_eq!(field.type_tag(), "text");
/// assert!(field.required());
/// assert!(!field.is_container());
///
/// // Sanitize strips markup and trims; validate reports as data.
/// assert_eq!(field.sanitize(&json!("  <b>abc-1</b> ")), json!("abc-1"));
/// assert!(field.validate(&json!("abc-1")).valid);
/// assert!(!field.validate(&json!("")).valid);
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) label: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) required: bool,
    pub(crate) kind: FieldKind,
    pub(crate) config: FieldConfig,
}

impl Field {
    /// Unique name within the field's namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display label, falling back to the name when none is configured.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Optional help text.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Configured default value.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether a non-empty value is required on save.
    pub fn required(&self) -> bool {
        self.required
    }

    /// The configuration tag of this field's kind.
    pub fn type_tag(&self) -> &'static str {
        self.kind.tag()
    }

    /// The kind payload for exhaustive dispatch.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Full raw configuration this field was built from.
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Raw configuration lookup with a fallback.
    ///
    /// # Examples
    ///
    /// ```
    /// use formfield_core::FieldTypeRegistry;
    /// use serde_json::json;
    ///
    /// let types = FieldTypeRegistry::default();
    /// let config = json!({"name": "bio", "type": "textarea", "rows": 6});
    /// let field = types.create(config.as_object().unwrap()).unwrap();
    ///
    /// assert_eq!(field.get_config("rows", json!(4)), json!(6));
    /// assert_eq!(field.get_config("cols", json!(40)), json!(40));
    /// ```
    pub fn get_config(&self, key: &str, default: Value) -> Value {
        self.config.get(key).cloned().unwrap_or(default)
    }

    /// Whether this field composes other fields.
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Whether this field persists a value of its own.
    pub fn stores_value(&self) -> bool {
        self.kind.stores_value()
    }

    /// The constructed descendant fields at depth 1, declaration order.
    ///
    /// Group, metabox, and repeater expose their direct children; tabs
    /// flattens across all tabs in tab order. Leaves have none.
    pub fn nested_fields(&self) -> Vec<&Field> {
        match &self.kind {
            FieldKind::Group { children }
            | FieldKind::Metabox { children, .. }
            | FieldKind::Repeater { children, .. } => children.iter().collect(),
            FieldKind::Tabs { tabs, .. } => {
                tabs.iter().flat_map(|tab| tab.children.iter()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// The same descendants as raw configuration maps.
    pub fn nested_field_configs(&self) -> Vec<ConfigMap> {
        self.nested_fields()
            .into_iter()
            .map(|child| child.config.raw().clone())
            .collect()
    }

    /// Cleans a raw submitted value. Type-specific, independent of
    /// validation, and idempotent.
    pub fn sanitize(&self, raw: &Value) -> Value {
        crate::sanitize::sanitize_field(self, raw)
    }

    /// Checks a value against this field's rules.
    ///
    /// All applicable rules run; failures accumulate. The result is always
    /// returned, never an error.
    pub fn validate(&self, value: &Value) -> ValidationResult {
        crate::validate::validate_field(self, value)
    }

    /// Renders this leaf field with its current value.
    ///
    /// Containers render through [`Field::render`]; calling this on a
    /// container yields only its empty wrapper.
    pub fn render_value(&self, value: &Value) -> String {
        crate::render::render_leaf(self, value)
    }

    /// Renders this field as part of a tree, resolving descendant values
    /// through `source` under the given context.
    pub fn render(&self, ctx: &ContextToken, source: &dyn ValueSource) -> String {
        crate::render::render_tree(self, ctx, source)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::FieldTypeRegistry;

    fn build(config: serde_json::Value) -> crate::Field {
        FieldTypeRegistry::default()
            .create(config.as_object().expect("test config must be an object"))
            .expect("test config must construct")
    }

    #[test]
    fn test_label_falls_back_to_name() {
        let field = build(json!({"name": "subtitle", "type": "text"}));
        assert_eq!(field.label(), "subtitle");

        let field = build(json!({"name": "subtitle", "type": "text", "label": "Subtitle"}));
        assert_eq!(field.label(), "Subtitle");
    }

    #[test]
    fn test_nested_fields_declaration_order() {
        let field = build(json!({
            "name": "details",
            "type": "group",
            "fields": [
                {"name": "a", "type": "text"},
                {"name": "b", "type": "number"},
                {"name": "c", "type": "color"},
            ],
        }));
        let names: Vec<&str> = field.nested_fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tabs_flatten_across_tabs_in_tab_order() {
        let field = build(json!({
            "name": "panels",
            "type": "tabs",
            "tabs": [
                {"id": "one", "label": "One", "fields": [
                    {"name": "a", "type": "text"},
                ]},
                {"id": "two", "label": "Two", "fields": [
                    {"name": "b", "type": "text"},
                    {"name": "c", "type": "text"},
                ]},
            ],
        }));
        let names: Vec<&str> = field.nested_fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nested_field_configs_match_children() {
        let field = build(json!({
            "name": "rows",
            "type": "repeater",
            "fields": [
                {"name": "qty", "type": "number", "min": 1},
            ],
        }));
        let configs = field.nested_field_configs();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].get("name"), Some(&json!("qty")));
        assert_eq!(configs[0].get("min"), Some(&json!(1)));
    }

    #[test]
    fn test_leaves_have_no_nested_fields() {
        let field = build(json!({"name": "sku", "type": "text"}));
        assert!(field.nested_fields().is_empty());
        assert!(field.nested_field_configs().is_empty());
    }
}
