//! Field construction and the type registry.
//!
//! Every field is built by [`FieldTypeRegistry::create`] from a raw
//! configuration map. The registry is an explicit table from type tag to
//! constructor function — populated with the built-ins by [`Default`],
//! mutable for hosts that register their own tags, and resettable so test
//! suites can isolate registry mutations between cases. There is no hidden
//! global state.

use std::collections::HashMap;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::config::{ConfigMap, FieldConfig};
use crate::error::{ConfigError, Result};
use crate::field::Field;
use crate::kind::{
    DateSpec, FieldKind, MetaboxContext, MetaboxPriority, NumberSpec, Tab, TabOrientation,
    TextSpec,
};
use crate::validate::DATE_FORMAT;

/// Builds a [`Field`] from raw configuration.
///
/// The registry is passed through so container constructors can recurse
/// for their children.
pub type Constructor = fn(&FieldTypeRegistry, &ConfigMap) -> Result<Field>;

/// Table from type tag to constructor.
///
/// # Examples
///
/// ```
/// use formfield_core::{ConfigMap, Field, FieldTypeRegistry};
/// use serde_json::json;
///
/// fn slug_field(
///     registry: &FieldTypeRegistry,
///     config: &ConfigMap,
/// ) -> Result<Field, formfield_core::ConfigError> {
///     // A custom tag can piggyback on a built-in kind.
///     let mut config = config.clone();
///     config.insert("type".into(), json!("text"));
///     config.insert("pattern".into(), json!("[a-z0-9-]+"));
///     registry.create(&config)
/// }
///
/// let mut types = FieldTypeRegistry::default();
/// assert!(types.has("text"));
/// assert!(!types.has("slug"));
///
/// types.register("slug", slug_field);
/// let config = json!({"name": "permalink", "type": "slug"});
/// let field = types.create(config.as_object().unwrap()).unwrap();
/// assert_eq!(field.type_tag(), "text");
///
/// types.reset();
/// assert!(!types.has("slug"));
/// ```
#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    constructors: HashMap<String, Constructor>,
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        let mut registry = Self {
            constructors: HashMap::new(),
        };
        registry.register("text", new_text);
        registry.register("textarea", new_textarea);
        registry.register("rich_text", new_rich_text);
        registry.register("number", new_number);
        registry.register("email", new_email);
        registry.register("url", new_url);
        registry.register("date", new_date);
        registry.register("password", new_password);
        registry.register("color", new_color);
        registry.register("select", new_select);
        registry.register("checkbox", new_checkbox);
        registry.register("radio", new_radio);
        registry.register("file", new_file);
        registry.register("html", new_html);
        registry.register("group", new_group);
        registry.register("metabox", new_metabox);
        registry.register("tabs", new_tabs);
        registry.register("repeater", new_repeater);
        registry
    }
}

impl FieldTypeRegistry {
    /// A registry with the built-in types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a constructor for a type tag.
    pub fn register(&mut self, tag: impl Into<String>, constructor: Constructor) {
        self.constructors.insert(tag.into(), constructor);
    }

    /// Whether a tag has a constructor.
    pub fn has(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Removes a tag; returns whether it was present.
    pub fn unregister(&mut self, tag: &str) -> bool {
        self.constructors.remove(tag).is_some()
    }

    /// Restores the built-in table, dropping every custom registration.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// All registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Constructs a field from a raw configuration map.
    ///
    /// Fails fast when `name` or `type` is absent or the tag is unknown;
    /// performs no I/O and no side effects. A container configuration with
    /// a malformed child fails as a whole.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingName`], [`ConfigError::MissingType`],
    /// [`ConfigError::UnknownType`], or [`ConfigError::InvalidConfig`] for
    /// defects inside an otherwise well-formed node.
    pub fn create(&self, config: &ConfigMap) -> Result<Field> {
        let name = config.get("name").and_then(Value::as_str).unwrap_or("");
        if name.is_empty() {
            return Err(ConfigError::MissingName);
        }
        let tag = config
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ConfigError::MissingType)?;
        let constructor = self
            .constructors
            .get(tag)
            .ok_or_else(|| ConfigError::UnknownType(tag.to_string()))?;
        constructor(self, config)
    }
}

fn build(config: &ConfigMap, kind: FieldKind) -> Field {
    let wrapped = FieldConfig::new(config.clone());
    Field {
        name: wrapped.string_key("name").unwrap_or_default(),
        label: wrapped.string_key("label"),
        description: wrapped.string_key("description"),
        default: config.get("default").cloned(),
        required: wrapped.flag("required"),
        kind,
        config: wrapped,
    }
}

fn field_name(config: &ConfigMap) -> String {
    config
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn text_spec(config: &ConfigMap) -> Result<TextSpec> {
    let wrapped = FieldConfig::new(config.clone());
    let pattern = match wrapped.str_key("pattern") {
        Some(raw) => {
            // Anchored: the whole value must match.
            let compiled = Regex::new(&format!("^(?:{raw})$")).map_err(|err| {
                ConfigError::InvalidConfig {
                    field: field_name(config),
                    message: format!("invalid pattern: {err}"),
                }
            })?;
            Some(compiled)
        }
        None => None,
    };
    Ok(TextSpec {
        min_length: wrapped.u64_key("min_length"),
        max_length: wrapped.u64_key("max_length"),
        pattern,
    })
}

fn date_bound(config: &ConfigMap, key: &str) -> Result<Option<NaiveDate>> {
    let wrapped = FieldConfig::new(config.clone());
    match wrapped.str_key(key) {
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| ConfigError::InvalidConfig {
                field: field_name(config),
                message: format!("{key} is not a valid date"),
            }),
        None => Ok(None),
    }
}

fn child_fields(registry: &FieldTypeRegistry, config: &ConfigMap, key: &str) -> Result<Vec<Field>> {
    let entries = config
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let mut children = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let child = entry
            .as_object()
            .ok_or_else(|| ConfigError::InvalidConfig {
                field: field_name(config),
                message: format!("{key}[{index}] must be an object"),
            })?;
        children.push(registry.create(child)?);
    }
    Ok(children)
}

fn new_text(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    Ok(build(config, FieldKind::Text(text_spec(config)?)))
}

fn new_textarea(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    Ok(build(config, FieldKind::Textarea(text_spec(config)?)))
}

fn new_rich_text(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    Ok(build(config, FieldKind::RichText))
}

fn new_number(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    let wrapped = FieldConfig::new(config.clone());
    let spec = NumberSpec {
        min: wrapped.f64_key("min"),
        max: wrapped.f64_key("max"),
    };
    Ok(build(config, FieldKind::Number(spec)))
}

fn new_email(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    Ok(build(config, FieldKind::Email))
}

fn new_url(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    Ok(build(config, FieldKind::Url))
}

fn new_date(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    let spec = DateSpec {
        min_date: date_bound(config, "min_date")?,
        max_date: date_bound(config, "max_date")?,
    };
    Ok(build(config, FieldKind::Date(spec)))
}

fn new_password(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    Ok(build(config, FieldKind::Password(text_spec(config)?)))
}

fn new_color(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    Ok(build(config, FieldKind::Color))
}

fn new_select(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    let wrapped = FieldConfig::new(config.clone());
    let kind = FieldKind::Select {
        options: wrapped.options(),
        multiple: wrapped.flag("multiple"),
    };
    Ok(build(config, kind))
}

fn new_checkbox(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    let wrapped = FieldConfig::new(config.clone());
    let kind = FieldKind::Checkbox {
        options: wrapped.options(),
    };
    Ok(build(config, kind))
}

fn new_radio(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    let wrapped = FieldConfig::new(config.clone());
    let kind = FieldKind::Radio {
        options: wrapped.options(),
    };
    Ok(build(config, kind))
}

fn new_file(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    Ok(build(config, FieldKind::File))
}

fn new_html(_: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    let wrapped = FieldConfig::new(config.clone());
    let kind = FieldKind::Html {
        content: wrapped.string_key("content").unwrap_or_default(),
    };
    Ok(build(config, kind))
}

fn new_group(registry: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    let kind = FieldKind::Group {
        children: child_fields(registry, config, "fields")?,
    };
    Ok(build(config, kind))
}

fn new_metabox(registry: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    let wrapped = FieldConfig::new(config.clone());
    let kind = FieldKind::Metabox {
        children: child_fields(registry, config, "fields")?,
        context: wrapped
            .str_key("context")
            .and_then(MetaboxContext::from_tag)
            .unwrap_or_default(),
        priority: wrapped
            .str_key("priority")
            .and_then(MetaboxPriority::from_tag)
            .unwrap_or_default(),
    };
    Ok(build(config, kind))
}

fn new_tabs(registry: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    let wrapped = FieldConfig::new(config.clone());
    let entries = config
        .get("tabs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let mut tabs = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let tab = entry
            .as_object()
            .ok_or_else(|| ConfigError::InvalidConfig {
                field: field_name(config),
                message: format!("tabs[{index}] must be an object"),
            })?;
        let tab_config = FieldConfig::new(tab.clone());
        let id = tab_config
            .string_key("id")
            .ok_or_else(|| ConfigError::InvalidConfig {
                field: field_name(config),
                message: format!("tabs[{index}] is missing an id"),
            })?;
        tabs.push(Tab {
            label: tab_config.string_key("label").unwrap_or_else(|| id.clone()),
            icon: tab_config.string_key("icon"),
            description: tab_config.string_key("description"),
            children: child_fields(registry, tab, "fields")?,
            id,
        });
    }
    let kind = FieldKind::Tabs {
        tabs,
        orientation: wrapped
            .str_key("orientation")
            .and_then(TabOrientation::from_tag)
            .unwrap_or_default(),
        default_tab: wrapped.string_key("default_tab"),
    };
    Ok(build(config, kind))
}

fn new_repeater(registry: &FieldTypeRegistry, config: &ConfigMap) -> Result<Field> {
    let wrapped = FieldConfig::new(config.clone());
    let kind = FieldKind::Repeater {
        children: child_fields(registry, config, "fields")?,
        min_rows: wrapped.u64_key("min_rows").unwrap_or(0),
        max_rows: wrapped.u64_key("max_rows").unwrap_or(0),
        add_label: wrapped.string_key("add_label"),
    };
    Ok(build(config, kind))
}
