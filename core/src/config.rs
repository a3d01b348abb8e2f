//! Typed access to raw field configuration.
//!
//! A field's configuration arrives as a JSON object (directly from a file
//! or built in code). [`FieldConfig`] wraps that map and provides the typed
//! accessors the constructors, sanitizers, and renderers need, without ever
//! failing on absent or mistyped keys — structural problems are the schema
//! validator's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw configuration map for a single field node.
pub type ConfigMap = serde_json::Map<String, Value>;

/// A single option in a select, radio, or multi-checkbox field.
///
/// Parsed from either `{"value": "usd", "label": "US Dollar"}` objects or
/// the `"usd"` string shorthand (value doubles as label). Order is
/// declaration order.
///
/// # Examples
///
/// ```
/// use formfield_core::SelectOption;
///
/// let opt = SelectOption::new("usd", "US Dollar");
/// assert_eq!(opt.value, "usd");
/// assert_eq!(opt.label, "US Dollar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Stored option key.
    pub value: String,
    /// Human-facing label.
    pub label: String,
}

impl SelectOption {
    /// Creates an option from a value and label pair.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Wrapper over a raw configuration map with typed, lenient accessors.
///
/// # Examples
///
/// ```
/// use formfield_core::FieldConfig;
/// use serde_json::json;
///
/// let config = FieldConfig::from_value(json!({
///     "placeholder": "SKU",
///     "max_length": 32,
///     "required": true,
/// }));
/// assert_eq!(config.str_key("placeholder"), Some("SKU"));
/// assert_eq!(config.u64_key("max_length"), Some(32));
/// assert!(config.flag("required"));
/// assert_eq!(config.str_key("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldConfig {
    map: ConfigMap,
}

impl FieldConfig {
    /// Wraps an existing configuration map.
    pub fn new(map: ConfigMap) -> Self {
        Self { map }
    }

    /// Wraps a JSON value; anything that is not an object becomes an empty
    /// configuration.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self { map },
            _ => Self::default(),
        }
    }

    /// The underlying raw map.
    pub fn raw(&self) -> &ConfigMap {
        &self.map
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Whether the key is present at all.
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// String value of a key, if present and a string.
    pub fn str_key(&self, key: &str) -> Option<&str> {
        self.map.get(key).and_then(Value::as_str)
    }

    /// Owned string value of a key.
    pub fn string_key(&self, key: &str) -> Option<String> {
        self.str_key(key).map(String::from)
    }

    /// Unsigned integer value of a key (accepts numeric strings).
    pub fn u64_key(&self, key: &str) -> Option<u64> {
        match self.map.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float value of a key (accepts numeric strings).
    pub fn f64_key(&self, key: &str) -> Option<f64> {
        match self.map.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean value of a key, if present and a boolean.
    pub fn bool_key(&self, key: &str) -> Option<bool> {
        self.map.get(key).and_then(Value::as_bool)
    }

    /// Truthy flag: absent keys are false.
    pub fn flag(&self, key: &str) -> bool {
        self.map
            .get(key)
            .map(crate::value::is_truthy)
            .unwrap_or(false)
    }

    /// Array value of a key, if present and an array.
    pub fn array_key(&self, key: &str) -> Option<&Vec<Value>> {
        self.map.get(key).and_then(Value::as_array)
    }

    /// Parses the `options` key into an ordered option list.
    ///
    /// Accepts an array of `{value, label?}` objects or bare strings.
    /// Malformed entries are dropped.
    pub fn options(&self) -> Vec<SelectOption> {
        parse_options(self.array_key("options").map(Vec::as_slice).unwrap_or(&[]))
    }
}

/// Parses an options array into ordered [`SelectOption`]s.
pub fn parse_options(entries: &[Value]) -> Vec<SelectOption> {
    let mut options = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::String(s) => options.push(SelectOption::new(s.clone(), s.clone())),
            Value::Object(map) => {
                let Some(value) = map.get("value").and_then(Value::as_str) else {
                    continue;
                };
                let label = map
                    .get("label")
                    .and_then(Value::as_str)
                    .unwrap_or(value);
                options.push(SelectOption::new(value, label));
            }
            _ => {}
        }
    }
    options
}
