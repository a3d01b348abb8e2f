//! Type-specific value sanitization.
//!
//! Sanitization cleans a raw submitted value into the shape the field
//! stores, independently of validation — a value can be cleaned and still
//! fail validation afterwards. Every sanitizer is idempotent: cleaning an
//! already-clean value changes nothing.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::field::Field;
use crate::kind::FieldKind;
use crate::value::{is_empty_value, is_truthy, value_to_string};

struct SanitizePatterns {
    tag: Regex,
    script_block: Regex,
    style_block: Regex,
    whitespace: Regex,
    hex_color: Regex,
}

impl SanitizePatterns {
    fn new() -> Self {
        Self {
            tag: Regex::new(r"<[^>]*>").expect("static regex must compile"),
            script_block: Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>")
                .expect("static regex must compile"),
            style_block: Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>")
                .expect("static regex must compile"),
            whitespace: Regex::new(r"\s+").expect("static regex must compile"),
            hex_color: Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$")
                .expect("static regex must compile"),
        }
    }
}

static PATTERNS: LazyLock<SanitizePatterns> = LazyLock::new(SanitizePatterns::new);

/// Removes markup tags and trims surrounding whitespace.
///
/// # Examples
///
/// ```
/// use formfield_core::sanitize::strip_markup;
///
/// assert_eq!(strip_markup("  <b>abc</b> "), "abc");
/// assert_eq!(strip_markup("a < b"), "a < b");
/// ```
pub fn strip_markup(input: &str) -> String {
    PATTERNS.tag.replace_all(input, "").trim().to_string()
}

/// Trims and removes script and style blocks, keeping other markup.
pub fn sanitize_rich_text(input: &str) -> String {
    let without_scripts = PATTERNS.script_block.replace_all(input, "");
    let without_styles = PATTERNS.style_block.replace_all(&without_scripts, "");
    without_styles.trim().to_string()
}

/// Lowercases and strips all whitespace from an email address.
pub fn sanitize_email(input: &str) -> String {
    PATTERNS
        .whitespace
        .replace_all(input.trim(), "")
        .to_lowercase()
}

/// Trims and strips internal whitespace from a URL.
pub fn sanitize_url(input: &str) -> String {
    PATTERNS.whitespace.replace_all(input.trim(), "").to_string()
}

/// Normalizes a hex color to lowercase `#`-prefixed form.
///
/// Returns `None` for anything that is not a 3- or 6-digit hex value.
///
/// # Examples
///
/// ```
/// use formfield_core::sanitize::sanitize_color;
///
/// assert_eq!(sanitize_color("FF0000"), Some("#ff0000".to_string()));
/// assert_eq!(sanitize_color("#0aF"), Some("#0af".to_string()));
/// assert_eq!(sanitize_color("not-a-color"), None);
/// ```
pub fn sanitize_color(input: &str) -> Option<String> {
    let captures = PATTERNS.hex_color.captures(input.trim())?;
    Some(format!("#{}", captures[1].to_lowercase()))
}

/// Coerces to an integer or float depending on the decimal point.
fn sanitize_number(raw: &Value) -> Value {
    match raw {
        Value::Number(_) => raw.clone(),
        Value::String(s) => {
            let s = s.trim();
            if s.contains('.') {
                s.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            } else {
                s.parse::<i64>()
                    .map(|n| Value::Number(n.into()))
                    .unwrap_or(Value::Null)
            }
        }
        _ => Value::Null,
    }
}

/// Coerces to a media attachment id.
fn sanitize_file(raw: &Value) -> Value {
    match raw {
        Value::Number(n) => n.as_u64().map(|id| Value::Number(id.into())).unwrap_or(Value::Null),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(|id| Value::Number(id.into()))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn option_values(options: &[crate::SelectOption]) -> Vec<&str> {
    options.iter().map(|o| o.value.as_str()).collect()
}

/// Reduces input to the intersection with the configured option set,
/// preserving input order. Unknown keys are dropped silently.
fn sanitize_option_list(raw: &Value, options: &[crate::SelectOption]) -> Value {
    let allowed = option_values(options);
    let entries: Vec<Value> = match raw {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    let kept: Vec<Value> = entries
        .iter()
        .filter_map(value_to_string)
        .filter(|v| allowed.contains(&v.as_str()))
        .map(Value::String)
        .collect();
    Value::Array(kept)
}

fn sanitize_single_option(raw: &Value, options: &[crate::SelectOption]) -> Value {
    let Some(candidate) = value_to_string(raw) else {
        return Value::Null;
    };
    if option_values(options).contains(&candidate.as_str()) {
        Value::String(candidate)
    } else {
        Value::Null
    }
}

/// Sanitizes each row of a repeater with the template children's own
/// sanitizers. Unknown keys and all-empty rows are dropped.
fn sanitize_rows(children: &[Field], raw: &Value) -> Value {
    let Value::Array(rows) = raw else {
        return Value::Null;
    };
    let mut clean_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let Value::Object(cells) = row else {
            continue;
        };
        let mut clean = Map::new();
        for child in children {
            let Some(cell) = cells.get(child.name()) else {
                continue;
            };
            let value = child.sanitize(cell);
            if value.is_null() {
                continue;
            }
            clean.insert(child.name().to_string(), value);
        }
        if !clean.is_empty() {
            clean_rows.push(Value::Object(clean));
        }
    }
    Value::Array(clean_rows)
}

/// Dispatches sanitization for one field.
pub(crate) fn sanitize_field(field: &Field, raw: &Value) -> Value {
    match field.kind() {
        FieldKind::Checkbox { options } if options.is_empty() => {
            // Two-state marker: always "1" or "0", never absent.
            Value::String(if is_truthy(raw) { "1" } else { "0" }.to_string())
        }
        _ if raw.is_null() => Value::Null,
        FieldKind::Text(_) | FieldKind::Textarea(_) => value_to_string(raw)
            .map(|s| Value::String(strip_markup(&s)))
            .unwrap_or(Value::Null),
        FieldKind::RichText => value_to_string(raw)
            .map(|s| Value::String(sanitize_rich_text(&s)))
            .unwrap_or(Value::Null),
        FieldKind::Number(_) => sanitize_number(raw),
        FieldKind::Email => value_to_string(raw)
            .map(|s| Value::String(sanitize_email(&s)))
            .unwrap_or(Value::Null),
        FieldKind::Url => value_to_string(raw)
            .map(|s| Value::String(sanitize_url(&s)))
            .unwrap_or(Value::Null),
        FieldKind::Date(_) => value_to_string(raw)
            .map(|s| Value::String(s.trim().to_string()))
            .unwrap_or(Value::Null),
        // Secrets keep every character; nothing is trimmed or stripped.
        FieldKind::Password(_) => match raw {
            Value::String(_) => raw.clone(),
            other => value_to_string(other).map(Value::String).unwrap_or(Value::Null),
        },
        FieldKind::Color => value_to_string(raw)
            .and_then(|s| sanitize_color(&s))
            .map(Value::String)
            .or_else(|| {
                field
                    .default_value()
                    .filter(|d| !is_empty_value(d))
                    .cloned()
            })
            .unwrap_or(Value::Null),
        FieldKind::Select { options, multiple } => {
            if *multiple {
                sanitize_option_list(raw, options)
            } else {
                sanitize_single_option(raw, options)
            }
        }
        FieldKind::Checkbox { options } => sanitize_option_list(raw, options),
        FieldKind::Radio { options } => sanitize_single_option(raw, options),
        FieldKind::File => sanitize_file(raw),
        // Display-only and grouping kinds never hold a value.
        FieldKind::Html { .. }
        | FieldKind::Group { .. }
        | FieldKind::Metabox { .. }
        | FieldKind::Tabs { .. } => Value::Null,
        FieldKind::Repeater { children, .. } => sanitize_rows(children, raw),
    }
}
