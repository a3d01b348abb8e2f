//! Value emptiness and coercion semantics.
//!
//! Field values are [`serde_json::Value`] throughout the engine. The host's
//! falsy/blank semantics are concentrated in [`is_empty_value`] so that
//! every "empty means use the default" decision is made in exactly one
//! place.
//!
//! # Examples
//!
//! ```
//! use formfield_core::value::is_empty_value;
//! use serde_json::json;
//!
//! assert!(is_empty_value(&json!(null)));
//! assert!(is_empty_value(&json!(0)));
//! assert!(is_empty_value(&json!("")));
//! assert!(is_empty_value(&json!(false)));
//!
//! // The string "0" is NOT empty: an unchecked checkbox stores "0" and
//! // must stay distinguishable from a value that was never stored.
//! assert!(!is_empty_value(&json!("0")));
//! ```

use serde_json::Value;

/// Returns true when a value counts as "empty" for default-fallback
/// purposes.
///
/// Empty: `null`, `false`, numeric zero, `""`, `[]`, `{}`. Everything
/// else — including the string `"0"` — is a real value.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Loose truthiness used by checkbox sanitization.
///
/// `true`, nonzero numbers, and the strings `"1"`, `"true"`, `"on"`,
/// `"yes"` (case-insensitive) are truthy; everything else is not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("on")
                || s.eq_ignore_ascii_case("yes")
        }
        _ => false,
    }
}

/// Renders a scalar value as a plain string.
///
/// Strings pass through, numbers and booleans are formatted; arrays,
/// objects, and `null` have no scalar form and return `None`.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Extracts a float from a number or a numeric string.
pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
