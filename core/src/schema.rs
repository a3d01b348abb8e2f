//! Structural validation of raw field configuration.
//!
//! The schema validator runs over configuration trees before any field is
//! constructed, so malformed configuration fails with precise diagnostics
//! instead of opaque construction errors. It is a pure function of its
//! input: it never panics and never touches the type registry.
//!
//! # Examples
//!
//! ```
//! use formfield_core::SchemaValidator;
//! use serde_json::json;
//!
//! let validator = SchemaValidator::new();
//!
//! let good = json!({"name": "sku", "type": "text", "max_length": 32});
//! assert!(validator.validate_config(good.as_object().unwrap()).valid);
//!
//! let bad = json!({"name": "Invalid-Name!", "type": "select"});
//! let report = validator.validate_config(bad.as_object().unwrap());
//! assert!(!report.valid);
//! assert!(report.errors.iter().any(|e| e.contains("name")));
//! assert!(report.errors.iter().any(|e| e.contains("options")));
//! ```

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::config::ConfigMap;
use crate::kind::TYPE_TAGS;
use crate::validate::DATE_FORMAT;

/// Maximum accepted field-name length.
pub const MAX_NAME_LENGTH: usize = 64;

const NAME_PATTERN: &str = "^[a-z_][a-z0-9_]*$";

/// Accumulated outcome of a schema validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    /// Whether the configuration passed every check.
    pub valid: bool,
    /// Human-readable, path-qualified error strings.
    pub errors: Vec<String>,
}

impl SchemaReport {
    /// Builds a report from accumulated errors; empty means valid.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// A passing report.
    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: SchemaReport) {
        self.errors.extend(other.errors);
        self.valid = self.errors.is_empty();
    }

    /// Formats the report as a multi-line message suitable for logs or
    /// CLI output.
    pub fn to_message(&self) -> String {
        if self.valid {
            return "configuration passed schema validation".to_string();
        }
        let mut message = format!(
            "configuration failed schema validation with {} error{}:",
            self.errors.len(),
            if self.errors.len() == 1 { "" } else { "s" },
        );
        for error in &self.errors {
            message.push_str("\n  - ");
            message.push_str(error);
        }
        message
    }
}

/// Pure structural validator for raw field configuration trees.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    name_pattern: Regex,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self {
            name_pattern: Regex::new(NAME_PATTERN).expect("static regex must compile"),
        }
    }
}

impl SchemaValidator {
    /// A validator with the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a single field configuration node (and, recursively,
    /// every descendant).
    pub fn validate_config(&self, config: &ConfigMap) -> SchemaReport {
        let mut errors = Vec::new();
        let path = config
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("field")
            .to_string();
        self.check_node(&path, config, &mut errors);
        SchemaReport::from_errors(errors)
    }

    /// Validates an ordered list of field configuration values, reporting
    /// each under `prefix[index]`.
    pub fn validate_fields(&self, prefix: &str, entries: &[Value]) -> SchemaReport {
        let mut errors = Vec::new();
        self.check_entries(prefix, entries, &mut errors);
        SchemaReport::from_errors(errors)
    }

    fn check_entries(&self, prefix: &str, entries: &[Value], errors: &mut Vec<String>) {
        for (index, entry) in entries.iter().enumerate() {
            let path = format!("{prefix}[{index}]");
            match entry.as_object() {
                Some(map) => self.check_node(&path, map, errors),
                None => errors.push(format!("{path}: a field must be an object")),
            }
        }
    }

    fn check_node(&self, path: &str, config: &ConfigMap, errors: &mut Vec<String>) {
        self.check_name(path, config, errors);
        let Some(tag) = self.check_type(path, config, errors) else {
            return;
        };

        match tag {
            "select" | "radio" => {
                if !has_nonempty_array(config, "options") {
                    errors.push(format!("{path}: {tag} requires a non-empty options list"));
                }
            }
            "checkbox" => {
                // Absent options means a single on/off checkbox; present
                // options must not be an empty list.
                if let Some(value) = config.get("options") {
                    if !matches!(value, Value::Array(items) if !items.is_empty()) {
                        errors.push(format!(
                            "{path}: checkbox options must be a non-empty list when present"
                        ));
                    }
                }
            }
            "group" | "metabox" => {
                if !has_nonempty_array(config, "fields") {
                    errors.push(format!("{path}: {tag} requires a non-empty fields list"));
                }
                self.check_child_fields(path, config, errors);
            }
            "repeater" => {
                if !has_nonempty_array(config, "fields") {
                    errors.push(format!("{path}: repeater requires at least one sub-field"));
                }
                self.check_child_fields(path, config, errors);
                check_ordered_u64(config, path, "min_rows", "max_rows", errors);
            }
            "tabs" => self.check_tabs(path, config, errors),
            _ => {}
        }

        check_ordered_f64(config, path, "min", "max", errors);
        check_ordered_u64(config, path, "min_length", "max_length", errors);
        check_date_bounds(config, path, errors);
        check_pattern(config, path, errors);
    }

    fn check_name(&self, path: &str, config: &ConfigMap, errors: &mut Vec<String>) {
        let Some(name) = config.get("name") else {
            errors.push(format!("{path}: name is missing"));
            return;
        };
        let Some(name) = name.as_str() else {
            errors.push(format!("{path}: name must be a string"));
            return;
        };
        if name.len() > MAX_NAME_LENGTH {
            errors.push(format!(
                "{path}: name must be at most {MAX_NAME_LENGTH} characters"
            ));
        }
        if !self.name_pattern.is_match(name) {
            errors.push(format!("{path}: name \"{name}\" must match {NAME_PATTERN}"));
        }
    }

    fn check_type<'a>(
        &self,
        path: &str,
        config: &'a ConfigMap,
        errors: &mut Vec<String>,
    ) -> Option<&'a str> {
        let Some(tag) = config.get("type") else {
            errors.push(format!("{path}: type is missing"));
            return None;
        };
        let Some(tag) = tag.as_str() else {
            errors.push(format!("{path}: type must be a string"));
            return None;
        };
        if !TYPE_TAGS.contains(&tag) {
            errors.push(format!("{path}: unknown field type \"{tag}\""));
            return None;
        }
        Some(tag)
    }

    fn check_child_fields(&self, path: &str, config: &ConfigMap, errors: &mut Vec<String>) {
        if let Some(entries) = config.get("fields").and_then(Value::as_array) {
            self.check_entries(&format!("{path}.fields"), entries, errors);
        }
    }

    fn check_tabs(&self, path: &str, config: &ConfigMap, errors: &mut Vec<String>) {
        let Some(tabs) = config.get("tabs").and_then(Value::as_array) else {
            errors.push(format!("{path}: tabs requires a non-empty tabs list"));
            return;
        };
        if tabs.is_empty() {
            errors.push(format!("{path}: tabs requires a non-empty tabs list"));
            return;
        }
        if let Some(orientation) = config.get("orientation").and_then(Value::as_str) {
            if crate::kind::TabOrientation::from_tag(orientation).is_none() {
                errors.push(format!(
                    "{path}: orientation must be \"horizontal\" or \"vertical\""
                ));
            }
        }
        for (index, entry) in tabs.iter().enumerate() {
            let tab_path = format!("{path}.tabs[{index}]");
            let Some(tab) = entry.as_object() else {
                errors.push(format!("{tab_path}: a tab must be an object"));
                continue;
            };
            if tab.get("id").and_then(Value::as_str).is_none() {
                errors.push(format!("{tab_path}: a tab requires a string id"));
            }
            match tab.get("fields").and_then(Value::as_array) {
                Some(fields) if !fields.is_empty() => {
                    self.check_entries(&format!("{tab_path}.fields"), fields, errors);
                }
                _ => errors.push(format!("{tab_path}: a tab requires a non-empty fields list")),
            }
        }
    }
}

fn has_nonempty_array(config: &ConfigMap, key: &str) -> bool {
    matches!(config.get(key), Some(Value::Array(items)) if !items.is_empty())
}

fn number_key(config: &ConfigMap, key: &str) -> Option<f64> {
    match config.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_ordered_f64(
    config: &ConfigMap,
    path: &str,
    low_key: &str,
    high_key: &str,
    errors: &mut Vec<String>,
) {
    if let (Some(low), Some(high)) = (number_key(config, low_key), number_key(config, high_key)) {
        if low > high {
            errors.push(format!(
                "{path}: {low_key} ({low}) must not exceed {high_key} ({high})"
            ));
        }
    }
}

fn check_ordered_u64(
    config: &ConfigMap,
    path: &str,
    low_key: &str,
    high_key: &str,
    errors: &mut Vec<String>,
) {
    let bound = |key: &str| match config.get(key) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    if let (Some(low), Some(high)) = (bound(low_key), bound(high_key)) {
        // Zero means unbounded for row counts, so it never conflicts.
        if high > 0 && low > high {
            errors.push(format!(
                "{path}: {low_key} ({low}) must not exceed {high_key} ({high})"
            ));
        }
    }
}

fn check_date_bounds(config: &ConfigMap, path: &str, errors: &mut Vec<String>) {
    let parse = |key: &str| -> Option<NaiveDate> {
        let raw = config.get(key)?.as_str()?;
        match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => None,
        }
    };
    for key in ["min_date", "max_date"] {
        if let Some(value) = config.get(key) {
            let valid = value
                .as_str()
                .is_some_and(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).is_ok());
            if !valid {
                errors.push(format!("{path}: {key} must be a valid YYYY-MM-DD date"));
            }
        }
    }
    if let (Some(min), Some(max)) = (parse("min_date"), parse("max_date")) {
        if min > max {
            errors.push(format!("{path}: min_date must not be after max_date"));
        }
    }
}

fn check_pattern(config: &ConfigMap, path: &str, errors: &mut Vec<String>) {
    if let Some(value) = config.get("pattern") {
        match value.as_str() {
            Some(raw) => {
                if Regex::new(&format!("^(?:{raw})$")).is_err() {
                    errors.push(format!("{path}: pattern does not compile"));
                }
            }
            None => errors.push(format!("{path}: pattern must be a string")),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn validate(config: serde_json::Value) -> SchemaReport {
        SchemaValidator::new().validate_config(config.as_object().expect("object"))
    }

    #[test]
    fn test_select_without_options_mentions_options() {
        let report = validate(json!({"name": "currency", "type": "select"}));
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("options")));
    }

    #[test]
    fn test_invalid_name_mentions_name() {
        let report = validate(json!({"name": "Invalid-Name!", "type": "text"}));
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("name")));
    }

    #[test]
    fn test_name_length_limit() {
        let long = "a".repeat(65);
        let report = validate(json!({"name": long, "type": "text"}));
        assert!(!report.valid);

        let edge = "a".repeat(64);
        assert!(validate(json!({"name": edge, "type": "text"})).valid);
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let report = validate(json!({"name": "x", "type": "hologram"}));
        assert_eq!(report.errors, vec!["x: unknown field type \"hologram\""]);
    }

    #[test]
    fn test_min_max_sanity() {
        let report = validate(json!({"name": "qty", "type": "number", "min": 10, "max": 2}));
        assert!(!report.valid);
        assert!(report.errors[0].contains("min"));

        assert!(validate(json!({"name": "qty", "type": "number", "min": 2, "max": 10})).valid);
    }

    #[test]
    fn test_zero_max_rows_means_unbounded() {
        let report = validate(json!({
            "name": "lines",
            "type": "repeater",
            "min_rows": 3,
            "max_rows": 0,
            "fields": [{"name": "sku", "type": "text"}],
        }));
        assert!(report.valid);
    }

    #[test]
    fn test_containers_require_children() {
        let report = validate(json!({"name": "g", "type": "group"}));
        assert!(report.errors.iter().any(|e| e.contains("fields")));

        let report = validate(json!({"name": "t", "type": "tabs", "tabs": []}));
        assert!(report.errors.iter().any(|e| e.contains("tabs")));

        let report = validate(json!({"name": "r", "type": "repeater", "fields": []}));
        assert!(report.errors.iter().any(|e| e.contains("sub-field")));
    }

    #[test]
    fn test_recursion_reports_path_qualified_errors() {
        let report = validate(json!({
            "name": "outer",
            "type": "group",
            "fields": [
                {"name": "ok", "type": "text"},
                {"name": "bad_select", "type": "select"},
            ],
        }));
        assert!(!report.valid);
        assert!(
            report
                .errors
                .iter()
                .any(|e| e.starts_with("outer.fields[1]") && e.contains("options"))
        );
    }

    #[test]
    fn test_tab_structure_checks() {
        let report = validate(json!({
            "name": "panels",
            "type": "tabs",
            "tabs": [
                {"label": "No id", "fields": [{"name": "a", "type": "text"}]},
                {"id": "empty", "label": "Empty"},
            ],
        }));
        assert!(report.errors.iter().any(|e| e.contains("tabs[0]") && e.contains("id")));
        assert!(report.errors.iter().any(|e| e.contains("tabs[1]") && e.contains("fields")));
    }

    #[test]
    fn test_date_bounds_must_be_calendar_valid() {
        let report = validate(json!({
            "name": "due",
            "type": "date",
            "min_date": "2025-02-30",
        }));
        assert!(!report.valid);

        let report = validate(json!({
            "name": "due",
            "type": "date",
            "min_date": "2025-06-01",
            "max_date": "2025-01-01",
        }));
        assert!(report.errors.iter().any(|e| e.contains("min_date")));
    }

    #[test]
    fn test_bad_pattern_is_caught_before_construction() {
        let report = validate(json!({"name": "code", "type": "text", "pattern": "("}));
        assert!(report.errors.iter().any(|e| e.contains("pattern")));
    }

    #[test]
    fn test_report_message_is_multi_line() {
        let report = validate(json!({"name": "Bad!", "type": "select"}));
        let message = report.to_message();
        assert!(message.contains("failed schema validation with 2 errors"));
        assert!(message.lines().count() >= 3);
    }

    #[test]
    fn test_never_panics_on_junk() {
        let validator = SchemaValidator::new();
        let junk = json!([1, "x", {"name": 3, "type": []}, null, {"fields": "no"}]);
        let report = validator.validate_fields("junk", junk.as_array().unwrap());
        assert!(!report.valid);
    }
}
