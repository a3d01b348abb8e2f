//! Per-field validation of submitted values.
//!
//! Validation never throws: it returns a [`ValidationResult`] carrying
//! every applicable failure. Rules run in a fixed order — required, then
//! length or numeric bounds, then pattern, then type-specific format — and
//! failures accumulate rather than short-circuiting. A truly empty value
//! only checks the required rule; structural checks are skipped for it.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::config::SelectOption;
use crate::field::Field;
use crate::kind::{DateSpec, FieldKind, NumberSpec, TextSpec};
use crate::value::{is_empty_value, value_to_f64, value_to_string};

/// Date format accepted by date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

struct FormatPatterns {
    email: Regex,
    url: Regex,
    hex_color: Regex,
}

impl FormatPatterns {
    fn new() -> Self {
        Self {
            email: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex must compile"),
            url: Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://\S+$")
                .expect("static regex must compile"),
            hex_color: Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$")
                .expect("static regex must compile"),
        }
    }
}

static PATTERNS: LazyLock<FormatPatterns> = LazyLock::new(FormatPatterns::new);

/// Outcome of validating one value against one field.
///
/// Always returned as data; `valid` is true exactly when `errors` is
/// empty.
///
/// # Examples
///
/// ```
/// use formfield_core::ValidationResult;
///
/// let ok = ValidationResult::ok();
/// assert!(ok.valid);
///
/// let failed = ValidationResult::from_errors(vec!["must be a number".into()]);
/// assert!(!failed.valid);
/// assert_eq!(failed.errors.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the value passed every applicable rule.
    pub valid: bool,
    /// Accumulated failure messages, rule order.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// A passing result.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Builds a result from accumulated messages; empty means valid.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn check_length(spec: &TextSpec, value: &str, errors: &mut Vec<String>) {
    let chars = value.chars().count() as u64;
    if let Some(min) = spec.min_length {
        if chars < min {
            errors.push(format!("must be at least {min} characters"));
        }
    }
    if let Some(max) = spec.max_length {
        if chars > max {
            errors.push(format!("must be at most {max} characters"));
        }
    }
    if let Some(pattern) = &spec.pattern {
        if !pattern.is_match(value) {
            errors.push("does not match the required pattern".to_string());
        }
    }
}

fn check_number(spec: &NumberSpec, value: &Value, errors: &mut Vec<String>) {
    let Some(number) = value_to_f64(value) else {
        errors.push("must be a number".to_string());
        return;
    };
    if let Some(min) = spec.min {
        if number < min {
            errors.push(format!("must be at least {min}"));
        }
    }
    if let Some(max) = spec.max {
        if number > max {
            errors.push(format!("must be at most {max}"));
        }
    }
}

fn check_date(spec: &DateSpec, value: &str, errors: &mut Vec<String>) {
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => {
            if let Some(min) = spec.min_date {
                if date < min {
                    errors.push(format!("must not be before {min}"));
                }
            }
            if let Some(max) = spec.max_date {
                if date > max {
                    errors.push(format!("must not be after {max}"));
                }
            }
        }
        Err(_) => errors.push("must be a valid date (YYYY-MM-DD)".to_string()),
    }
}

fn check_membership(options: &[SelectOption], value: &Value, errors: &mut Vec<String>) {
    let allowed: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
    let candidates: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(value_to_string).collect(),
        other => value_to_string(other).into_iter().collect(),
    };
    if candidates.is_empty() {
        errors.push("must be one of the allowed options".to_string());
        return;
    }
    for candidate in candidates {
        if !allowed.contains(&candidate.as_str()) {
            errors.push(format!("\"{candidate}\" is not an allowed option"));
        }
    }
}

fn validate_rows(children: &[Field], min_rows: u64, max_rows: u64, value: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let Value::Array(rows) = value else {
        errors.push("must be a list of rows".to_string());
        return errors;
    };

    let count = rows.len() as u64;
    if min_rows > 0 && count < min_rows {
        errors.push(format!("must have at least {min_rows} rows"));
    }
    if max_rows > 0 && count > max_rows {
        errors.push(format!("must have at most {max_rows} rows"));
    }

    for (index, row) in rows.iter().enumerate() {
        let cells = match row {
            Value::Object(cells) => cells,
            _ => {
                errors.push(format!("Row {}: must be a map of values", index + 1));
                continue;
            }
        };
        for child in children {
            let cell = cells.get(child.name()).cloned().unwrap_or(Value::Null);
            let result = child.validate(&cell);
            for message in result.errors {
                errors.push(format!("Row {}: {}: {}", index + 1, child.label(), message));
            }
        }
    }
    errors
}

/// Dispatches validation for one field.
pub(crate) fn validate_field(field: &Field, value: &Value) -> ValidationResult {
    // Containers hold no value; display-only markup validates trivially.
    match field.kind() {
        FieldKind::Group { .. }
        | FieldKind::Metabox { .. }
        | FieldKind::Tabs { .. }
        | FieldKind::Html { .. } => return ValidationResult::ok(),
        _ => {}
    }

    let mut errors = Vec::new();

    if is_empty_value(value) {
        if field.required() {
            errors.push("a value is required".to_string());
        }
        // Empty values skip the structural checks entirely.
        return ValidationResult::from_errors(errors);
    }

    match field.kind() {
        FieldKind::Text(spec) | FieldKind::Textarea(spec) | FieldKind::Password(spec) => {
            match value_to_string(value) {
                Some(s) => check_length(spec, &s, &mut errors),
                None => errors.push("must be text".to_string()),
            }
        }
        FieldKind::RichText => {
            if value_to_string(value).is_none() {
                errors.push("must be text".to_string());
            }
        }
        FieldKind::Number(spec) => check_number(spec, value, &mut errors),
        FieldKind::Email => match value_to_string(value) {
            Some(s) if PATTERNS.email.is_match(&s) => {}
            _ => errors.push("must be a valid email address".to_string()),
        },
        FieldKind::Url => match value_to_string(value) {
            Some(s) if PATTERNS.url.is_match(&s) => {}
            _ => errors.push("must be a valid URL".to_string()),
        },
        FieldKind::Date(spec) => match value_to_string(value) {
            Some(s) => check_date(spec, &s, &mut errors),
            None => errors.push("must be a valid date (YYYY-MM-DD)".to_string()),
        },
        FieldKind::Color => match value_to_string(value) {
            Some(s) if PATTERNS.hex_color.is_match(&s) => {}
            _ => errors.push("must be a hex color like #rrggbb".to_string()),
        },
        FieldKind::Select { options, .. } | FieldKind::Radio { options } => {
            check_membership(options, value, &mut errors);
        }
        FieldKind::Checkbox { options } => {
            if options.is_empty() {
                // Two-state marker: "1"/"0" and common truthy spellings
                // all pass; anything persists as one of the two states.
            } else {
                check_membership(options, value, &mut errors);
            }
        }
        FieldKind::File => {
            let id = match value {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            };
            if id.is_none() {
                errors.push("must be a media attachment id".to_string());
            }
        }
        FieldKind::Repeater {
            children,
            min_rows,
            max_rows,
            ..
        } => {
            errors.extend(validate_rows(children, *min_rows, *max_rows, value));
        }
        FieldKind::Group { .. }
        | FieldKind::Metabox { .. }
        | FieldKind::Tabs { .. }
        | FieldKind::Html { .. } => unreachable!("containers validated above"),
    }

    ValidationResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::FieldTypeRegistry;

    fn build(config: serde_json::Value) -> crate::Field {
        FieldTypeRegistry::default()
            .create(config.as_object().expect("object"))
            .expect("constructible")
    }

    fn validate(config: serde_json::Value, value: serde_json::Value) -> crate::ValidationResult {
        build(config).validate(&value)
    }

    #[test]
    fn test_required_and_empty() {
        let result = validate(json!({"name": "sku", "type": "text", "required": true}), json!(""));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["a value is required"]);

        let result = validate(json!({"name": "sku", "type": "text"}), json!(""));
        assert!(result.valid);
    }

    #[test]
    fn test_empty_skips_structural_checks() {
        // Empty but optional: the min_length rule must not fire.
        let result = validate(
            json!({"name": "sku", "type": "text", "min_length": 3}),
            json!(""),
        );
        assert!(result.valid);
    }

    #[test]
    fn test_failures_accumulate_in_rule_order() {
        let result = validate(
            json!({"name": "code", "type": "text", "max_length": 3, "pattern": "[a-z]+"}),
            json!("ABCD"),
        );
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec!["must be at most 3 characters", "does not match the required pattern"]
        );
    }

    #[test]
    fn test_number_bounds() {
        let config = json!({"name": "qty", "type": "number", "min": 1, "max": 10});
        assert!(validate(config.clone(), json!(5)).valid);
        assert!(validate(config.clone(), json!(1)).valid);
        assert!(validate(config.clone(), json!(10)).valid);
        assert!(!validate(config.clone(), json!(11)).valid);
        assert!(!validate(config, json!("abc")).valid);
    }

    #[test]
    fn test_email_and_url_shapes() {
        assert!(validate(json!({"name": "e", "type": "email"}), json!("a@b.co")).valid);
        assert!(!validate(json!({"name": "e", "type": "email"}), json!("a@b")).valid);
        assert!(validate(json!({"name": "u", "type": "url"}), json!("https://x.io/p")).valid);
        assert!(!validate(json!({"name": "u", "type": "url"}), json!("x.io/p")).valid);
    }

    #[test]
    fn test_date_must_be_calendar_valid() {
        let config = json!({"name": "d", "type": "date"});
        assert!(validate(config.clone(), json!("2025-02-28")).valid);
        // Lexically fine, not a real date.
        let result = validate(config, json!("2025-02-30"));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["must be a valid date (YYYY-MM-DD)"]);
    }

    #[test]
    fn test_date_range_bounds() {
        let config = json!({
            "name": "d",
            "type": "date",
            "min_date": "2025-01-01",
            "max_date": "2025-12-31",
        });
        assert!(validate(config.clone(), json!("2025-06-15")).valid);
        assert!(!validate(config.clone(), json!("2024-12-31")).valid);
        assert!(!validate(config, json!("2026-01-01")).valid);
    }

    #[test]
    fn test_unknown_option_is_an_error_here() {
        // Sanitize drops unknown keys silently; validate flags them.
        let config = json!({"name": "cur", "type": "select", "options": ["USD", "EUR"]});
        assert!(validate(config.clone(), json!("USD")).valid);
        let result = validate(config, json!("GBP"));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["\"GBP\" is not an allowed option"]);
    }

    #[test]
    fn test_color_format() {
        let config = json!({"name": "c", "type": "color"});
        assert!(validate(config.clone(), json!("#ff0000")).valid);
        assert!(validate(config.clone(), json!("#0af")).valid);
        assert!(!validate(config, json!("ff0000")).valid);
    }

    #[test]
    fn test_repeater_row_bounds_at_boundaries() {
        let config = json!({
            "name": "lines",
            "type": "repeater",
            "min_rows": 1,
            "max_rows": 2,
            "fields": [{"name": "sku", "type": "text"}],
        });
        let row = || json!({"sku": "a"});
        assert!(validate(config.clone(), json!([row()])).valid);
        assert!(validate(config.clone(), json!([row(), row()])).valid);
        let result = validate(config.clone(), json!([row(), row(), row()]));
        assert_eq!(result.errors, vec!["must have at most 2 rows"]);
        // Zero rows is "empty" and the repeater is not required, but the
        // empty-skip applies before row-count checks.
        assert!(validate(config, json!([])).valid);
    }

    #[test]
    fn test_repeater_cell_errors_are_row_prefixed() {
        let config = json!({
            "name": "lines",
            "type": "repeater",
            "fields": [
                {"name": "qty", "type": "number", "label": "Quantity", "required": true},
            ],
        });
        let result = validate(config, json!([{"qty": 2}, {"qty": "zz"}]));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Row 2: Quantity: must be a number"]);
    }

    #[test]
    fn test_min_length_and_pattern_on_text() {
        let config = json!({
            "name": "code",
            "type": "text",
            "min_length": 2,
            "pattern": "[a-z]+",
        });
        assert!(validate(config.clone(), json!("ab")).valid);
        let result = validate(config, json!("a"));
        assert_eq!(result.errors, vec!["must be at least 2 characters"]);
    }

    #[test]
    fn test_password_length_rules_apply() {
        let config = json!({"name": "pw", "type": "password", "min_length": 8});
        assert!(!validate(config.clone(), json!("short")).valid);
        assert!(validate(config, json!("long enough")).valid);
    }

    #[test]
    fn test_file_requires_attachment_id() {
        let config = json!({"name": "cover", "type": "file"});
        assert!(validate(config.clone(), json!(17)).valid);
        assert!(validate(config.clone(), json!("17")).valid);
        let result = validate(config, json!("cover.png"));
        assert_eq!(result.errors, vec!["must be a media attachment id"]);
    }

    #[test]
    fn test_multi_value_membership_flags_each_unknown() {
        let config = json!({
            "name": "tags",
            "type": "checkbox",
            "options": ["new", "sale"],
        });
        let result = validate(config, json!(["new", "old", "broken"]));
        assert_eq!(
            result.errors,
            vec![
                "\"old\" is not an allowed option",
                "\"broken\" is not an allowed option",
            ]
        );
    }

    #[test]
    fn test_containers_always_validate() {
        let config = json!({
            "name": "g",
            "type": "group",
            "required": true,
            "fields": [{"name": "a", "type": "text"}],
        });
        assert!(validate(config, json!(null)).valid);
    }
}
