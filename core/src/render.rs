//! Markup rendering for fields and container trees.
//!
//! Leaves render from a current value; containers render from a
//! [`ContextToken`], resolving each leaf child's value through a
//! [`ValueSource`] and passing the token through unchanged to container
//! children. Containers never resolve a value for themselves — the
//! repeater being the one exception, since it stores its own row list.
//!
//! The settings-page key derivation is not uniform in this engine: a
//! group resolves its children through the per-field derivation helper
//! ([`KeyStyle::FieldPreference`]), while metaboxes and tabs use the raw
//! page-prefix concatenation ([`KeyStyle::Concat`]). See the storage
//! adapter for the two derivations.

use serde_json::Value;

use crate::context::ContextToken;
use crate::field::Field;
use crate::kind::{FieldKind, TabOrientation};
use crate::value::value_to_string;

/// Which settings-page key derivation a resolver should apply.
///
/// Irrelevant for record and term contexts, where the field name is the
/// storage key verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// Raw `page_id + "_" + field_name` concatenation.
    Concat,
    /// Per-field derivation helper honoring the field's `use_name_prefix`
    /// configuration flag.
    FieldPreference,
}

/// Resolves a field's current persisted value during rendering.
pub trait ValueSource {
    /// Returns the stored value for `field` under `ctx`, or `None` when
    /// nothing usable is stored.
    fn resolve(&self, field: &Field, ctx: &ContextToken, style: KeyStyle) -> Option<Value>;
}

fn esc(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn esc_attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

fn control_id(name_attr: &str) -> String {
    let mut id = String::with_capacity(name_attr.len());
    for c in name_attr.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            id.push(c);
        } else {
            id.push('-');
        }
    }
    format!("ff-{id}")
}

fn common_attrs(field: &Field) -> String {
    let mut attrs = String::new();
    if let Some(placeholder) = field.config().str_key("placeholder") {
        attrs.push_str(&format!(" placeholder=\"{}\"", esc_attr(placeholder)));
    }
    if field.config().flag("disabled") {
        attrs.push_str(" disabled");
    }
    if field.config().flag("readonly") {
        attrs.push_str(" readonly");
    }
    if field.required() {
        attrs.push_str(" required");
    }
    attrs
}

fn input_class(field: &Field) -> String {
    match field.config().str_key("class") {
        Some(class) => format!("ff-input {}", esc_attr(class)),
        None => "ff-input".to_string(),
    }
}

fn scalar(value: &Value) -> String {
    value_to_string(value).unwrap_or_default()
}

fn input_control(field: &Field, input_type: &str, value: &str, name_attr: &str) -> String {
    format!(
        "<input type=\"{input_type}\" id=\"{id}\" name=\"{name}\" value=\"{value}\" class=\"{class}\"{attrs}>",
        id = control_id(name_attr),
        name = esc_attr(name_attr),
        value = esc_attr(value),
        class = input_class(field),
        attrs = common_attrs(field),
    )
}

fn selected_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_to_string).collect(),
        other => value_to_string(other).into_iter().collect(),
    }
}

fn render_control(field: &Field, value: &Value, name_attr: &str) -> String {
    match field.kind() {
        FieldKind::Text(_) => input_control(field, "text", &scalar(value), name_attr),
        FieldKind::Number(_) => input_control(field, "number", &scalar(value), name_attr),
        FieldKind::Email => input_control(field, "email", &scalar(value), name_attr),
        FieldKind::Url => input_control(field, "url", &scalar(value), name_attr),
        FieldKind::Date(_) => input_control(field, "date", &scalar(value), name_attr),
        FieldKind::Color => input_control(field, "color", &scalar(value), name_attr),
        // Stored ids, not browser file uploads; the host media picker
        // fills this in.
        FieldKind::File => input_control(field, "number", &scalar(value), name_attr),
        // A previous secret is never echoed back into markup.
        FieldKind::Password(_) => input_control(field, "password", "", name_attr),
        FieldKind::Textarea(_) | FieldKind::RichText => {
            let rows = field.config().u64_key("rows").unwrap_or(5);
            format!(
                "<textarea id=\"{id}\" name=\"{name}\" rows=\"{rows}\" class=\"{class}\"{attrs}>{value}</textarea>",
                id = control_id(name_attr),
                name = esc_attr(name_attr),
                class = input_class(field),
                attrs = common_attrs(field),
                value = esc(&scalar(value)),
            )
        }
        FieldKind::Select { options, multiple } => {
            let selected = selected_values(value);
            let mut out = format!(
                "<select id=\"{id}\" name=\"{name}\" class=\"{class}\"{multiple}{attrs}>",
                id = control_id(name_attr),
                name = esc_attr(name_attr),
                class = input_class(field),
                multiple = if *multiple { " multiple" } else { "" },
                attrs = common_attrs(field),
            );
            for option in options {
                let marker = if selected.contains(&option.value) {
                    " selected"
                } else {
                    ""
                };
                out.push_str(&format!(
                    "<option value=\"{}\"{marker}>{}</option>",
                    esc_attr(&option.value),
                    esc(&option.label),
                ));
            }
            out.push_str("</select>");
            out
        }
        FieldKind::Radio { options } => {
            let selected = scalar(value);
            let mut out = String::new();
            for option in options {
                let marker = if option.value == selected { " checked" } else { "" };
                out.push_str(&format!(
                    "<label class=\"ff-radio\"><input type=\"radio\" name=\"{name}\" value=\"{value}\"{marker}{attrs}> {label}</label>",
                    name = esc_attr(name_attr),
                    value = esc_attr(&option.value),
                    attrs = common_attrs(field),
                    label = esc(&option.label),
                ));
            }
            out
        }
        FieldKind::Checkbox { options } if options.is_empty() => {
            let marker = if scalar(value) == "1" { " checked" } else { "" };
            // The hidden companion makes an unchecked box distinguishable
            // from a form that never carried the field.
            format!(
                "<input type=\"hidden\" name=\"_{name}_submitted\" value=\"1\">\
                 <input type=\"checkbox\" id=\"{id}\" name=\"{name}\" value=\"1\"{marker}{attrs}>",
                id = control_id(name_attr),
                name = esc_attr(name_attr),
                attrs = common_attrs(field),
            )
        }
        FieldKind::Checkbox { options } => {
            let selected = selected_values(value);
            let mut out = String::new();
            for option in options {
                let marker = if selected.contains(&option.value) {
                    " checked"
                } else {
                    ""
                };
                out.push_str(&format!(
                    "<label class=\"ff-checkbox\"><input type=\"checkbox\" name=\"{name}[]\" value=\"{value}\"{marker}{attrs}> {label}</label>",
                    name = esc_attr(name_attr),
                    value = esc_attr(&option.value),
                    attrs = common_attrs(field),
                    label = esc(&option.label),
                ));
            }
            out
        }
        FieldKind::Html { content } => content.clone(),
        // Containers have no control; their wrapper comes from the tree
        // renderer.
        FieldKind::Group { .. }
        | FieldKind::Metabox { .. }
        | FieldKind::Tabs { .. }
        | FieldKind::Repeater { .. } => String::new(),
    }
}

fn wrapper_open(field: &Field) -> String {
    let mut classes = format!("ff-field ff-field-{}", field.type_tag());
    if let Some(extra) = field.config().str_key("wrapper_class") {
        classes.push(' ');
        classes.push_str(&esc_attr(extra));
    }
    format!("<div class=\"{classes}\">")
}

fn description_html(field: &Field) -> String {
    match field.description() {
        Some(text) => format!("<p class=\"ff-description\">{}</p>", esc(text)),
        None => String::new(),
    }
}

pub(crate) fn render_leaf_named(field: &Field, value: &Value, name_attr: &str) -> String {
    // Display-only markup carries no label or description chrome.
    if let FieldKind::Html { .. } = field.kind() {
        return format!(
            "{}{}</div>",
            wrapper_open(field),
            render_control(field, value, name_attr)
        );
    }
    format!(
        "{open}<label for=\"{id}\">{label}</label>{control}{description}</div>",
        open = wrapper_open(field),
        id = control_id(name_attr),
        label = esc(field.label()),
        control = render_control(field, value, name_attr),
        description = description_html(field),
    )
}

pub(crate) fn render_leaf(field: &Field, value: &Value) -> String {
    render_leaf_named(field, value, field.name())
}

fn resolve_or_default(
    field: &Field,
    ctx: &ContextToken,
    source: &dyn ValueSource,
    style: KeyStyle,
) -> Value {
    source
        .resolve(field, ctx, style)
        .or_else(|| field.default_value().cloned())
        .unwrap_or(Value::Null)
}

fn render_children(
    children: &[Field],
    ctx: &ContextToken,
    source: &dyn ValueSource,
    style: KeyStyle,
) -> String {
    let mut out = String::new();
    for child in children {
        if child.is_container() {
            out.push_str(&render_tree(child, ctx, source));
        } else {
            let value = resolve_or_default(child, ctx, source, style);
            out.push_str(&render_leaf(child, &value));
        }
    }
    out
}

fn render_repeater_rows(
    field: &Field,
    children: &[Field],
    add_label: Option<&str>,
    ctx: &ContextToken,
    source: &dyn ValueSource,
) -> String {
    let rows = match resolve_or_default(field, ctx, source, KeyStyle::Concat) {
        Value::Array(rows) => rows,
        _ => Vec::new(),
    };
    let mut out = String::new();
    for (index, row) in rows.iter().enumerate() {
        out.push_str(&format!("<fieldset class=\"ff-repeater-row\" data-row=\"{index}\">"));
        let cells = row.as_object();
        for child in children {
            let cell = cells
                .and_then(|c| c.get(child.name()))
                .cloned()
                .unwrap_or(Value::Null);
            let name_attr = format!("{}[{}][{}]", field.name(), index, child.name());
            out.push_str(&render_leaf_named(child, &cell, &name_attr));
        }
        out.push_str("</fieldset>");
    }
    out.push_str(&format!(
        "<button type=\"button\" class=\"ff-repeater-add\">{}</button>",
        esc(add_label.unwrap_or("Add row")),
    ));
    out
}

pub(crate) fn render_tree(field: &Field, ctx: &ContextToken, source: &dyn ValueSource) -> String {
    match field.kind() {
        FieldKind::Group { children } => format!(
            "<section class=\"ff-group\"><h3>{}</h3>{}</section>",
            esc(field.label()),
            render_children(children, ctx, source, KeyStyle::FieldPreference),
        ),
        FieldKind::Metabox {
            children,
            context,
            priority,
        } => format!(
            "<div class=\"ff-metabox\" data-context=\"{}\" data-priority=\"{}\"><h2>{}</h2>{}</div>",
            context.as_tag(),
            priority.as_tag(),
            esc(field.label()),
            render_children(children, ctx, source, KeyStyle::Concat),
        ),
        FieldKind::Tabs {
            tabs,
            orientation,
            default_tab,
        } => {
            let active_id = default_tab
                .as_deref()
                .filter(|id| tabs.iter().any(|tab| tab.id == *id))
                .or_else(|| tabs.first().map(|tab| tab.id.as_str()));
            let orientation_class = match orientation {
                TabOrientation::Horizontal => "ff-tabs-horizontal",
                TabOrientation::Vertical => "ff-tabs-vertical",
            };
            let mut nav = String::new();
            let mut panels = String::new();
            for tab in tabs {
                let active = Some(tab.id.as_str()) == active_id;
                let marker = if active { " ff-tab-active" } else { "" };
                let icon = tab
                    .icon
                    .as_deref()
                    .map(|icon| format!("<span class=\"ff-tab-icon {}\"></span>", esc_attr(icon)))
                    .unwrap_or_default();
                nav.push_str(&format!(
                    "<li class=\"ff-tab{marker}\" data-tab=\"{}\">{icon}{}</li>",
                    esc_attr(&tab.id),
                    esc(&tab.label),
                ));
                let description = tab
                    .description
                    .as_deref()
                    .map(|text| format!("<p class=\"ff-description\">{}</p>", esc(text)))
                    .unwrap_or_default();
                panels.push_str(&format!(
                    "<div class=\"ff-tab-panel{marker}\" data-tab=\"{}\">{description}{}</div>",
                    esc_attr(&tab.id),
                    render_children(&tab.children, ctx, source, KeyStyle::Concat),
                ));
            }
            format!(
                "<div class=\"ff-tabs {orientation_class}\"><ul class=\"ff-tab-nav\">{nav}</ul>{panels}</div>"
            )
        }
        FieldKind::Repeater {
            children,
            add_label,
            ..
        } => format!(
            "<div class=\"ff-repeater\" data-name=\"{}\"><h3>{}</h3>{}</div>",
            esc_attr(field.name()),
            esc(field.label()),
            render_repeater_rows(field, children, add_label.as_deref(), ctx, source),
        ),
        // A leaf rendered through the tree path resolves its own value.
        _ => {
            let value = resolve_or_default(field, ctx, source, KeyStyle::Concat);
            render_leaf(field, &value)
        }
    }
}
