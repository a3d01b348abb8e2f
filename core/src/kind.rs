//! The closed set of field kinds.
//!
//! Every field is one of these variants; sanitize, validate, render, and
//! flatten all dispatch on [`FieldKind`] with exhaustive matches. There is
//! no open-ended type inspection anywhere — registering a custom type tag
//! means registering a constructor that produces one of these kinds.

use chrono::NaiveDate;
use regex::Regex;

use crate::config::SelectOption;
use crate::field::Field;

/// Every type tag the engine recognizes, in a fixed order.
///
/// This is the closed set the schema validator checks raw configuration
/// against. The first fourteen are leaf kinds, the last four are
/// containers.
pub const TYPE_TAGS: [&str; 18] = [
    "text", "textarea", "rich_text", "number", "email", "url", "date", "password", "color",
    "select", "checkbox", "radio", "file", "html", "group", "metabox", "tabs", "repeater",
];

/// Length and pattern constraints shared by the text-like kinds.
#[derive(Debug, Clone, Default)]
pub struct TextSpec {
    /// Minimum length in characters.
    pub min_length: Option<u64>,
    /// Maximum length in characters.
    pub max_length: Option<u64>,
    /// Full-match pattern the value must satisfy.
    pub pattern: Option<Regex>,
}

/// Numeric range constraints.
#[derive(Debug, Clone, Default)]
pub struct NumberSpec {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
}

/// Calendar bounds for date fields.
#[derive(Debug, Clone, Default)]
pub struct DateSpec {
    /// Earliest accepted date.
    pub min_date: Option<NaiveDate>,
    /// Latest accepted date.
    pub max_date: Option<NaiveDate>,
}

/// Placement region of a metabox. Presentational metadata for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetaboxContext {
    /// Main column.
    #[default]
    Normal,
    /// Sidebar.
    Side,
    /// Below the main editor.
    Advanced,
}

impl MetaboxContext {
    /// Parses the configuration tag; unknown tags return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "normal" => Some(Self::Normal),
            "side" => Some(Self::Side),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    /// The configuration tag for this region.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Side => "side",
            Self::Advanced => "advanced",
        }
    }
}

/// Display priority of a metabox within its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetaboxPriority {
    /// Shown first.
    High,
    /// Host-default ordering.
    #[default]
    Default,
    /// Shown last.
    Low,
}

impl MetaboxPriority {
    /// Parses the configuration tag; unknown tags return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "high" => Some(Self::High),
            "default" => Some(Self::Default),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// The configuration tag for this priority.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Default => "default",
            Self::Low => "low",
        }
    }
}

/// Layout direction of a tab strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabOrientation {
    /// Tabs across the top.
    #[default]
    Horizontal,
    /// Tabs down the side.
    Vertical,
}

impl TabOrientation {
    /// Parses the configuration tag; unknown tags return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            _ => None,
        }
    }

    /// The configuration tag for this orientation.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// One panel of a tabs container.
///
/// Tab state is pure presentation: exactly one tab renders active, the
/// default being the first unless overridden, and nothing about the active
/// tab is ever persisted.
#[derive(Debug, Clone)]
pub struct Tab {
    /// Stable identifier used for markup ids and the `default_tab` key.
    pub id: String,
    /// Label shown in the tab strip.
    pub label: String,
    /// Optional icon class.
    pub icon: Option<String>,
    /// Optional description rendered inside the panel.
    pub description: Option<String>,
    /// Fields owned by this panel, declaration order.
    pub children: Vec<Field>,
}

/// The closed tagged union of field kinds.
///
/// Containers own their constructed children; only [`Repeater`]
/// (`FieldKind::Repeater`) among them stores a value of its own — an
/// ordered list of rows replicated from its template children.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Single-line text.
    Text(TextSpec),
    /// Multi-line text.
    Textarea(TextSpec),
    /// Markup-preserving text (script and style blocks are stripped).
    RichText,
    /// Integer or float, by presence of a decimal point.
    Number(NumberSpec),
    /// Email address.
    Email,
    /// URL.
    Url,
    /// `YYYY-MM-DD` calendar date.
    Date(DateSpec),
    /// Opaque secret; sanitization preserves every character.
    Password(TextSpec),
    /// `#RRGGBB` / `#RGB` hex color.
    Color,
    /// Closed option set, single or multiple.
    Select {
        /// Declared options, declaration order.
        options: Vec<SelectOption>,
        /// Whether multiple values may be selected.
        multiple: bool,
    },
    /// Two-state marker when `options` is empty, otherwise a multi-option
    /// set of retained keys.
    Checkbox {
        /// Declared options; empty means a single on/off checkbox.
        options: Vec<SelectOption>,
    },
    /// Closed option set, exactly one value.
    Radio {
        /// Declared options, declaration order.
        options: Vec<SelectOption>,
    },
    /// Media attachment id.
    File,
    /// Display-only markup; never stores a value.
    Html {
        /// Markup emitted verbatim at render time.
        content: String,
    },
    /// Flat section of fields.
    Group {
        /// Direct children, declaration order.
        children: Vec<Field>,
    },
    /// Boxed region with host placement metadata.
    Metabox {
        /// Direct children, declaration order.
        children: Vec<Field>,
        /// Placement region.
        context: MetaboxContext,
        /// Placement priority.
        priority: MetaboxPriority,
    },
    /// Mutually exclusive sub-panels.
    Tabs {
        /// Panels, declaration order.
        tabs: Vec<Tab>,
        /// Strip layout.
        orientation: TabOrientation,
        /// Tab id active on first render; first tab when absent.
        default_tab: Option<String>,
    },
    /// Variable-length list of rows stamped from a template.
    Repeater {
        /// Row template children, declaration order.
        children: Vec<Field>,
        /// Minimum row count (0 = unbounded).
        min_rows: u64,
        /// Maximum row count (0 = unbounded).
        max_rows: u64,
        /// Label for the add-row control.
        add_label: Option<String>,
    },
}

impl FieldKind {
    /// The configuration tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Text(_) => "text",
            FieldKind::Textarea(_) => "textarea",
            FieldKind::RichText => "rich_text",
            FieldKind::Number(_) => "number",
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Date(_) => "date",
            FieldKind::Password(_) => "password",
            FieldKind::Color => "color",
            FieldKind::Select { .. } => "select",
            FieldKind::Checkbox { .. } => "checkbox",
            FieldKind::Radio { .. } => "radio",
            FieldKind::File => "file",
            FieldKind::Html { .. } => "html",
            FieldKind::Group { .. } => "group",
            FieldKind::Metabox { .. } => "metabox",
            FieldKind::Tabs { .. } => "tabs",
            FieldKind::Repeater { .. } => "repeater",
        }
    }

    /// Whether this kind composes other fields.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            FieldKind::Group { .. }
                | FieldKind::Metabox { .. }
                | FieldKind::Tabs { .. }
                | FieldKind::Repeater { .. }
        )
    }

    /// Whether this kind persists a value of its own.
    ///
    /// Containers store nothing — except the repeater, which stores its
    /// full row list. Display-only markup stores nothing either.
    pub fn stores_value(&self) -> bool {
        match self {
            FieldKind::Html { .. }
            | FieldKind::Group { .. }
            | FieldKind::Metabox { .. }
            | FieldKind::Tabs { .. } => false,
            FieldKind::Repeater { .. } => true,
            _ => true,
        }
    }
}
