//! The top-level registration document.
//!
//! Hosts describe everything they register — content record types,
//! taxonomies, settings pages, and the fields attached to each — in one
//! document, loadable from JSON or YAML.
//!
//! ```json
//! {
//!   "cpts": [
//!     {"id": "product", "fields": [
//!       {"name": "sku", "type": "text", "required": true}
//!     ]}
//!   ],
//!   "taxonomies": [
//!     {"id": "brand", "object_type": "product", "fields": []}
//!   ],
//!   "settings_pages": [
//!     {"id": "shop", "fields": [
//!       {"name": "currency", "type": "select", "options": ["USD", "EUR"]}
//!     ]}
//!   ]
//! }
//! ```

use std::io::BufReader;
use std::path::Path;

use formfield_core::{ContextKind, SchemaReport, SchemaValidator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StorageError};

/// One registered record type, taxonomy, or settings page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationEntry {
    /// Namespace identifier (record type slug, taxonomy slug, or settings
    /// page id).
    pub id: String,
    /// Opaque host registration arguments, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    /// For taxonomies: the record type they attach to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    /// Raw field configuration nodes, declaration order.
    #[serde(default)]
    pub fields: Vec<Value>,
}

/// The whole registration document.
///
/// # Examples
///
/// ```
/// use formfield_storage::RegistrationDoc;
///
/// let doc = RegistrationDoc::from_json_str(r#"{
///     "cpts": [{"id": "product", "fields": [
///         {"name": "sku", "type": "text"}
///     ]}]
/// }"#).unwrap();
///
/// assert_eq!(doc.cpts.len(), 1);
/// assert!(doc.taxonomies.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationDoc {
    /// Content record types.
    #[serde(default)]
    pub cpts: Vec<RegistrationEntry>,
    /// Taxonomies.
    #[serde(default)]
    pub taxonomies: Vec<RegistrationEntry>,
    /// Settings pages.
    #[serde(default)]
    pub settings_pages: Vec<RegistrationEntry>,
}

impl RegistrationDoc {
    /// Parses a document from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Loads a document from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads a document from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Loads a document, choosing the parser by file extension.
    ///
    /// # Errors
    ///
    /// [`StorageError::UnsupportedFormat`] for extensions other than
    /// `json`, `yaml`, and `yml`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match extension {
            "json" => Self::from_json_file(path),
            "yaml" | "yml" => Self::from_yaml_file(path),
            other => Err(StorageError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Every entry with its context kind and document section name.
    pub fn entries(&self) -> impl Iterator<Item = (ContextKind, &RegistrationEntry)> {
        self.cpts
            .iter()
            .map(|entry| (ContextKind::Record, entry))
            .chain(self.taxonomies.iter().map(|entry| (ContextKind::Term, entry)))
            .chain(
                self.settings_pages
                    .iter()
                    .map(|entry| (ContextKind::Settings, entry)),
            )
    }

    /// Whether the document registers nothing at all.
    pub fn is_empty(&self) -> bool {
        self.cpts.is_empty() && self.taxonomies.is_empty() && self.settings_pages.is_empty()
    }

    /// Structurally validates every field configuration in the document.
    ///
    /// Errors are path-qualified by section, e.g.
    /// `cpts[0].fields[2]: select requires a non-empty options list`.
    pub fn validate(&self, validator: &SchemaValidator) -> SchemaReport {
        let mut report = SchemaReport::ok();
        let sections: [(&str, &[RegistrationEntry]); 3] = [
            ("cpts", &self.cpts),
            ("taxonomies", &self.taxonomies),
            ("settings_pages", &self.settings_pages),
        ];
        for (section, entries) in sections {
            for (index, entry) in entries.iter().enumerate() {
                if entry.id.trim().is_empty() {
                    report.merge(SchemaReport::from_errors(vec![format!(
                        "{section}[{index}]: id must not be empty"
                    )]));
                }
                let prefix = format!("{section}[{index}].fields");
                report.merge(validator.validate_fields(&prefix, &entry.fields));
            }
        }
        report
    }
}
