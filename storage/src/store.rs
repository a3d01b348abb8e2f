//! The host storage collaborator interface.
//!
//! The engine never owns persistence: it calls into whatever the host
//! provides through [`MetaStore`]. [`MemoryStore`] is the in-process
//! implementation used by tests, previews, and hosts without a backing
//! data layer of their own.

use std::collections::HashMap;

use serde_json::Value;

/// Host-provided storage for the three persistence scopes.
///
/// All calls are synchronous; the engine is single-threaded and
/// request-scoped by design.
pub trait MetaStore {
    /// Reads attached data for a content record.
    fn get_record_meta(&self, id: i64, key: &str) -> Option<Value>;
    /// Writes attached data for a content record.
    fn set_record_meta(&mut self, id: i64, key: &str, value: Value);
    /// Deletes attached data for a content record.
    fn delete_record_meta(&mut self, id: i64, key: &str);

    /// Reads attached data for a taxonomy term.
    fn get_term_meta(&self, id: i64, key: &str) -> Option<Value>;
    /// Writes attached data for a taxonomy term.
    fn set_term_meta(&mut self, id: i64, key: &str, value: Value);
    /// Deletes attached data for a taxonomy term.
    fn delete_term_meta(&mut self, id: i64, key: &str);

    /// Reads a named configuration value.
    fn get_option(&self, key: &str) -> Option<Value>;
    /// Writes a named configuration value.
    fn set_option(&mut self, key: &str, value: Value);
    /// Deletes a named configuration value.
    fn delete_option(&mut self, key: &str);
}

/// In-memory [`MetaStore`] backed by hash maps.
///
/// # Examples
///
/// ```
/// use formfield_storage::{MemoryStore, MetaStore};
/// use serde_json::json;
///
/// let mut store = MemoryStore::new();
/// store.set_record_meta(7, "sku", json!("abc-1"));
/// assert_eq!(store.get_record_meta(7, "sku"), Some(json!("abc-1")));
///
/// store.delete_record_meta(7, "sku");
/// assert_eq!(store.get_record_meta(7, "sku"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<(i64, String), Value>,
    terms: HashMap<(i64, String), Value>,
    options: HashMap<String, Value>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetaStore for MemoryStore {
    fn get_record_meta(&self, id: i64, key: &str) -> Option<Value> {
        self.records.get(&(id, key.to_string())).cloned()
    }

    fn set_record_meta(&mut self, id: i64, key: &str, value: Value) {
        self.records.insert((id, key.to_string()), value);
    }

    fn delete_record_meta(&mut self, id: i64, key: &str) {
        self.records.remove(&(id, key.to_string()));
    }

    fn get_term_meta(&self, id: i64, key: &str) -> Option<Value> {
        self.terms.get(&(id, key.to_string())).cloned()
    }

    fn set_term_meta(&mut self, id: i64, key: &str, value: Value) {
        self.terms.insert((id, key.to_string()), value);
    }

    fn delete_term_meta(&mut self, id: i64, key: &str) {
        self.terms.remove(&(id, key.to_string()));
    }

    fn get_option(&self, key: &str) -> Option<Value> {
        self.options.get(key).cloned()
    }

    fn set_option(&mut self, key: &str, value: Value) {
        self.options.insert(key.to_string(), value);
    }

    fn delete_option(&mut self, key: &str) {
        self.options.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scopes_are_independent() {
        let mut store = MemoryStore::new();
        store.set_record_meta(1, "color", json!("#ff0000"));
        store.set_term_meta(1, "color", json!("#00ff00"));
        store.set_option("color", json!("#0000ff"));

        assert_eq!(store.get_record_meta(1, "color"), Some(json!("#ff0000")));
        assert_eq!(store.get_term_meta(1, "color"), Some(json!("#00ff00")));
        assert_eq!(store.get_option("color"), Some(json!("#0000ff")));

        store.delete_term_meta(1, "color");
        assert_eq!(store.get_term_meta(1, "color"), None);
        assert!(store.get_record_meta(1, "color").is_some());
    }

    #[test]
    fn test_ids_are_independent() {
        let mut store = MemoryStore::new();
        store.set_record_meta(1, "sku", json!("a"));
        store.set_record_meta(2, "sku", json!("b"));
        assert_eq!(store.get_record_meta(1, "sku"), Some(json!("a")));
        assert_eq!(store.get_record_meta(2, "sku"), Some(json!("b")));
    }
}
