//! Record-type quickstart.
//!
//! Registers a small product form, runs a failing and a passing save
//! through the pipeline, and reads the stored values back.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p formfield-storage --example quickstart
//! ```

use formfield_core::{ContextKind, ContextToken};
use formfield_storage::{Engine, MemoryStore, RegistrationDoc, StorageAdapter, StorageContext};
use serde_json::json;

fn main() {
    let doc = RegistrationDoc::from_json_str(
        r##"{
            "cpts": [{"id": "product", "fields": [
                {"name": "sku", "type": "text", "label": "SKU", "required": true,
                 "pattern": "[a-z0-9-]+"},
                {"name": "details", "type": "group", "label": "Details", "fields": [
                    {"name": "weight", "type": "number", "min": 0},
                    {"name": "accent", "type": "color", "default": "#000000"}
                ]},
                {"name": "featured", "type": "checkbox"}
            ]}]
        }"##,
    )
    .expect("document parses");

    let mut engine = Engine::new();
    engine
        .register_document(&doc)
        .expect("document passes schema validation");

    println!("=== Flattened registry ===");
    for field in engine.registry().fields(ContextKind::Record, "product") {
        let nested = engine
            .registry()
            .is_nested(ContextKind::Record, "product", field.name());
        println!(
            "  {:<10} {:<8} nested={}",
            field.name(),
            field.type_tag(),
            nested
        );
    }

    let mut adapter = StorageAdapter::new(MemoryStore::new());
    let ctx = StorageContext::Record(42);

    println!("\n=== Save with a validation failure ===");
    let submitted = json!({
        "sku": "NOT VALID",
        "weight": "1.5",
        "accent": "ff0000",
        "_featured_submitted": "1",
    });
    let report = engine
        .save(
            ContextKind::Record,
            "product",
            &ctx,
            submitted.as_object().unwrap(),
            &mut adapter,
            None,
        )
        .expect("no nonce guard configured");
    for error in &report.errors {
        println!("  {}: {}", error.label, error.messages.join(", "));
    }
    println!("  saved anyway: {:?}", report.saved);

    println!("\n=== Save a corrected submission ===");
    let submitted = json!({
        "sku": "abc-1",
        "weight": "1.5",
        "accent": "ff0000",
        "featured": "1",
        "_featured_submitted": "1",
    });
    let report = engine
        .save(
            ContextKind::Record,
            "product",
            &ctx,
            submitted.as_object().unwrap(),
            &mut adapter,
            None,
        )
        .expect("no nonce guard configured");
    println!("  ok={} saved={:?}", report.is_ok(), report.saved);

    println!("\n=== Read back ===");
    for name in ["sku", "weight", "accent", "featured"] {
        println!(
            "  {name} = {}",
            engine.get_field(name, &ctx, &adapter, json!(null))
        );
    }

    println!("\n=== Rendered form (stored values resolved) ===");
    let html = engine.render(
        ContextKind::Record,
        "product",
        &ContextToken::Record(42),
        &adapter,
    );
    println!("{html}");
}
