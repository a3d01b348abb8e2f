//! Settings-page walkthrough.
//!
//! Shows the settings key derivations (page prefix vs the per-field
//! helper), default fallback in the read API, and a tabbed layout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p formfield-storage --example settings_page
//! ```

use formfield_core::{ContextKind, ContextToken};
use formfield_storage::{
    Engine, MemoryStore, MetaStore, RegistrationDoc, StorageAdapter, StorageContext,
};
use serde_json::json;

fn main() {
    let doc = RegistrationDoc::from_json_str(
        r#"{
            "settings_pages": [{"id": "shop", "fields": [
                {"name": "currency", "type": "select",
                 "options": [
                    {"value": "USD", "label": "US Dollar"},
                    {"value": "EUR", "label": "Euro"}
                 ],
                 "default": "USD"},
                {"name": "keys", "type": "group", "label": "API keys", "fields": [
                    {"name": "api_key", "type": "password", "use_name_prefix": false}
                ]},
                {"name": "panels", "type": "tabs", "orientation": "vertical", "tabs": [
                    {"id": "email", "label": "Email", "fields": [
                        {"name": "sender", "type": "email"}
                    ]},
                    {"id": "legal", "label": "Legal", "fields": [
                        {"name": "terms_url", "type": "url"}
                    ]}
                ]}
            ]}]
        }"#,
    )
    .expect("document parses");

    let mut engine = Engine::new();
    engine
        .register_document(&doc)
        .expect("document passes schema validation");

    let mut adapter = StorageAdapter::new(MemoryStore::new());
    let ctx = StorageContext::Settings("shop".to_string());

    println!("=== Defaults before anything is saved ===");
    println!(
        "  currency = {}",
        engine.get_field("currency", &ctx, &adapter, json!("USD"))
    );

    let submitted = json!({
        "currency": "EUR",
        "api_key": "s3cret",
        "sender": "Shop@Example.com",
        "terms_url": "https://example.com/terms",
    });
    let report = engine
        .save(
            ContextKind::Settings,
            "shop",
            &ctx,
            submitted.as_object().unwrap(),
            &mut adapter,
            None,
        )
        .expect("no nonce guard configured");
    println!("\n=== Saved ===\n  {:?}", report.saved);

    println!("\n=== Where values actually landed ===");
    for key in ["shop_currency", "api_key", "shop_sender", "shop_terms_url"] {
        println!("  {key} = {:?}", adapter.store().get_option(key));
    }

    println!("\n=== Rendered page ===");
    let html = engine.render(
        ContextKind::Settings,
        "shop",
        &ContextToken::Settings("shop".to_string()),
        &adapter,
    );
    println!("{html}");
}
