use std::fs;
use std::path::PathBuf;
use std::process::Output;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("formfield_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn write_document(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write document");
    path
}

fn run(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_formfield"))
        .args(args)
        .output()
        .expect("failed to run formfield")
}

const GOOD_DOC: &str = r#"{
    "cpts": [{"id": "product", "fields": [
        {"name": "sku", "type": "text", "required": true},
        {"name": "details", "type": "group", "fields": [
            {"name": "weight", "type": "number", "min": 0}
        ]}
    ]}],
    "settings_pages": [{"id": "shop", "fields": [
        {"name": "currency", "type": "select", "options": ["USD", "EUR"], "default": "USD"}
    ]}]
}"#;

const BAD_DOC: &str = r#"{
    "cpts": [{"id": "product", "fields": [
        {"name": "Invalid-Name!", "type": "select"}
    ]}]
}"#;

// ---------------------------------------------------------------------------
// Validate tests
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_a_well_formed_document() {
    let dir = TempDir::new("validate_ok");
    let path = write_document(&dir, "fields.json", GOOD_DOC);

    let output = run(&["validate", path.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("OK"));
}

#[test]
fn validate_rejects_structural_defects_with_exit_one() {
    let dir = TempDir::new("validate_bad");
    let path = write_document(&dir, "fields.json", BAD_DOC);

    let output = run(&["validate", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name"));
    assert!(stdout.contains("options"));
}

#[test]
fn validate_walks_directories() {
    let dir = TempDir::new("validate_dir");
    write_document(&dir, "good.json", GOOD_DOC);
    write_document(&dir, "bad.json", BAD_DOC);
    write_document(&dir, "ignored.txt", "not a document");

    let output = run(&["validate", dir.path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("good.json"));
    assert!(stdout.contains("bad.json"));
}

#[test]
fn validate_reports_unreadable_files() {
    let output = run(&["validate", "/nonexistent/fields.json"]);
    assert_eq!(output.status.code(), Some(1));
}

// ---------------------------------------------------------------------------
// Inspect tests
// ---------------------------------------------------------------------------

#[test]
fn inspect_lists_flattened_fields_with_nested_markers() {
    let dir = TempDir::new("inspect");
    let path = write_document(&dir, "fields.json", GOOD_DOC);

    let output = run(&["inspect", path.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("record type product"));
    assert!(stdout.contains("settings page shop"));
    assert!(stdout.contains("sku"));
    // The group child appears in the flat table, marked nested.
    assert!(stdout.contains("weight"));
    assert!(stdout.contains("(nested)"));
}

#[test]
fn inspect_rejects_invalid_documents() {
    let dir = TempDir::new("inspect_bad");
    let path = write_document(&dir, "fields.json", BAD_DOC);

    let output = run(&["inspect", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
}

// ---------------------------------------------------------------------------
// Render tests
// ---------------------------------------------------------------------------

#[test]
fn render_settings_page_uses_defaults() {
    let dir = TempDir::new("render_page");
    let path = write_document(&dir, "fields.json", GOOD_DOC);

    let output = run(&["render", path.to_str().unwrap(), "--page", "shop"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<select"));
    assert!(stdout.contains("<option value=\"USD\" selected>USD</option>"));
}

#[test]
fn render_record_type_renders_containers() {
    let dir = TempDir::new("render_cpt");
    let path = write_document(&dir, "fields.json", GOOD_DOC);

    let output = run(&[
        "render",
        path.to_str().unwrap(),
        "--cpt",
        "product",
        "--record",
        "7",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ff-group"));
    assert!(stdout.contains("name=\"weight\""));
}

#[test]
fn render_requires_a_target() {
    let dir = TempDir::new("render_no_target");
    let path = write_document(&dir, "fields.json", GOOD_DOC);

    let output = run(&["render", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn render_unknown_namespace_fails() {
    let dir = TempDir::new("render_unknown");
    let path = write_document(&dir, "fields.json", GOOD_DOC);

    let output = run(&["render", path.to_str().unwrap(), "--page", "missing"]);
    assert_eq!(output.status.code(), Some(1));
}
