use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use formfield_core::{ContextKind, ContextToken, SchemaValidator};
use formfield_storage::{Engine, MemoryStore, RegistrationDoc, StorageAdapter};

#[derive(Debug, Parser)]
#[command(name = "formfield")]
#[command(about = "Validate, inspect, and preview field configuration documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Schema-validate one or more registration documents (JSON or YAML).
    Validate(ValidateArgs),
    /// Print every namespace's flattened field table.
    Inspect(InspectArgs),
    /// Render a namespace's markup to stdout with an empty store.
    Render(RenderArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Document files and/or directories containing documents.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Registration document to inspect.
    file: PathBuf,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Registration document to render from.
    file: PathBuf,
    /// Settings page id to render.
    #[arg(long, conflicts_with_all = ["cpt", "record"])]
    page: Option<String>,
    /// Record type id to render.
    #[arg(long)]
    cpt: Option<String>,
    /// Record id used as the render context (default 0).
    #[arg(long, default_value_t = 0)]
    record: i64,
}

fn document_paths(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let entries = match std::fs::read_dir(input) {
                Ok(entries) => entries,
                Err(_) => {
                    paths.push(input.clone());
                    continue;
                }
            };
            let mut found: Vec<PathBuf> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| {
                    matches!(
                        path.extension().and_then(|e| e.to_str()),
                        Some("json" | "yaml" | "yml")
                    )
                })
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    paths
}

fn field_count(doc: &RegistrationDoc) -> usize {
    doc.entries().map(|(_, entry)| entry.fields.len()).sum()
}

fn run_validate(args: &ValidateArgs) -> i32 {
    let validator = SchemaValidator::new();
    let mut failures = 0;
    for path in document_paths(&args.inputs) {
        let doc = match RegistrationDoc::from_path(&path) {
            Ok(doc) => doc,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failures += 1;
                continue;
            }
        };
        let report = doc.validate(&validator);
        if report.valid {
            println!("{}: OK ({} fields)", path.display(), field_count(&doc));
        } else {
            println!("{}: {}", path.display(), report.to_message());
            failures += 1;
        }
    }
    if failures > 0 { 1 } else { 0 }
}

fn load_engine(path: &Path) -> Result<Engine, String> {
    let doc = RegistrationDoc::from_path(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let mut engine = Engine::new();
    engine
        .register_document(&doc)
        .map_err(|report| format!("{}: {}", path.display(), report.to_message()))?;
    Ok(engine)
}

fn kind_heading(kind: ContextKind) -> &'static str {
    match kind {
        ContextKind::Record => "record type",
        ContextKind::Term => "taxonomy",
        ContextKind::Settings => "settings page",
    }
}

fn run_inspect(args: &InspectArgs) -> i32 {
    let engine = match load_engine(&args.file) {
        Ok(engine) => engine,
        Err(message) => {
            eprintln!("{message}");
            return 1;
        }
    };

    for (kind, namespace) in engine.registry().namespaces() {
        println!("{} {namespace}", kind_heading(kind));
        for field in engine.registry().fields(kind, namespace) {
            let marker = if engine.registry().is_nested(kind, namespace, field.name()) {
                " (nested)"
            } else {
                ""
            };
            println!(
                "  {:<24} {:<10} {}{marker}",
                field.name(),
                field.type_tag(),
                field.label(),
            );
        }
    }
    0
}

fn run_render(args: &RenderArgs) -> i32 {
    let engine = match load_engine(&args.file) {
        Ok(engine) => engine,
        Err(message) => {
            eprintln!("{message}");
            return 1;
        }
    };
    let adapter = StorageAdapter::new(MemoryStore::new());

    let (kind, namespace, ctx) = match (&args.page, &args.cpt) {
        (Some(page), None) => (
            ContextKind::Settings,
            page.clone(),
            ContextToken::Settings(page.clone()),
        ),
        (None, Some(cpt)) => (
            ContextKind::Record,
            cpt.clone(),
            ContextToken::Record(args.record),
        ),
        _ => {
            eprintln!("specify exactly one of --page <id> or --cpt <id>");
            return 2;
        }
    };

    if engine.registry().fields(kind, &namespace).is_empty() {
        eprintln!("no fields registered for {} {namespace}", kind_heading(kind));
        return 1;
    }

    println!("{}", engine.render(kind, &namespace, &ctx, &adapter));
    0
}

fn main() {
    let cli = Cli::parse();
    let code = match &cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Render(args) => run_render(args),
    };
    std::process::exit(code);
}
