//! bl-convert - CLI tool to turn extracted delivery notes into WMS import files.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bl_core::{
    generate_bootstrap, generate_reception, parse_extraction_file, validate_tables, Batch,
    ExtractionResult, GeneratedDocument, Layout, MappingTables,
};

/// Convert a delivery-note extraction result into WMS Bootstrap and Reception workbooks.
#[derive(Parser, Debug)]
#[command(name = "bl-convert")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Extraction result JSON file (infoBL + lignes)
    #[arg(short, long)]
    input: PathBuf,

    /// Documents to generate
    #[arg(short, long, value_enum, default_value_t = Kind::Both)]
    kind: Kind,

    /// Bootstrap template workbook to fill instead of building a fresh one
    #[arg(long)]
    bootstrap_template: Option<PathBuf>,

    /// Reception template workbook to fill instead of building a fresh one
    #[arg(long)]
    reception_template: Option<PathBuf>,

    /// Directory the documents are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Mapping tables TOML file replacing the built-in tables
    #[arg(short, long)]
    mapping: Option<PathBuf>,

    /// Print the transformed lines as JSON, don't generate documents
    #[arg(long)]
    preview: bool,

    /// Refuse to generate documents when any line is in error
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Bootstrap,
    Reception,
    Both,
}

impl Kind {
    fn bootstrap(self) -> bool {
        matches!(self, Kind::Bootstrap | Kind::Both)
    }

    fn reception(self) -> bool {
        matches!(self, Kind::Reception | Kind::Both)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let loaded;
    let tables = match &args.mapping {
        Some(path) => {
            loaded = MappingTables::from_file(path)
                .with_context(|| format!("Failed to load mapping {}", path.display()))?;
            info!("Loaded mapping tables from {}", path.display());
            &loaded
        }
        None => MappingTables::builtin(),
    };

    for warning in &validate_tables(tables).warnings {
        warn!("{}", warning);
    }

    info!("Processing: {}", args.input.display());

    let extraction = parse_extraction_file(&args.input)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    let batch = Batch::from_extraction(tables, &extraction);

    for warning in &batch.validation.warnings {
        warn!("{}", warning);
    }

    for err in &batch.validation.errors {
        error!("{}", err);
    }

    // Preview output
    if args.preview {
        let preview = json!({
            "lines": batch.lines,
            "summary": batch.summary,
        });
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    if args.strict && !batch.is_clean() {
        anyhow::bail!(
            "{} line(s) in error, no documents generated (--strict)",
            batch.summary.errors
        );
    }

    let documents = generate(&args, tables, &extraction, &batch)?;

    for doc in &documents {
        let path = write_document(&args.output_dir, doc)?;
        info!("Generated: {}", path.display());
    }

    Ok(())
}

fn generate(
    args: &Args,
    tables: &MappingTables,
    extraction: &ExtractionResult,
    batch: &Batch,
) -> Result<Vec<GeneratedDocument>> {
    let mut documents = Vec::new();

    if args.kind.bootstrap() {
        let template = read_template(args.bootstrap_template.as_deref())?;
        let order_reference = match extraction.info_bl.as_ref() {
            Some(header) => header.order_reference.clone(),
            None => fallback_reference(&args.input),
        };
        let doc = generate_bootstrap(
            &batch.lines,
            &order_reference,
            &tables.constants,
            layout(template.as_deref()),
        )
        .context("Failed to generate Bootstrap document")?;
        documents.push(doc);
    }

    if args.kind.reception() {
        let header = extraction
            .header()
            .context("Reception document needs the delivery-note header")?;
        let template = read_template(args.reception_template.as_deref())?;
        let doc = generate_reception(
            header,
            &batch.lines,
            &tables.constants,
            layout(template.as_deref()),
        )
        .context("Failed to generate Reception document")?;
        documents.push(doc);
    }

    Ok(documents)
}

fn read_template(path: Option<&Path>) -> Result<Option<Vec<u8>>> {
    path.map(|path| {
        std::fs::read(path).with_context(|| format!("Failed to read template {}", path.display()))
    })
    .transpose()
}

fn layout(template: Option<&[u8]>) -> Layout<'_> {
    match template {
        Some(bytes) => Layout::Template(bytes),
        None => Layout::Fresh,
    }
}

/// Order reference used in file names when the extraction has no header.
fn fallback_reference(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bl".to_string())
}

fn write_document(output_dir: &Path, doc: &GeneratedDocument) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let path = output_dir.join(&doc.filename);
    std::fs::write(&path, &doc.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
