use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

// Import from protokol-core
use protokol_core::{
    save_rows, BatchOutput, ConfigManager, DocumentProcessor, OutputFormat, ParsingConfig,
    StepProfiler, TemplateVariant, DEFAULT_OUTPUT,
};

#[derive(Parser)]
#[command(name = "protokol")]
#[command(about = "Collect committee meeting protocols (DOCX) into one spreadsheet")]
struct Args {
    /// Directory scanned (non-recursively) for .docx protocols
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    /// Output file path (default: TOTAL_PROTOKOL.xlsx, or .json with --format json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: xlsx or json (default: from the output extension, else xlsx)
    #[arg(short = 'f', long, value_parser = ["xlsx", "json"])]
    format: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Built-in template variant: header-table or plain-text
    #[arg(long, value_parser = ["header-table", "plain-text"], default_value = "header-table")]
    variant: String,

    /// Enable profiling of pipeline steps, summed over all documents
    #[arg(long)]
    profile: bool,

    /// Show available config options and exit
    #[arg(long)]
    show_configs: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn parse_variant(name: &str) -> TemplateVariant {
    match name {
        "plain-text" => TemplateVariant::PlainText,
        _ => TemplateVariant::HeaderTable,
    }
}

/// Output path and format from the flags. An explicit format wins; otherwise
/// the output extension decides, falling back to xlsx.
fn resolve_output(args: &Args) -> (PathBuf, OutputFormat) {
    let explicit = args.format.as_deref().and_then(OutputFormat::from_name);

    match (&args.output, explicit) {
        (Some(path), Some(format)) => (path.clone(), format),
        (Some(path), None) => (
            path.clone(),
            OutputFormat::from_path(path).unwrap_or(OutputFormat::Xlsx),
        ),
        (None, Some(OutputFormat::Json)) => (
            PathBuf::from(DEFAULT_OUTPUT).with_extension("json"),
            OutputFormat::Json,
        ),
        (None, _) => (PathBuf::from(DEFAULT_OUTPUT), OutputFormat::Xlsx),
    }
}

fn resolve_config(args: &Args) -> ParsingConfig {
    if let Some(config_path) = &args.config {
        let config = ParsingConfig::load_with_fallback(Some(config_path.as_str()));
        println!("📋 Loaded config from: {} ({:?})", config_path, config.variant);
        return config;
    }

    let manager = ConfigManager::new();
    let config = manager.get_config(parse_variant(&args.variant)).clone();
    println!("📋 Using built-in config: {}", args.variant);
    config
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    println!("🦀 Protokol Extractor");

    if args.show_configs {
        show_help();
        return Ok(());
    }

    if !args.input_dir.is_dir() {
        println!("⚠️  Input directory not found: {}", args.input_dir.display());
        println!("   Please check the path.");
        return Ok(());
    }

    let start_time = Instant::now();
    let config = resolve_config(&args);
    let (output_path, format) = resolve_output(&args);
    debug!(
        "⚙️  {} meeting field rules, roll call table fallback: {}, empty roll call: {:?}",
        config.meeting_fields.len(),
        config.roll_call.table_fallback,
        config.flatten.empty_roll_call
    );

    let processor = DocumentProcessor::new(&config)?;
    let mut profiler = StepProfiler::new(args.profile);

    println!("📁 Scanning: {}", args.input_dir.display());
    let batch = processor.process_directory_with_profiler(&args.input_dir, &mut profiler)?;

    let rows = batch.rows();
    profiler
        .time_step("Write output", || save_rows(&rows, &output_path, format))
        .with_context(|| format!("could not write {}", output_path.display()))?;

    print_summary(&batch, &output_path);
    profiler.print_summary();
    println!(
        "⏱️  Total processing time: {:.3}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn print_summary(batch: &BatchOutput, output_path: &std::path::Path) {
    println!("\n📊 Summary:");
    println!("   📄 Documents processed: {}", batch.documents.len());
    for document in &batch.documents {
        println!(
            "      {} → {} agenda items, {} members, {} rows",
            document.file_name,
            document.record.agenda.len(),
            document.record.roll_call.len(),
            document.rows.len()
        );
    }
    if !batch.failures.is_empty() {
        println!("   ⚠️  Documents skipped: {}", batch.failures.len());
        for failure in &batch.failures {
            println!("      {}: {}", failure.path.display(), failure.error);
        }
    }
    println!("   📋 Rows written: {}", batch.row_count());
    println!("✅ Extraction complete. Results saved to {}", output_path.display());
}

fn show_help() {
    println!("\n📋 Available Configuration Options:");
    println!("  --input-dir <dir>       Directory with .docx protocols (default: current directory)");
    println!("  --output <path>         Output file path (default: {DEFAULT_OUTPUT})");
    println!("  --format <fmt>          Output format: xlsx or json");
    println!("  --config <path>         Load custom config file (YAML)");
    println!("  --variant <name>        Built-in template: header-table or plain-text");
    println!("  --profile               Print time spent in each pipeline step");

    println!("\n📄 Template Variants:");
    let manager = ConfigManager::new();
    for variant in manager.variants() {
        let config = manager.get_config(variant);
        println!("  {:?}", variant);
        for rule in &config.meeting_fields {
            println!("    {:<28} {:?} → {:?}", rule.label, rule.strategy, rule.field);
        }
    }

    println!("\n📝 Config file keys (YAML):");
    println!("  variant                      header-table | plain-text");
    println!("  labels.*                     label anchors (agenda, question, speaker, voted, ...)");
    println!("  meeting_fields[]             field, label, strategy (inline | block | header_table)");
    println!("  roll_call.table_fallback     read member votes from the last roll-call table when the text has none (default: true)");
    println!("  flatten.empty_roll_call      placeholder | omit");
    println!("  flatten.member_name_in_members  repeat each member's name in the members column (default: false)");

    println!("\n📝 Usage Examples:");
    println!("  protokol");
    println!("  protokol -i ./protocols -o total.xlsx");
    println!("  protokol -i ./protocols -f json --variant plain-text");
    println!("  protokol -i ./protocols -c configs/plain-text.yaml");
    println!("  RUST_LOG=debug protokol --profile");
}
