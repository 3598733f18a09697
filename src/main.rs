use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ccg::core::{
    AnalyzerConfig, CodebaseAnalyzer, Language, QueryEngine, RelationshipFilter, SourceFile,
};
use ccg::formatters::JsonCompactFormatter;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "ccg",
    version,
    about = "Code context graph extractor for Python and Jac sources"
)]
struct Cli {
    /// Source files to analyze; the language is inferred from the extension
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// JSON array of {"file_path", "language"} entries, analyzed after FILES
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Output file path (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format: compact (default), full
    #[arg(short, long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Compact)]
    format: OutputFormat,

    /// Print entities related to NAME instead of the graph
    #[arg(short, long, value_name = "NAME")]
    query: Option<String>,

    /// Relationship filter for --query: calls, called_by, inherits, all
    #[arg(short, long, value_name = "KIND", default_value = "all")]
    relationship: RelationshipFilter,

    /// Scan files in parallel
    #[arg(long)]
    parallel: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Full,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    run(cli)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();

    let mut sources: Vec<SourceFile> = cli.files.iter().map(|path| infer_source(path)).collect();
    if let Some(manifest) = &cli.manifest {
        sources.extend(load_manifest(manifest)?);
    }
    if sources.is_empty() {
        anyhow::bail!("no input files; pass FILES or --manifest");
    }

    let analyzer = CodebaseAnalyzer::with_config(AnalyzerConfig {
        parallel: cli.parallel,
    });
    let report = analyzer.analyze(&sources);

    info!(
        entities = report.entities.len(),
        nodes = report.graph.metadata.total_nodes,
        edges = report.graph.metadata.total_edges,
        diagnostics = report.diagnostics.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "analysis finished"
    );

    let formatter = JsonCompactFormatter::new()
        .with_minimal(cli.format == OutputFormat::Compact)
        .with_pretty(cli.pretty);

    let rendered = match &cli.query {
        Some(name) => {
            let related = QueryEngine::new(&report.entities).related(name, cli.relationship);
            formatter.format_related(&related)?
        }
        None => formatter.format_report(&report)?,
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(output = %path.display(), "wrote output");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Unknown extensions keep their raw extension as the tag and are reported as
/// unsupported by the analyzer.
fn infer_source(path: &Path) -> SourceFile {
    let tag = match Language::from_path(path) {
        Some(language) => language.as_str().to_string(),
        None => path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("unknown")
            .to_string(),
    };
    SourceFile::new(path, tag)
}

fn load_manifest(path: &Path) -> Result<Vec<SourceFile>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let entries: Vec<SourceFile> = serde_json::from_str(&content)
        .with_context(|| format!("invalid manifest {}", path.display()))?;
    Ok(entries)
}
