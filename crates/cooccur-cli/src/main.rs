//! cooccur CLI
//!
//! Builds the term co-occurrence graph of a PubMed MEDLINE export:
//! - extracts MeSH headings, registry numbers and keywords per record,
//! - writes the weighted edge list (heaviest first),
//! - prints record/node/edge counts, connected components, average
//!   clustering coefficient and diameter.

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use colored::Colorize;
use std::path::{Path, PathBuf};

use cooccur_graph::{CooccurrenceBuilder, GraphMetrics};
use cooccur_ingest_medline::read_medline_file;

mod config;
mod report;

use config::{ConfigOverrides, RunConfig};
use report::{ReportFormat, SummaryReportV1};

#[derive(Parser, Debug)]
#[command(name = "cooccur")]
#[command(
    author,
    version,
    about = "Term co-occurrence graph statistics for PubMed MEDLINE exports"
)]
struct Cli {
    /// MEDLINE export (PubMed "MEDLINE" format, records separated by blank lines).
    input: Option<PathBuf>,

    /// Edge list output path [default: cooccurrences.txt].
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// JSON run configuration; command-line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Leave MeSH headings (`MH`) out of the graph.
    #[arg(long)]
    no_mesh: bool,

    /// Leave registry numbers (`RN`) out of the graph.
    #[arg(long)]
    no_registry: bool,

    /// Include other terms (`OT`, author keywords).
    #[arg(long)]
    other_terms: bool,

    /// Exclude a term (exact match). Repeatable.
    #[arg(long = "exclude", value_name = "TERM")]
    exclude: Vec<String>,

    /// Do not exclude `Humans` and `Animals` by default.
    #[arg(long)]
    no_default_excludes: bool,

    /// Count a term listed several times in one record only once.
    #[arg(long)]
    dedupe_terms: bool,

    /// Also write the run summary to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Summary report format.
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            out: self.out.clone(),
            no_mesh: self.no_mesh,
            no_registry: self.no_registry,
            other_terms: self.other_terms,
            exclude: self.exclude.clone(),
            no_default_excludes: self.no_default_excludes,
            dedupe_terms: self.dedupe_terms,
            report: self.report.clone(),
            format: self.format,
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let Some(input) = cli.input.as_deref() else {
        println!("{}", Cli::command().render_usage());
        return Ok(());
    };

    let config = config::resolve(cli.config.as_deref(), &cli.overrides())?;
    run(input, &config)
}

fn run(input: &Path, config: &RunConfig) -> Result<()> {
    let extraction = read_medline_file(input)
        .with_context(|| format!("failed to load MEDLINE export {}", input.display()))?;
    if !extraction.skipped.is_empty() {
        tracing::warn!(
            skipped = extraction.skipped.len(),
            "skipped records without PMID, title or abstract"
        );
    }

    let options = config.build_options();
    let mut builder = CooccurrenceBuilder::new(&options);
    for record in &extraction.corpus {
        builder.add_record(record);
    }
    let (graph, build_stats) = builder.finish_with_stats();

    let written = report::write_edge_list_file(&graph, &config.out)?;
    let metrics = GraphMetrics::compute(&graph);
    if let Err(err) = &metrics.diameter {
        tracing::warn!(error = %err, "diameter not computed");
    }

    let summary = SummaryReportV1::new(
        input,
        &config.out,
        &extraction,
        &options,
        build_stats,
        &metrics,
    );
    report::print_console_summary(&summary);
    eprintln!(
        "{} {} ({} edges)",
        "wrote".green().bold(),
        config.out.display().to_string().bold(),
        written
    );

    if let Some(path) = &config.report {
        report::write_summary(&summary, config.format, path)?;
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
    Ok(())
}
