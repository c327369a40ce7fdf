//! Edge list export and run summary.

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use cooccur_graph::{BuildOptions, BuildStats, ComponentSummary, CooccurrenceGraph, GraphMetrics};
use cooccur_ingest_medline::{distinct_terms, MedlineExtraction, TermCategory};

// =============================================================================
// Edge list
// =============================================================================

/// Write `<<a>>\t<<b>>\t<<weight>>` lines, heaviest edges first.
pub fn write_edge_list<W: Write>(graph: &CooccurrenceGraph, mut writer: W) -> io::Result<usize> {
    let edges = graph.labeled_edges_by_weight();
    for pair in &edges {
        writeln!(writer, "<<{}>>\t<<{}>>\t<<{}>>", pair.a, pair.b, pair.weight)?;
    }
    writer.flush()?;
    Ok(edges.len())
}

pub fn write_edge_list_file(graph: &CooccurrenceGraph, path: &Path) -> Result<usize> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let written = write_edge_list(graph, BufWriter::new(file))
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), edges = written, "wrote edge list");
    Ok(written)
}

// =============================================================================
// Summary report
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReportV1 {
    pub version: String,
    pub generated_at_unix_secs: u64,
    pub input: String,
    pub edge_list: String,
    pub options: BuildOptions,

    pub record_count: usize,
    pub skipped_records: usize,
    pub distinct_mesh_terms: usize,
    pub build: BuildStats,

    pub node_count: usize,
    pub edge_count: usize,
    pub components: ComponentSummary,
    pub average_clustering: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter_error: Option<String>,
}

impl SummaryReportV1 {
    pub fn new(
        input: &Path,
        edge_list: &Path,
        extraction: &MedlineExtraction,
        options: &BuildOptions,
        build: BuildStats,
        metrics: &GraphMetrics,
    ) -> Self {
        let (diameter, diameter_error) = match &metrics.diameter {
            Ok(d) => (Some(*d), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            version: "cooccur_summary_v1".to_string(),
            generated_at_unix_secs: now_unix_secs(),
            input: input.display().to_string(),
            edge_list: edge_list.display().to_string(),
            options: options.clone(),
            record_count: extraction.corpus.len(),
            skipped_records: extraction.skipped.len(),
            distinct_mesh_terms: distinct_terms(&extraction.corpus, TermCategory::ControlledVocabulary)
                .len(),
            build,
            node_count: metrics.node_count,
            edge_count: metrics.edge_count,
            components: metrics.components.summary(),
            average_clustering: metrics.average_clustering,
            diameter,
            diameter_error,
        }
    }
}

fn now_unix_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn diameter_line(r: &SummaryReportV1) -> String {
    match (r.diameter, &r.diameter_error) {
        (Some(d), _) => d.to_string(),
        (None, Some(err)) => format!("error: {err}"),
        (None, None) => "-".to_string(),
    }
}

/// Plain-text rendering; line order is fixed.
pub fn render_summary_text(r: &SummaryReportV1) -> String {
    let mut out = String::new();
    out.push_str(&format!("records: {}\n", r.record_count));
    out.push_str(&format!("graph: nodes={} edges={}\n", r.node_count, r.edge_count));
    out.push_str(&format!(
        "connected components: {}\n",
        r.components.component_count
    ));
    out.push_str(&format!(
        "average clustering coefficient: {:.6}\n",
        r.average_clustering
    ));
    out.push_str(&format!("diameter: {}\n", diameter_line(r)));

    out.push_str("\ndetails\n");
    out.push_str(&format!(
        "  input: {}  skipped records: {}  distinct MeSH terms: {}\n",
        r.input, r.skipped_records, r.distinct_mesh_terms
    ));
    out.push_str(&format!(
        "  records without pairs: {}  pair increments: {}\n",
        r.build.records_skipped, r.build.pairs_counted
    ));
    out.push_str(&format!(
        "  giant component: {} ({:.1}%)  top sizes: {:?}\n",
        r.components.giant_component_size,
        100.0 * r.components.giant_component_ratio,
        r.components.top_component_sizes
    ));
    out.push_str(&format!("  edge list: {}\n", r.edge_list));
    out
}

pub fn render_summary(r: &SummaryReportV1, format: ReportFormat) -> Result<String> {
    Ok(match format {
        ReportFormat::Text => render_summary_text(r),
        ReportFormat::Json => serde_json::to_string_pretty(r)?,
    })
}

pub fn write_summary(r: &SummaryReportV1, format: ReportFormat, path: &Path) -> Result<()> {
    let rendered = render_summary(r, format)?;
    std::fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), ?format, "wrote summary report");
    Ok(())
}

/// Console summary on stdout, same order as the text report.
pub fn print_console_summary(r: &SummaryReportV1) {
    println!("{} {}", "Records:".bold(), r.record_count);
    println!(
        "{} nodes={} edges={}",
        "Co-occurrence graph:".bold(),
        r.node_count,
        r.edge_count
    );
    println!(
        "{} {}",
        "Connected components:".bold(),
        r.components.component_count
    );
    println!(
        "{} {:.6}",
        "Average clustering coefficient:".bold(),
        r.average_clustering
    );
    match (r.diameter, &r.diameter_error) {
        (Some(d), _) => println!("{} {}", "Diameter:".bold(), d),
        (None, Some(err)) => println!("{} {} {}", "Diameter:".bold(), "error:".red().bold(), err),
        (None, None) => println!("{} -", "Diameter:".bold()),
    }
}
