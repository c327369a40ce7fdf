//! Run configuration: defaults, optional JSON file, command-line overrides.
//!
//! Precedence: command line > `--config` file > built-in defaults. Boolean
//! switches only ever move away from the file/default value.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use cooccur_graph::{BuildOptions, CategorySelection, DuplicatePolicy};

use crate::report::ReportFormat;

pub const DEFAULT_EDGE_LIST: &str = "cooccurrences.txt";

/// Organism check tags present on most records.
pub const DEFAULT_EXCLUDED_TERMS: [&str; 2] = ["Humans", "Animals"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Edge list destination.
    pub out: PathBuf,
    pub categories: CategorySelection,
    pub excluded_terms: BTreeSet<String>,
    pub duplicates: DuplicatePolicy,
    /// Optional summary report destination.
    pub report: Option<PathBuf>,
    pub format: ReportFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            out: PathBuf::from(DEFAULT_EDGE_LIST),
            categories: CategorySelection {
                controlled_vocabulary: true,
                registry_numbers: true,
                other_terms: false,
            },
            excluded_terms: DEFAULT_EXCLUDED_TERMS.iter().map(|t| t.to_string()).collect(),
            duplicates: DuplicatePolicy::PerInstance,
            report: None,
            format: ReportFormat::Text,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::new()
            .with_categories(self.categories)
            .exclude(self.excluded_terms.iter().cloned())
            .with_duplicates(self.duplicates)
    }

    pub fn apply(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(out) = &overrides.out {
            self.out = out.clone();
        }
        if overrides.no_mesh {
            self.categories.controlled_vocabulary = false;
        }
        if overrides.no_registry {
            self.categories.registry_numbers = false;
        }
        if overrides.other_terms {
            self.categories.other_terms = true;
        }
        if overrides.no_default_excludes {
            self.excluded_terms.clear();
        }
        self.excluded_terms.extend(overrides.exclude.iter().cloned());
        if overrides.dedupe_terms {
            self.duplicates = DuplicatePolicy::PerRecord;
        }
        if let Some(report) = &overrides.report {
            self.report = Some(report.clone());
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        self
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub out: Option<PathBuf>,
    pub no_mesh: bool,
    pub no_registry: bool,
    pub other_terms: bool,
    pub exclude: Vec<String>,
    pub no_default_excludes: bool,
    pub dedupe_terms: bool,
    pub report: Option<PathBuf>,
    pub format: Option<ReportFormat>,
}

pub fn resolve(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<RunConfig> {
    let base = match config_path {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let config = base.apply(overrides);
    tracing::debug!(?config, "resolved run configuration");
    Ok(config)
}
