//! Co-occurrence graph construction.
//!
//! Per record:
//! 1. concatenate the enabled categories (controlled vocabulary, registry
//!    numbers, other terms; always in that order),
//! 2. drop excluded terms (exact string match),
//! 3. skip the record when fewer than two terms remain,
//! 4. add every remaining term as a node,
//! 5. count every pair of positions `i < j` whose terms differ.
//!
//! Under [`DuplicatePolicy::PerInstance`] a term listed twice in one record
//! pairs once per listing, so `[X, Y, X]` adds 2 to `{X, Y}`.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use cooccur_ingest_medline::{MedlineRecord, TermCategory};

use crate::{CooccurrenceGraph, NodeId};

// ============================================================================
// Term sources
// ============================================================================

/// Anything that exposes the three term categories of a record.
pub trait TermSource {
    fn terms(&self, category: TermCategory) -> &[String];
}

impl TermSource for MedlineRecord {
    fn terms(&self, category: TermCategory) -> &[String] {
        MedlineRecord::terms(self, category)
    }
}

/// Bare term lists, for callers that do not start from MEDLINE text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermLists {
    pub controlled_vocabulary: Vec<String>,
    pub registry_numbers: Vec<String>,
    pub other_terms: Vec<String>,
}

impl TermLists {
    /// Lists holding only controlled vocabulary terms.
    pub fn controlled<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            controlled_vocabulary: terms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl TermSource for TermLists {
    fn terms(&self, category: TermCategory) -> &[String] {
        match category {
            TermCategory::ControlledVocabulary => &self.controlled_vocabulary,
            TermCategory::RegistryNumber => &self.registry_numbers,
            TermCategory::OtherTerm => &self.other_terms,
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Which term categories feed the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySelection {
    pub controlled_vocabulary: bool,
    pub registry_numbers: bool,
    pub other_terms: bool,
}

impl Default for CategorySelection {
    fn default() -> Self {
        Self::all()
    }
}

impl CategorySelection {
    pub const fn all() -> Self {
        Self {
            controlled_vocabulary: true,
            registry_numbers: true,
            other_terms: true,
        }
    }

    pub fn includes(&self, category: TermCategory) -> bool {
        match category {
            TermCategory::ControlledVocabulary => self.controlled_vocabulary,
            TermCategory::RegistryNumber => self.registry_numbers,
            TermCategory::OtherTerm => self.other_terms,
        }
    }

    /// Enabled categories in concatenation order.
    pub fn enabled(&self) -> impl Iterator<Item = TermCategory> + '_ {
        TermCategory::ALL
            .into_iter()
            .filter(move |c| self.includes(*c))
    }
}

/// How a term repeated inside one record is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Pair every listing of a term (plain combinations over the list).
    #[default]
    PerInstance,
    /// Keep the first listing of each term before pairing.
    PerRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub categories: CategorySelection,
    pub excluded_terms: BTreeSet<String>,
    pub duplicates: DuplicatePolicy,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: CategorySelection) -> Self {
        self.categories = categories;
        self
    }

    pub fn exclude<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_terms.extend(terms.into_iter().map(Into::into));
        self
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn is_excluded(&self, term: &str) -> bool {
        self.excluded_terms.contains(term)
    }
}

// ============================================================================
// Builder
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub records_seen: usize,
    /// Records left with fewer than two terms after filtering.
    pub records_skipped: usize,
    /// Pair increments applied, self pairs not included.
    pub pairs_counted: usize,
}

/// Accumulates records into a graph.
#[derive(Debug)]
pub struct CooccurrenceBuilder<'o> {
    options: &'o BuildOptions,
    graph: CooccurrenceGraph,
    stats: BuildStats,
}

impl<'o> CooccurrenceBuilder<'o> {
    pub fn new(options: &'o BuildOptions) -> Self {
        Self {
            options,
            graph: CooccurrenceGraph::default(),
            stats: BuildStats::default(),
        }
    }

    /// The filtered term sequence a record contributes.
    pub fn selected_terms<'r, R: TermSource + ?Sized>(&self, record: &'r R) -> Vec<&'r str> {
        let mut terms: Vec<&'r str> = self
            .options
            .categories
            .enabled()
            .flat_map(|category| record.terms(category).iter().map(String::as_str))
            .filter(|term| !self.options.is_excluded(term))
            .collect();

        if self.options.duplicates == DuplicatePolicy::PerRecord {
            let mut seen = AHashSet::with_capacity(terms.len());
            terms.retain(|term| seen.insert(*term));
        }
        terms
    }

    pub fn add_record<R: TermSource + ?Sized>(&mut self, record: &R) {
        self.stats.records_seen += 1;
        let terms = self.selected_terms(record);
        if terms.len() < 2 {
            self.stats.records_skipped += 1;
            return;
        }

        // Every term is a node, even one that only ever pairs with itself.
        let ids: Vec<NodeId> = terms.iter().map(|term| self.graph.add_node(term)).collect();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if a == b {
                    continue;
                }
                self.graph.bump_edge(a, b);
                self.stats.pairs_counted += 1;
            }
        }
    }

    pub fn finish(self) -> CooccurrenceGraph {
        self.finish_with_stats().0
    }

    pub fn finish_with_stats(self) -> (CooccurrenceGraph, BuildStats) {
        tracing::debug!(
            records = self.stats.records_seen,
            skipped = self.stats.records_skipped,
            pairs = self.stats.pairs_counted,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "built co-occurrence graph"
        );
        (self.graph, self.stats)
    }
}

/// Build the co-occurrence graph of a record collection.
pub fn build_cooccurrence_graph<'a, R, I>(records: I, options: &BuildOptions) -> CooccurrenceGraph
where
    R: TermSource + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut builder = CooccurrenceBuilder::new(options);
    for record in records {
        builder.add_record(record);
    }
    builder.finish()
}
