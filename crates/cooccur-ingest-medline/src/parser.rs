//! MEDLINE flat-text parsing.
//!
//! Expected format (PubMed "MEDLINE" export):
//! ```text
//! PMID- 12345678
//! TI  - A title that may wrap onto
//!       continuation lines.
//! AB  - The abstract.
//! MH  - Humans
//! MH  - DNA-Binding Proteins/genetics
//! RN  - 0 (SON protein, human)
//! OT  - splicing
//!
//! PMID- 12345679
//! ...
//! ```

use regex::Regex;
use std::path::Path;

use crate::{
    InvalidRecord, MedlineCorpus, MedlineError, MedlineRecord, RequiredField, TermCategory,
};

/// Separator between two records.
const RECORD_SEPARATOR: &str = "\n\n";

/// Continuation lines are indented by six spaces under their field.
const CONTINUATION: &str = "\n      ";

/// Result of an extraction: the valid records plus the blocks that were
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct MedlineExtraction {
    pub corpus: MedlineCorpus,
    pub skipped: Vec<InvalidRecord>,
}

/// Compiled field patterns.
#[derive(Debug, Clone)]
pub struct MedlineParser {
    pmid: Regex,
    title: Regex,
    abstract_text: Regex,
    mesh: Regex,
    registry: Regex,
    other: Regex,
}

impl MedlineParser {
    pub fn new() -> Result<Self, MedlineError> {
        Ok(Self {
            pmid: field_pattern(RequiredField::Pmid.tag())?,
            title: field_pattern(RequiredField::Title.tag())?,
            abstract_text: field_pattern(RequiredField::Abstract.tag())?,
            mesh: field_pattern(TermCategory::ControlledVocabulary.tag())?,
            registry: field_pattern(TermCategory::RegistryNumber.tag())?,
            other: field_pattern(TermCategory::OtherTerm.tag())?,
        })
    }

    /// Parse a whole export.
    pub fn parse(&self, text: &str) -> MedlineExtraction {
        let text = text.replace("\r\n", "\n");
        let mut extraction = MedlineExtraction::default();

        for (index, block) in text.split(RECORD_SEPARATOR).enumerate() {
            if block.trim().is_empty() {
                continue;
            }
            let block = block.replace(CONTINUATION, " ");
            match self.parse_record(index, &block) {
                Ok(record) => {
                    if let Some(previous) = extraction.corpus.insert(record) {
                        tracing::debug!(pmid = %previous.pmid, index, "duplicate PMID replaces earlier record");
                    }
                }
                Err(invalid) => {
                    tracing::debug!(index, field = %invalid.field, "skipping invalid record");
                    extraction.skipped.push(invalid);
                }
            }
        }

        tracing::info!(
            records = extraction.corpus.len(),
            skipped = extraction.skipped.len(),
            "parsed MEDLINE export"
        );
        extraction
    }

    /// Parse one record block (continuation lines already folded).
    pub fn parse_record(&self, index: usize, block: &str) -> Result<MedlineRecord, InvalidRecord> {
        let invalid = |pmid: Option<&str>, field| InvalidRecord {
            index,
            pmid: pmid.map(str::to_string),
            field,
        };

        let pmid = first_value(&self.pmid, block).ok_or_else(|| invalid(None, RequiredField::Pmid))?;
        let title =
            first_value(&self.title, block).ok_or_else(|| invalid(Some(pmid), RequiredField::Title))?;
        let abstract_text = first_value(&self.abstract_text, block)
            .ok_or_else(|| invalid(Some(pmid), RequiredField::Abstract))?;

        Ok(MedlineRecord {
            pmid: pmid.to_string(),
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            mesh_terms: all_values(&self.mesh, block),
            registry_numbers: all_values(&self.registry, block),
            other_terms: all_values(&self.other, block),
        })
    }
}

/// `TAG - value` anchored at a line start. Tags are left-aligned and padded
/// to four columns (`PMID- `, `TI  - `).
fn field_pattern(tag: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?m)^{}- (.*)$", regex::escape(&format!("{tag:<4}"))))
}

fn first_value<'a>(pattern: &Regex, block: &'a str) -> Option<&'a str> {
    pattern
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn all_values(pattern: &Regex, block: &str) -> Vec<String> {
    pattern
        .captures_iter(block)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Parse an export held in memory.
pub fn parse_medline(text: &str) -> Result<MedlineExtraction, MedlineError> {
    Ok(MedlineParser::new()?.parse(text))
}

/// Read and parse an export file.
pub fn read_medline_file(path: &Path) -> Result<MedlineExtraction, MedlineError> {
    let text = std::fs::read_to_string(path).map_err(|source| MedlineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "read MEDLINE export");
    parse_medline(&text)
}
