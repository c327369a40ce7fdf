//! MEDLINE record extraction for cooccur
//!
//! Reads PubMed "MEDLINE" flat-text exports (one record per blank-line
//! separated block, one tagged field per line) into typed records:
//! - `PMID` -> record identifier (unique key)
//! - `TI` / `AB` -> title and abstract (required)
//! - `MH` -> controlled vocabulary (MeSH) terms
//! - `RN` -> registry numbers (chemicals, enzymes, CAS numbers)
//! - `OT` -> other terms (author/publisher keywords)
//!
//! Records missing an identifier, title or abstract are skipped and reported
//! as [`InvalidRecord`]s; they never abort an extraction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub mod corpus;
pub mod parser;

pub use corpus::{distinct_terms, MedlineCorpus};
pub use parser::{parse_medline, read_medline_file, MedlineExtraction, MedlineParser};

// ============================================================================
// Records
// ============================================================================

/// Term category of a MEDLINE record.
///
/// The declaration order is the order in which categories are concatenated
/// when a record's terms are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermCategory {
    ControlledVocabulary,
    RegistryNumber,
    OtherTerm,
}

impl TermCategory {
    pub const ALL: [TermCategory; 3] = [
        TermCategory::ControlledVocabulary,
        TermCategory::RegistryNumber,
        TermCategory::OtherTerm,
    ];

    /// MEDLINE field tag carrying this category.
    pub fn tag(self) -> &'static str {
        match self {
            TermCategory::ControlledVocabulary => "MH",
            TermCategory::RegistryNumber => "RN",
            TermCategory::OtherTerm => "OT",
        }
    }
}

/// A parsed MEDLINE record.
///
/// Term lists are always present (possibly empty) and keep file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedlineRecord {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
    pub mesh_terms: Vec<String>,
    pub registry_numbers: Vec<String>,
    pub other_terms: Vec<String>,
}

impl MedlineRecord {
    pub fn terms(&self, category: TermCategory) -> &[String] {
        match category {
            TermCategory::ControlledVocabulary => &self.mesh_terms,
            TermCategory::RegistryNumber => &self.registry_numbers,
            TermCategory::OtherTerm => &self.other_terms,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Field a record cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Pmid,
    Title,
    Abstract,
}

impl RequiredField {
    pub fn tag(self) -> &'static str {
        match self {
            RequiredField::Pmid => "PMID",
            RequiredField::Title => "TI",
            RequiredField::Abstract => "AB",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A record block that was skipped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record block #{index} is missing its {field} field")]
pub struct InvalidRecord {
    /// Zero-based position of the block in the input.
    pub index: usize,
    /// Identifier, when the block had one.
    pub pmid: Option<String>,
    pub field: RequiredField,
}

#[derive(Debug, thiserror::Error)]
pub enum MedlineError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid field pattern: {0}")]
    Pattern(#[from] regex::Error),
}
