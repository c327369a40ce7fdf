//! Record corpus keyed by PMID.

use ahash::AHashMap;
use std::collections::BTreeSet;

use crate::{MedlineRecord, TermCategory};

/// Records of one extraction, in first-seen order, unique by PMID.
#[derive(Debug, Clone, Default)]
pub struct MedlineCorpus {
    records: Vec<MedlineRecord>,
    by_pmid: AHashMap<String, usize>,
}

impl MedlineCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. A record whose PMID is already present replaces the
    /// earlier one in place and the earlier one is returned.
    pub fn insert(&mut self, record: MedlineRecord) -> Option<MedlineRecord> {
        if let Some(&slot) = self.by_pmid.get(&record.pmid) {
            return Some(std::mem::replace(&mut self.records[slot], record));
        }
        self.by_pmid.insert(record.pmid.clone(), self.records.len());
        self.records.push(record);
        None
    }

    pub fn get(&self, pmid: &str) -> Option<&MedlineRecord> {
        self.by_pmid.get(pmid).map(|&slot| &self.records[slot])
    }

    pub fn contains(&self, pmid: &str) -> bool {
        self.by_pmid.contains_key(pmid)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MedlineRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a MedlineCorpus {
    type Item = &'a MedlineRecord;
    type IntoIter = std::slice::Iter<'a, MedlineRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<MedlineRecord> for MedlineCorpus {
    fn from_iter<I: IntoIterator<Item = MedlineRecord>>(iter: I) -> Self {
        let mut corpus = MedlineCorpus::new();
        for record in iter {
            corpus.insert(record);
        }
        corpus
    }
}

/// Distinct terms of one category across the corpus.
pub fn distinct_terms(corpus: &MedlineCorpus, category: TermCategory) -> BTreeSet<String> {
    corpus
        .iter()
        .flat_map(|record| record.terms(category).iter().cloned())
        .collect()
}
