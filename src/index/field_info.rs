//! Per-field metadata reported by an index host.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type of the per-document value column attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocValuesType {
    /// No value column.
    #[default]
    None,
    /// One opaque byte string per document.
    Binary,
    /// One 64-bit integer per document.
    Numeric,
    /// One string per document, drawn from a sorted dictionary.
    Sorted,
    /// Zero or more strings per document, kept in dictionary ordinal order.
    SortedSet,
}

impl fmt::Display for DocValuesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocValuesType::None => "none",
            DocValuesType::Binary => "binary",
            DocValuesType::Numeric => "numeric",
            DocValuesType::Sorted => "sorted",
            DocValuesType::SortedSet => "sorted_set",
        };
        f.pad(name)
    }
}

/// What the postings of a field record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOptions {
    /// Field is not inverted.
    None,
    /// Document ids only.
    Docs,
    /// Document ids and term frequencies.
    #[default]
    DocsAndFreqs,
    /// Ids, frequencies and token positions.
    DocsAndFreqsAndPositions,
    /// Ids, frequencies, positions and character offsets.
    DocsAndFreqsAndPositionsAndOffsets,
}

impl IndexOptions {
    pub fn has_positions(&self) -> bool {
        *self >= IndexOptions::DocsAndFreqsAndPositions
    }

    pub fn has_offsets(&self) -> bool {
        *self >= IndexOptions::DocsAndFreqsAndPositionsAndOffsets
    }
}

impl fmt::Display for IndexOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexOptions::None => "none",
            IndexOptions::Docs => "docs",
            IndexOptions::DocsAndFreqs => "docs_and_freqs",
            IndexOptions::DocsAndFreqsAndPositions => "docs_and_freqs_and_positions",
            IndexOptions::DocsAndFreqsAndPositionsAndOffsets => {
                "docs_and_freqs_and_positions_and_offsets"
            }
        };
        f.pad(name)
    }
}

/// Field definition as known to the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(default)]
    pub doc_values_type: DocValuesType,
    #[serde(default)]
    pub index_options: IndexOptions,
    /// Whether per-document term vectors were recorded.
    #[serde(default)]
    pub store_term_vectors: bool,
}

impl FieldInfo {
    pub fn new<S: Into<String>>(name: S) -> Self {
        FieldInfo {
            name: name.into(),
            doc_values_type: DocValuesType::None,
            index_options: IndexOptions::default(),
            store_term_vectors: false,
        }
    }

    pub fn with_doc_values(mut self, doc_values_type: DocValuesType) -> Self {
        self.doc_values_type = doc_values_type;
        self
    }

    pub fn with_index_options(mut self, index_options: IndexOptions) -> Self {
        self.index_options = index_options;
        self
    }

    pub fn with_term_vectors(mut self, store_term_vectors: bool) -> Self {
        self.store_term_vectors = store_term_vectors;
        self
    }

    pub fn has_doc_values(&self) -> bool {
        self.doc_values_type != DocValuesType::None
    }
}
