//! In-memory value columns (doc values).
//!
//! Value columns are column-oriented per-document storage, separate from
//! the postings. Unlike stored fields (row-oriented), a column gives random
//! access to one field's value for any document id. Four column types are
//! supported, matching [`DocValuesType`]:
//!
//! - binary: one byte string per document
//! - numeric: one `i64` per document
//! - sorted: one string per document, from a sorted dictionary
//! - sorted set: a set of strings per document, iterated in ordinal order

use serde::{Deserialize, Serialize};

use crate::index::field_info::DocValuesType;

/// Sparse mapping from document id to a value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDocValues<T> {
    /// Using Vec with sparse storage (None for missing values)
    values: Vec<Option<T>>,
}

impl<T: Clone> FieldDocValues<T> {
    pub fn new() -> Self {
        FieldDocValues { values: Vec::new() }
    }

    /// Set a value for a document
    pub fn set(&mut self, doc_id: u64, value: T) {
        let doc_id = doc_id as usize;

        if doc_id >= self.values.len() {
            self.values.resize(doc_id + 1, None);
        }

        self.values[doc_id] = Some(value);
    }

    /// Get a value for a document
    pub fn get(&self, doc_id: u64) -> Option<&T> {
        self.values.get(doc_id as usize).and_then(|v| v.as_ref())
    }

    /// Highest document id with a slot, plus one.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Clone> Default for FieldDocValues<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Multi-valued column: a sorted, de-duplicated dictionary plus the
/// ordinals each document holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SortedSetColumn {
    dictionary: Vec<Vec<u8>>,
    ords: FieldDocValues<Vec<u64>>,
}

impl SortedSetColumn {
    /// Build from per-document value lists.
    ///
    /// Duplicates within a document collapse and each document's ordinals
    /// are ascending, as in any ordered set.
    pub fn from_values<I, V, S>(docs: I) -> Self
    where
        I: IntoIterator<Item = (u64, V)>,
        V: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let docs: Vec<(u64, Vec<Vec<u8>>)> = docs
            .into_iter()
            .map(|(doc, values)| (doc, values.into_iter().map(|v| v.as_ref().to_vec()).collect()))
            .collect();

        let mut dictionary: Vec<Vec<u8>> = docs.iter().flat_map(|(_, v)| v.clone()).collect();
        dictionary.sort();
        dictionary.dedup();

        let mut ords = FieldDocValues::new();
        for (doc, values) in docs {
            let mut doc_ords: Vec<u64> = values
                .iter()
                .filter_map(|v| dictionary.binary_search(v).ok().map(|o| o as u64))
                .collect();
            doc_ords.sort_unstable();
            doc_ords.dedup();
            ords.set(doc, doc_ords);
        }

        SortedSetColumn { dictionary, ords }
    }

    /// Ordinals held by a document, ascending. Empty when it holds none.
    pub fn ords(&self, doc_id: u64) -> Vec<u64> {
        self.ords.get(doc_id).cloned().unwrap_or_default()
    }

    /// Resolve an ordinal to its value.
    pub fn lookup_ord(&self, ord: u64) -> Option<&[u8]> {
        self.dictionary.get(ord as usize).map(|v| v.as_slice())
    }

    pub fn value_count(&self) -> usize {
        self.dictionary.len()
    }
}

/// A value column of one of the four supported types.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValuesColumn {
    Binary(FieldDocValues<Vec<u8>>),
    Numeric(FieldDocValues<i64>),
    Sorted(FieldDocValues<Vec<u8>>),
    SortedSet(SortedSetColumn),
}

impl DocValuesColumn {
    pub fn doc_values_type(&self) -> DocValuesType {
        match self {
            DocValuesColumn::Binary(_) => DocValuesType::Binary,
            DocValuesColumn::Numeric(_) => DocValuesType::Numeric,
            DocValuesColumn::Sorted(_) => DocValuesType::Sorted,
            DocValuesColumn::SortedSet(_) => DocValuesType::SortedSet,
        }
    }

    pub fn binary<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: AsRef<[u8]>,
    {
        let mut column = FieldDocValues::new();
        for (doc, value) in values {
            column.set(doc, value.as_ref().to_vec());
        }
        DocValuesColumn::Binary(column)
    }

    pub fn numeric<I: IntoIterator<Item = (u64, i64)>>(values: I) -> Self {
        let mut column = FieldDocValues::new();
        for (doc, value) in values {
            column.set(doc, value);
        }
        DocValuesColumn::Numeric(column)
    }

    pub fn sorted<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: AsRef<[u8]>,
    {
        match Self::binary(values) {
            DocValuesColumn::Binary(column) => DocValuesColumn::Sorted(column),
            other => other,
        }
    }

    pub fn sorted_set<I, V, S>(docs: I) -> Self
    where
        I: IntoIterator<Item = (u64, V)>,
        V: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        DocValuesColumn::SortedSet(SortedSetColumn::from_values(docs))
    }
}

/// Serializable form of a value column, keyed by document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum DocValuesSnapshot {
    Binary(Vec<(u64, String)>),
    Numeric(Vec<(u64, i64)>),
    Sorted(Vec<(u64, String)>),
    SortedSet(Vec<(u64, Vec<String>)>),
}

impl From<DocValuesSnapshot> for DocValuesColumn {
    fn from(snapshot: DocValuesSnapshot) -> Self {
        match snapshot {
            DocValuesSnapshot::Binary(values) => DocValuesColumn::binary(values),
            DocValuesSnapshot::Numeric(values) => DocValuesColumn::numeric(values),
            DocValuesSnapshot::Sorted(values) => DocValuesColumn::sorted(values),
            DocValuesSnapshot::SortedSet(values) => DocValuesColumn::sorted_set(values),
        }
    }
}
