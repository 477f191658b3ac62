//! In-memory index host.
//!
//! [`MemoryIndex`] implements [`IndexAccess`] over plain in-memory
//! structures. It is assembled with [`MemoryIndexBuilder`] or loaded from a
//! JSON [`IndexSnapshot`], and is what the CLI, the tests and the benches
//! reconstruct from.
//!
//! ```
//! use palimpsest::index::memory::MemoryIndex;
//! use palimpsest::index::reader::IndexAccess;
//!
//! let index = MemoryIndex::builder(2)
//!     .stored(0, "title", "Rust Programming")
//!     .tokens("body", 0, &["fast", "safe", "fast"])
//!     .long_value("year", 1, 2024, 16)
//!     .delete(1)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(index.max_doc(), 2);
//! assert_eq!(index.num_docs(), 1);
//! assert!(index.is_deleted(1));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashMap;
use bit_vec::BitVec;
use serde::{Deserialize, Serialize};

use crate::error::{PalimpsestError, Result};
use crate::index::doc_values::{DocValuesColumn, DocValuesSnapshot};
use crate::index::field_info::{FieldInfo, IndexOptions};
use crate::index::posting::{Posting, PostingList};
use crate::index::reader::IndexAccess;
use crate::index::stored::{StoredField, StoredValue};
use crate::index::term_vector::TermVectorEntry;
use crate::index::terms::{MemoryTerms, TermMap, Terms};
use crate::numeric::{self, PRECISION_STEP_DEFAULT};

/// Largest `max_doc` a [`MemoryIndex`] accepts, the document limit of a
/// Lucene index.
pub const MAX_DOCS: u64 = i32::MAX as u64 - 128;

#[derive(Debug)]
struct FieldData {
    info: FieldInfo,
    doc_values: Option<DocValuesColumn>,
    term_vectors: AHashMap<u64, Vec<TermVectorEntry>>,
    terms: Arc<TermMap>,
}

/// An index held entirely in memory.
#[derive(Debug)]
pub struct MemoryIndex {
    max_doc: u64,
    /// Bit set = live. `None` when deletions are not tracked.
    live_docs: Option<BitVec>,
    fields: BTreeMap<String, FieldData>,
    /// Stored fields of the documents that have any.
    stored: BTreeMap<u64, Vec<StoredField>>,
    /// Shared with every term dictionary handed out.
    closed: Arc<AtomicBool>,
}

impl MemoryIndex {
    pub fn builder(max_doc: u64) -> MemoryIndexBuilder {
        MemoryIndexBuilder::new(max_doc)
    }

    /// Build an index from its serialized form.
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Result<Self> {
        let mut builder = MemoryIndexBuilder::new(snapshot.max_doc);
        if let Some(deleted) = snapshot.deleted {
            builder = builder.track_liveness(true);
            for doc_id in deleted {
                builder = builder.delete(doc_id);
            }
        }

        for field in snapshot.fields {
            let name = field.info.name.clone();
            builder = builder.field(field.info);
            for (doc_id, value) in field.stored {
                builder = builder.stored(doc_id, &name, value);
            }
            if let Some(doc_values) = field.doc_values {
                builder = builder.doc_values(&name, doc_values.into());
            }
            for (doc_id, entries) in field.term_vectors {
                builder = builder.term_vector(&name, doc_id, entries);
            }
            for (term, postings) in field.postings {
                for posting in postings {
                    builder = builder.posting(&name, &term, posting);
                }
            }
            for (doc_id, text) in field.text {
                let tokens: Vec<&str> = text.split_whitespace().collect();
                builder = builder.tokens(&name, doc_id, &tokens);
            }
            for entry in field.numeric {
                let step = entry.precision_step.unwrap_or(PRECISION_STEP_DEFAULT);
                if let Some(value) = entry.long {
                    builder = builder.long_value(&name, entry.doc, value, step);
                }
                if let Some(value) = entry.int {
                    builder = builder.int_value(&name, entry.doc, value, step);
                }
            }
        }

        builder.build()
    }

    /// Parse a JSON snapshot.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: IndexSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Load a JSON snapshot from a file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Invalidate the snapshot. Every later access fails, including term
    /// enumerations already in progress.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn num_deleted_docs(&self) -> u64 {
        self.max_doc - self.num_docs()
    }

    fn check_closed(&self) -> Result<()> {
        if self.is_closed() {
            Err(PalimpsestError::IndexClosed)
        } else {
            Ok(())
        }
    }

    fn doc_values(&self, field: &str) -> Result<Option<&DocValuesColumn>> {
        self.check_closed()?;
        Ok(self.fields.get(field).and_then(|f| f.doc_values.as_ref()))
    }
}

impl IndexAccess for MemoryIndex {
    fn max_doc(&self) -> u64 {
        self.max_doc
    }

    fn num_docs(&self) -> u64 {
        match &self.live_docs {
            Some(live) => live.iter().filter(|live| *live).count() as u64,
            None => self.max_doc,
        }
    }

    fn live_docs(&self) -> Option<&BitVec> {
        self.live_docs.as_ref()
    }

    fn field_infos(&self) -> Result<Vec<FieldInfo>> {
        self.check_closed()?;
        Ok(self.fields.values().map(|f| f.info.clone()).collect())
    }

    fn document(&self, doc_id: u64) -> Result<Vec<StoredField>> {
        self.check_closed()?;
        if doc_id >= self.max_doc {
            return Err(PalimpsestError::out_of_range(doc_id, self.max_doc));
        }
        Ok(self.stored.get(&doc_id).cloned().unwrap_or_default())
    }

    fn binary_doc_value(&self, field: &str, doc_id: u64) -> Result<Option<Vec<u8>>> {
        match self.doc_values(field)? {
            Some(DocValuesColumn::Binary(column)) => Ok(column.get(doc_id).cloned()),
            _ => Ok(None),
        }
    }

    fn numeric_doc_value(&self, field: &str, doc_id: u64) -> Result<Option<i64>> {
        match self.doc_values(field)? {
            Some(DocValuesColumn::Numeric(column)) => Ok(column.get(doc_id).copied()),
            _ => Ok(None),
        }
    }

    fn sorted_doc_value(&self, field: &str, doc_id: u64) -> Result<Option<Vec<u8>>> {
        match self.doc_values(field)? {
            Some(DocValuesColumn::Sorted(column)) => Ok(column.get(doc_id).cloned()),
            _ => Ok(None),
        }
    }

    fn sorted_set_ords(&self, field: &str, doc_id: u64) -> Result<Vec<u64>> {
        match self.doc_values(field)? {
            Some(DocValuesColumn::SortedSet(column)) => Ok(column.ords(doc_id)),
            _ => Ok(Vec::new()),
        }
    }

    fn lookup_sorted_set_ord(&self, field: &str, ord: u64) -> Result<Option<Vec<u8>>> {
        match self.doc_values(field)? {
            Some(DocValuesColumn::SortedSet(column)) => Ok(column.lookup_ord(ord).map(<[u8]>::to_vec)),
            _ => Ok(None),
        }
    }

    fn term_vector(&self, field: &str, doc_id: u64) -> Result<Option<Vec<TermVectorEntry>>> {
        self.check_closed()?;
        Ok(self
            .fields
            .get(field)
            .and_then(|f| f.term_vectors.get(&doc_id).cloned()))
    }

    fn terms(&self, field: &str) -> Result<Option<Box<dyn Terms>>> {
        self.check_closed()?;
        let Some(data) = self.fields.get(field) else {
            return Ok(None);
        };
        if data.terms.is_empty() {
            return Ok(None);
        }
        let terms = MemoryTerms::new(
            Arc::clone(&data.terms),
            data.info.index_options.has_positions(),
            data.info.index_options.has_offsets(),
        )
        .with_close_flag(Arc::clone(&self.closed));
        Ok(Some(Box::new(terms)))
    }

    fn num_terms(&self) -> Option<u64> {
        Some(self.fields.values().map(|f| f.terms.len() as u64).sum())
    }
}

#[derive(Debug)]
struct FieldBuilder {
    info: FieldInfo,
    doc_values: Option<DocValuesColumn>,
    term_vectors: AHashMap<u64, Vec<TermVectorEntry>>,
    postings: BTreeMap<String, PostingList>,
}

impl FieldBuilder {
    fn new(name: &str) -> Self {
        FieldBuilder {
            info: FieldInfo::new(name),
            doc_values: None,
            term_vectors: AHashMap::new(),
            postings: BTreeMap::new(),
        }
    }

    fn require_options(&mut self, options: IndexOptions) {
        if self.info.index_options < options {
            self.info.index_options = options;
        }
    }
}

/// Builder for [`MemoryIndex`].
///
/// Index options only ever widen: adding a posting with positions upgrades
/// the field to positional postings.
#[derive(Debug)]
pub struct MemoryIndexBuilder {
    max_doc: u64,
    track_liveness: bool,
    deleted: BTreeSet<u64>,
    fields: BTreeMap<String, FieldBuilder>,
    stored: BTreeMap<u64, Vec<StoredField>>,
}

impl MemoryIndexBuilder {
    pub fn new(max_doc: u64) -> Self {
        MemoryIndexBuilder {
            max_doc,
            track_liveness: false,
            deleted: BTreeSet::new(),
            fields: BTreeMap::new(),
            stored: BTreeMap::new(),
        }
    }

    fn field_mut(&mut self, name: &str) -> &mut FieldBuilder {
        self.fields
            .entry(name.to_string())
            .or_insert_with(|| FieldBuilder::new(name))
    }

    /// Declare a field definition. Doc values type and term vector flag are
    /// still derived from the data added later.
    pub fn field(mut self, info: FieldInfo) -> Self {
        let field = self.field_mut(&info.name);
        field.require_options(info.index_options);
        field.info.store_term_vectors |= info.store_term_vectors;
        if field.doc_values.is_none() {
            field.info.doc_values_type = info.doc_values_type;
        }
        self
    }

    /// Append a stored value to a document.
    pub fn stored<V: Into<StoredValue>>(mut self, doc_id: u64, field: &str, value: V) -> Self {
        self.field_mut(field);
        self.stored
            .entry(doc_id)
            .or_default()
            .push(StoredField::new(field, value));
        self
    }

    /// Add a posting for a term.
    pub fn posting(mut self, field: &str, term: &str, posting: Posting) -> Self {
        let entry = self.field_mut(field);
        if posting.offsets.is_some() {
            entry.require_options(IndexOptions::DocsAndFreqsAndPositionsAndOffsets);
        } else if posting.positions.is_some() {
            entry.require_options(IndexOptions::DocsAndFreqsAndPositions);
        }
        entry
            .postings
            .entry(term.to_string())
            .or_insert_with(|| PostingList::new(term.to_string()))
            .add_posting(posting);
        self
    }

    /// Index a token stream for a document, one position per token.
    pub fn tokens(mut self, field: &str, doc_id: u64, tokens: &[&str]) -> Self {
        let mut positions: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
        for (position, token) in tokens.iter().enumerate() {
            positions.entry(*token).or_default().push(position as u32);
        }
        for (token, positions) in positions {
            self = self.posting(field, token, Posting::with_positions(doc_id, positions));
        }
        self
    }

    /// Record a document's term vector for a field.
    pub fn term_vector(mut self, field: &str, doc_id: u64, entries: Vec<TermVectorEntry>) -> Self {
        let entry = self.field_mut(field);
        entry.info.store_term_vectors = true;
        entry.term_vectors.insert(doc_id, entries);
        self
    }

    /// Attach a value column to a field.
    pub fn doc_values(mut self, field: &str, column: DocValuesColumn) -> Self {
        let entry = self.field_mut(field);
        entry.info.doc_values_type = column.doc_values_type();
        entry.doc_values = Some(column);
        self
    }

    /// Index a long the way numeric fields are indexed: one docs-only term
    /// per precision step.
    pub fn long_value(mut self, field: &str, doc_id: u64, value: i64, precision_step: u32) -> Self {
        for term in numeric::long_trie_terms(value, precision_step) {
            self = self.posting(field, &term, Posting::new(doc_id));
        }
        self
    }

    /// Int counterpart of [`MemoryIndexBuilder::long_value`].
    pub fn int_value(mut self, field: &str, doc_id: u64, value: i32, precision_step: u32) -> Self {
        for term in numeric::int_trie_terms(value, precision_step) {
            self = self.posting(field, &term, Posting::new(doc_id));
        }
        self
    }

    /// Mark a document deleted. Enables liveness tracking.
    pub fn delete(mut self, doc_id: u64) -> Self {
        self.track_liveness = true;
        self.deleted.insert(doc_id);
        self
    }

    /// Toggle liveness tracking. Without it the index reports no deletions.
    pub fn track_liveness(mut self, track: bool) -> Self {
        self.track_liveness = track;
        self
    }

    pub fn build(self) -> Result<MemoryIndex> {
        let max_doc = self.max_doc;
        if max_doc > MAX_DOCS {
            return Err(PalimpsestError::invalid_argument(format!(
                "max_doc {max_doc} exceeds the limit of {MAX_DOCS} documents"
            )));
        }
        let check = |doc_id: u64, what: &str| -> Result<()> {
            if doc_id >= max_doc {
                Err(PalimpsestError::invalid_argument(format!(
                    "{what} references document {doc_id} but max_doc is {max_doc}"
                )))
            } else {
                Ok(())
            }
        };

        for doc_id in &self.deleted {
            check(*doc_id, "deletion")?;
        }
        if let Some((doc_id, _)) = self.stored.last_key_value() {
            check(*doc_id, "stored field")?;
        }

        let mut fields = BTreeMap::new();
        for (name, field) in self.fields {
            for doc_id in field.term_vectors.keys() {
                check(*doc_id, &format!("term vector of '{name}'"))?;
            }
            let mut terms = TermMap::new();
            for (term, list) in field.postings {
                if let Some(last) = list.last_doc() {
                    check(last, &format!("posting of '{name}:{term}'"))?;
                }
                terms.insert(term, Arc::new(list));
            }
            fields.insert(
                name,
                FieldData {
                    info: field.info,
                    doc_values: field.doc_values,
                    term_vectors: field.term_vectors,
                    terms: Arc::new(terms),
                },
            );
        }

        let live_docs = self.track_liveness.then(|| {
            let mut live = BitVec::from_elem(max_doc as usize, true);
            for doc_id in &self.deleted {
                live.set(*doc_id as usize, false);
            }
            live
        });

        Ok(MemoryIndex {
            max_doc,
            live_docs,
            fields,
            stored: self.stored,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Serializable description of a [`MemoryIndex`].
///
/// ```json
/// {
///   "max_doc": 2,
///   "deleted": [1],
///   "fields": [
///     { "name": "title", "stored": [[0, {"Text": "Hello"}]] },
///     { "name": "body", "text": [[0, "hello brave new world"]] },
///     { "name": "tags", "doc_values": {"type": "sorted_set", "values": [[0, ["a", "b"]]]} },
///     { "name": "year", "numeric": [{"doc": 0, "long": 2024}] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub max_doc: u64,
    /// Deleted ids; absent when the index does not track deletions.
    #[serde(default)]
    pub deleted: Option<Vec<u64>>,
    #[serde(default)]
    pub fields: Vec<FieldSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    #[serde(flatten)]
    pub info: FieldInfo,
    #[serde(default)]
    pub stored: Vec<(u64, StoredValue)>,
    #[serde(default)]
    pub doc_values: Option<DocValuesSnapshot>,
    #[serde(default)]
    pub term_vectors: Vec<(u64, Vec<TermVectorEntry>)>,
    /// Term → postings.
    #[serde(default)]
    pub postings: BTreeMap<String, Vec<Posting>>,
    /// Whitespace-tokenized text, indexed with positions.
    #[serde(default)]
    pub text: Vec<(u64, String)>,
    #[serde(default)]
    pub numeric: Vec<NumericSnapshot>,
}

/// A numeric value indexed as trie terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSnapshot {
    pub doc: u64,
    #[serde(default)]
    pub long: Option<i64>,
    #[serde(default)]
    pub int: Option<i32>,
    #[serde(default)]
    pub precision_step: Option<u32>,
}
