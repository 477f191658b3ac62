//! Postings: the per-term list of documents a term occurs in.
//!
//! [`PostingIterator`] is the cursor the reconstruction engine walks to test
//! whether a term occurs in a document and, when the field was indexed with
//! positions, where. [`PostingList`] and [`MemoryPostingIterator`] are the
//! in-memory representation used by [`crate::index::memory::MemoryIndex`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::terms::TermStats;

/// Sentinel doc id of an exhausted iterator.
pub const NO_MORE_DOCS: u64 = u64::MAX;

/// One document's entry for a term.
///
/// In snapshots a posting without `positions` is membership-only, the shape
/// trie-encoded numeric terms are indexed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: u64,
    #[serde(default = "one")]
    pub freq: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<u32>>,
    /// Character offsets (start, end) parallel to `positions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offsets: Option<Vec<(u32, u32)>>,
}

fn one() -> u32 {
    1
}

impl Posting {
    /// Membership-only posting.
    pub fn new(doc_id: u64) -> Self {
        Posting {
            doc_id,
            freq: 1,
            positions: None,
            offsets: None,
        }
    }

    /// Posting whose frequency is the number of positions.
    pub fn with_positions(doc_id: u64, positions: Vec<u32>) -> Self {
        Posting {
            doc_id,
            freq: positions.len() as u32,
            positions: Some(positions),
            offsets: None,
        }
    }

    pub fn with_offsets(mut self, offsets: Vec<(u32, u32)>) -> Self {
        self.offsets = Some(offsets);
        self
    }

    pub fn positions(&self) -> Option<&[u32]> {
        self.positions.as_deref()
    }

    /// Fold a second posting for the same document into this one.
    fn absorb(&mut self, other: Posting) {
        self.freq += other.freq;
        if let Some(more) = other.positions {
            let positions = self.positions.get_or_insert_with(Vec::new);
            positions.extend(more);
            positions.sort_unstable();
        }
        if let Some(more) = other.offsets {
            let offsets = self.offsets.get_or_insert_with(Vec::new);
            offsets.extend(more);
            offsets.sort_unstable();
        }
    }
}

/// All postings of one term, ordered by document id with at most one entry
/// per document.
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    term: String,
    docs: Vec<Posting>,
    total_term_freq: u64,
}

impl PostingList {
    pub fn new(term: String) -> Self {
        PostingList {
            term,
            ..Default::default()
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Insert in doc id order. A second posting for a document already in
    /// the list is merged into the existing one.
    pub fn add_posting(&mut self, posting: Posting) {
        self.total_term_freq += u64::from(posting.freq);
        match self.docs.binary_search_by_key(&posting.doc_id, |p| p.doc_id) {
            Ok(at) => self.docs[at].absorb(posting),
            Err(at) => self.docs.insert(at, posting),
        }
    }

    pub fn doc_freq(&self) -> u64 {
        self.docs.len() as u64
    }

    /// Largest document id in the list.
    pub fn last_doc(&self) -> Option<u64> {
        self.docs.last().map(|p| p.doc_id)
    }

    pub fn postings(&self) -> &[Posting] {
        &self.docs
    }

    pub fn stats(&self) -> TermStats {
        TermStats {
            term: self.term.clone(),
            doc_freq: self.doc_freq(),
            total_term_freq: self.total_term_freq,
        }
    }
}

/// Cursor over the documents of one term.
///
/// `doc_id`, `freq`, `positions` and `offsets` describe the document the
/// cursor sits on, and are only meaningful after `next` or `skip_to`
/// returned `true`.
pub trait PostingIterator: Send + std::fmt::Debug {
    /// Current document, [`NO_MORE_DOCS`] once exhausted.
    fn doc_id(&self) -> u64;

    fn freq(&self) -> u64;

    /// Positions in the current document, `None` when the field was indexed
    /// without positions.
    fn positions(&self) -> Result<Option<Vec<u32>>>;

    fn offsets(&self) -> Result<Option<Vec<(u32, u32)>>> {
        Ok(None)
    }

    fn next(&mut self) -> Result<bool>;

    /// Advance to the first document at or after `target`. Never moves
    /// backwards.
    fn skip_to(&mut self, target: u64) -> Result<bool>;

    /// Whether the term occurs in `target`, leaving the cursor there on a hit.
    fn seek_doc(&mut self, target: u64) -> Result<bool> {
        Ok(self.skip_to(target)? && self.doc_id() == target)
    }
}

/// Posting iterator over a shared in-memory posting list.
#[derive(Debug)]
pub struct MemoryPostingIterator {
    list: Arc<PostingList>,
    /// `None` before the first move.
    cursor: Option<usize>,
    has_positions: bool,
    has_offsets: bool,
}

impl MemoryPostingIterator {
    pub fn new(list: Arc<PostingList>, has_positions: bool, has_offsets: bool) -> Self {
        MemoryPostingIterator {
            list,
            cursor: None,
            has_positions,
            has_offsets,
        }
    }

    fn at(&self) -> Option<&Posting> {
        self.cursor.and_then(|i| self.list.docs.get(i))
    }
}

impl PostingIterator for MemoryPostingIterator {
    fn doc_id(&self) -> u64 {
        self.at().map_or(NO_MORE_DOCS, |p| p.doc_id)
    }

    fn freq(&self) -> u64 {
        self.at().map_or(0, |p| u64::from(p.freq))
    }

    fn positions(&self) -> Result<Option<Vec<u32>>> {
        if !self.has_positions {
            return Ok(None);
        }
        Ok(self.at().map(|p| p.positions.clone().unwrap_or_default()))
    }

    fn offsets(&self) -> Result<Option<Vec<(u32, u32)>>> {
        if !self.has_offsets {
            return Ok(None);
        }
        Ok(self.at().and_then(|p| p.offsets.clone()))
    }

    fn next(&mut self) -> Result<bool> {
        let len = self.list.docs.len();
        let next = self.cursor.map_or(0, |i| i + 1).min(len);
        self.cursor = Some(next);
        Ok(next < len)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        let docs = &self.list.docs;
        let from = self.cursor.unwrap_or(0).min(docs.len());
        let found = from + docs[from..].partition_point(|p| p.doc_id < target);
        self.cursor = Some(found);
        Ok(found < docs.len())
    }
}
