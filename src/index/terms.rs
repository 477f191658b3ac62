//! Term dictionaries.
//!
//! A field's [`Terms`] hands out [`TermsEnum`] cursors that walk its terms in
//! byte order and open a [`PostingIterator`] for the term under the cursor.
//! Reconstruction only ever walks a dictionary front to back, so a host
//! needs no random access into it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{PalimpsestError, Result};
use crate::index::posting::{MemoryPostingIterator, PostingIterator, PostingList};

/// A term and its corpus-wide counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermStats {
    pub term: String,
    /// Documents the term occurs in.
    pub doc_freq: u64,
    /// Occurrences over all documents.
    pub total_term_freq: u64,
}

/// Cursor over a term dictionary, in term order.
///
/// ```ignore
/// let terms = index.terms("body")?.unwrap();
/// let mut cursor = terms.iterator()?;
///
/// while let Some(stats) = cursor.next()? {
///     let mut postings = cursor.postings()?.unwrap();
///     println!("{}: in doc 3 = {}", stats.term, postings.seek_doc(3)?);
/// }
/// ```
pub trait TermsEnum: Send {
    /// Step to the following term; `None` past the last one.
    fn next(&mut self) -> Result<Option<TermStats>>;

    fn current(&self) -> Option<&TermStats>;

    /// Postings of the current term, `None` when not positioned on a term.
    fn postings(&self) -> Result<Option<Box<dyn PostingIterator>>>;
}

/// The term dictionary of one field.
pub trait Terms: Send + Sync {
    fn iterator(&self) -> Result<Box<dyn TermsEnum>>;

    /// Distinct terms in the field, `None` when the host cannot say cheaply.
    fn size(&self) -> Option<u64>;

    /// Whether postings report token positions.
    fn has_positions(&self) -> bool {
        false
    }

    fn has_offsets(&self) -> bool {
        false
    }
}

/// Sorted term map shared between a field's [`MemoryTerms`] handles.
pub type TermMap = BTreeMap<String, Arc<PostingList>>;

/// In-memory term dictionary of one field.
#[derive(Debug, Clone)]
pub struct MemoryTerms {
    terms: Arc<TermMap>,
    has_positions: bool,
    has_offsets: bool,
    /// Set when the owning index is closed; enumeration fails afterwards.
    closed: Arc<AtomicBool>,
}

impl MemoryTerms {
    pub fn new(terms: Arc<TermMap>, has_positions: bool, has_offsets: bool) -> Self {
        MemoryTerms {
            terms,
            has_positions,
            has_offsets,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share the owning index's close flag.
    pub fn with_close_flag(mut self, closed: Arc<AtomicBool>) -> Self {
        self.closed = closed;
        self
    }
}

impl Terms for MemoryTerms {
    fn iterator(&self) -> Result<Box<dyn TermsEnum>> {
        Ok(Box::new(MemoryTermsEnum {
            lists: self.terms.values().cloned().collect(),
            upcoming: 0,
            current: None,
            has_positions: self.has_positions,
            has_offsets: self.has_offsets,
            closed: Arc::clone(&self.closed),
        }))
    }

    fn size(&self) -> Option<u64> {
        Some(self.terms.len() as u64)
    }

    fn has_positions(&self) -> bool {
        self.has_positions
    }

    fn has_offsets(&self) -> bool {
        self.has_offsets
    }
}

/// Cursor over a [`MemoryTerms`] snapshot.
struct MemoryTermsEnum {
    /// Posting lists in term order.
    lists: Vec<Arc<PostingList>>,
    /// Slot `next()` reads.
    upcoming: usize,
    current: Option<(usize, TermStats)>,
    has_positions: bool,
    has_offsets: bool,
    closed: Arc<AtomicBool>,
}

impl MemoryTermsEnum {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PalimpsestError::IndexClosed);
        }
        Ok(())
    }

    fn land_on(&mut self, slot: usize) -> TermStats {
        let stats = self.lists[slot].stats();
        self.current = Some((slot, stats.clone()));
        self.upcoming = slot + 1;
        stats
    }
}

impl TermsEnum for MemoryTermsEnum {
    fn next(&mut self) -> Result<Option<TermStats>> {
        self.ensure_open()?;
        if self.upcoming < self.lists.len() {
            Ok(Some(self.land_on(self.upcoming)))
        } else {
            self.current = None;
            Ok(None)
        }
    }

    fn current(&self) -> Option<&TermStats> {
        self.current.as_ref().map(|(_, stats)| stats)
    }

    fn postings(&self) -> Result<Option<Box<dyn PostingIterator>>> {
        self.ensure_open()?;
        let Some((slot, _)) = &self.current else {
            return Ok(None);
        };
        let cursor = MemoryPostingIterator::new(
            Arc::clone(&self.lists[*slot]),
            self.has_positions,
            self.has_offsets,
        );
        Ok(Some(Box::new(cursor)))
    }
}
