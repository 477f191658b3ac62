//! Detection of prefix-coded numeric fields.
//!
//! A field whose postings carry no positions may hold trie-encoded numbers.
//! Nothing in the index says so, so the field's whole term dictionary is
//! tested against both encodings before any value is extracted: a single
//! term that does not decode rules an encoding out for the field.

use log::trace;

use crate::error::Result;
use crate::index::terms::Terms;
use crate::numeric::NumericKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SchemeState {
    /// No term has failed to decode yet.
    plausible: bool,
    /// A full-precision term has a posting for the document.
    observed: bool,
}

impl Default for SchemeState {
    fn default() -> Self {
        SchemeState {
            plausible: true,
            observed: false,
        }
    }
}

impl SchemeState {
    fn is_active(&self) -> bool {
        self.plausible && self.observed
    }
}

/// Per-field verdict on the two numeric encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumericHypothesis {
    long: SchemeState,
    int: SchemeState,
}

impl NumericHypothesis {
    /// Scan a field's term dictionary and decide which encoding, if any,
    /// explains every term while also holding a value for `doc_id`.
    pub fn detect(terms: &dyn Terms, doc_id: u64) -> Result<Self> {
        let mut hypothesis = NumericHypothesis::default();
        let mut terms_enum = terms.iterator()?;

        while let Some(stats) = terms_enum.next()? {
            let bytes = stats.term.as_bytes();
            for kind in [NumericKind::Long, NumericKind::Int] {
                let state = hypothesis.state_mut(kind);
                if !state.plausible {
                    continue;
                }
                match kind.decode(bytes) {
                    Err(err) => {
                        trace!("term {:?} is not a {kind:?} term: {err}", stats.term);
                        state.plausible = false;
                    }
                    Ok(decoded) if decoded.is_full_precision() && !state.observed => {
                        if let Some(mut postings) = terms_enum.postings()? {
                            if postings.seek_doc(doc_id)? {
                                state.observed = true;
                            }
                        }
                    }
                    Ok(_) => {}
                }
            }

            if !hypothesis.long.plausible && !hypothesis.int.plausible {
                break;
            }
        }

        trace!(
            "numeric hypothesis for doc {doc_id}: long={:?} int={:?}",
            hypothesis.long, hypothesis.int
        );
        Ok(hypothesis)
    }

    fn state_mut(&mut self, kind: NumericKind) -> &mut SchemeState {
        match kind {
            NumericKind::Long => &mut self.long,
            NumericKind::Int => &mut self.int,
        }
    }

    pub fn is_long_field(&self) -> bool {
        self.long.is_active()
    }

    pub fn is_int_field(&self) -> bool {
        self.int.is_active()
    }

    /// The encoding values are decoded with, long taking precedence.
    pub fn active(&self) -> Option<NumericKind> {
        if self.is_long_field() {
            Some(NumericKind::Long)
        } else if self.is_int_field() {
            Some(NumericKind::Int)
        } else {
            None
        }
    }
}
