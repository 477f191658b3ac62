//! Recovery by scanning a field's whole term dictionary.
//!
//! This is the last resort and the most expensive source: every term of
//! the field is visited and its postings checked for the document. Positional
//! postings put each term back where it occurred. Postings without positions
//! only prove membership, so their terms pile up at position 0, except in
//! fields that turn out to hold trie-encoded numbers, where only the
//! full-precision term is decoded and the coarser ones are dropped.

use log::trace;

use crate::error::Result;
use crate::numeric::NumericKind;
use crate::reconstruct::numeric_hypothesis::NumericHypothesis;
use crate::reconstruct::sequence::GrowableStringArray;
use crate::reconstruct::source::{FieldContext, FieldSource};

#[derive(Debug, Default, Clone, Copy)]
pub struct PostingScanSource;

impl FieldSource for PostingScanSource {
    fn name(&self) -> &'static str {
        "posting scan"
    }

    fn pass_message(&self) -> Option<&'static str> {
        Some("Collecting terms ...")
    }

    fn progress_message(&self, field: &str) -> Option<String> {
        Some(format!("Collecting terms in {field} ..."))
    }

    fn collect(&self, ctx: &FieldContext<'_>) -> Result<Option<GrowableStringArray>> {
        let Some(terms) = ctx.index.terms(ctx.field)? else {
            return Ok(None);
        };
        let doc_id = ctx.doc_id;

        let scheme = NumericHypothesis::detect(terms.as_ref(), doc_id)?.active();
        if let Some(kind) = scheme {
            trace!("field '{}' holds {kind:?} values", ctx.field);
        }

        let mut seq = GrowableStringArray::new();
        let mut terms_enum = terms.iterator()?;
        while let Some(stats) = terms_enum.next()? {
            let Some(mut postings) = terms_enum.postings()? else {
                continue;
            };
            if !postings.seek_doc(doc_id)? {
                continue;
            }

            match postings.positions()? {
                Some(positions) if !positions.is_empty() => {
                    for position in positions {
                        seq.append(position, &stats.term);
                    }
                }
                _ => append_membership(&mut seq, &stats.term, scheme),
            }
        }

        Ok((!seq.is_empty()).then_some(seq))
    }
}

/// A term known only to occur in the document.
fn append_membership(seq: &mut GrowableStringArray, term: &str, scheme: Option<NumericKind>) {
    match scheme.map(|kind| kind.decode(term.as_bytes())) {
        Some(Ok(decoded)) => {
            if decoded.is_full_precision() {
                seq.append(0, &decoded.value.native_string());
                seq.append(0, &decoded.value.reinterpreted_string());
            }
        }
        _ => seq.append(0, term),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::MemoryIndex;
    use crate::index::posting::Posting;
    use crate::numeric::{self, double_to_sortable_long};

    fn collect(index: &MemoryIndex, field: &str, doc_id: u64) -> Option<GrowableStringArray> {
        let ctx = FieldContext {
            index,
            doc_id,
            field,
            info: None,
        };
        PostingScanSource.collect(&ctx).unwrap()
    }

    #[test]
    fn test_positional_postings() {
        let index = MemoryIndex::builder(2)
            .tokens("body", 0, &["the", "cat", "sat", "the", "end"])
            .tokens("body", 1, &["other"])
            .build()
            .unwrap();
        let seq = collect(&index, "body", 0).unwrap();
        assert_eq!(seq.to_text(" "), "the cat sat the end");
        assert_eq!(seq.size(), 5);
    }

    #[test]
    fn test_shared_positions_join() {
        let index = MemoryIndex::builder(1)
            .posting("body", "ran", Posting::with_positions(0, vec![2]))
            .posting("body", "run", Posting::with_positions(0, vec![2, 5]))
            .build()
            .unwrap();
        let seq = collect(&index, "body", 0).unwrap();
        assert_eq!(seq.get(2), Some("ran|run"));
        assert_eq!(seq.get(5), Some("run"));
    }

    #[test]
    fn test_membership_only_terms_at_zero() {
        let index = MemoryIndex::builder(2)
            .posting("kw", "beta", Posting::new(0))
            .posting("kw", "alpha", Posting::new(0))
            .posting("kw", "gamma", Posting::new(1))
            .build()
            .unwrap();
        let seq = collect(&index, "kw", 0).unwrap();
        assert_eq!(seq.get(0), Some("alpha|beta"));
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_long_field_decoded() {
        let index = MemoryIndex::builder(2)
            .long_value("n", 0, 42, 16)
            .long_value("n", 1, 7, 16)
            .build()
            .unwrap();
        let seq = collect(&index, "n", 0).unwrap();
        let expected = format!(
            "<long>42|<double>{:?}",
            numeric::sortable_long_to_double(42)
        );
        assert_eq!(seq.get(0), Some(expected.as_str()));
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_double_value_survives_reinterpretation() {
        let bits = double_to_sortable_long(2.5);
        let index = MemoryIndex::builder(1).long_value("price", 0, bits, 8).build().unwrap();
        let seq = collect(&index, "price", 0).unwrap();
        let slot = seq.get(0).unwrap();
        assert!(slot.ends_with("|<double>2.5"), "{slot}");
    }

    #[test]
    fn test_int_field_decoded() {
        let index = MemoryIndex::builder(1).int_value("n", 0, -3, 8).build().unwrap();
        let seq = collect(&index, "n", 0).unwrap();
        assert!(seq.get(0).unwrap().starts_with("<int>-3|<float>"));
    }

    #[test]
    fn test_bad_term_falls_back_to_raw_text() {
        let index = MemoryIndex::builder(1)
            .long_value("n", 0, 42, 16)
            .posting("n", "zebra", Posting::new(0))
            .build()
            .unwrap();
        let seq = collect(&index, "n", 0).unwrap();
        let raw: Vec<&str> = seq.get(0).unwrap().split('|').collect();
        // every trie term plus the bad one, raw
        assert_eq!(raw.len(), 5);
        assert!(raw.contains(&"zebra"));
        assert!(!raw.iter().any(|t| t.starts_with("<long>")));
    }

    #[test]
    fn test_document_without_terms() {
        let index = MemoryIndex::builder(2).tokens("body", 0, &["x"]).build().unwrap();
        assert!(collect(&index, "body", 1).is_none());
        assert!(collect(&index, "missing", 0).is_none());
    }
}
