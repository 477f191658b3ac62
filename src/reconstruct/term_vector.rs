//! Recovery from per-document term vectors.

use crate::error::Result;
use crate::reconstruct::sequence::GrowableStringArray;
use crate::reconstruct::source::{FieldContext, FieldSource};

/// Lays a document's term vector back out by position. Entries recorded
/// without positions all land at position 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct TermVectorSource;

impl FieldSource for TermVectorSource {
    fn name(&self) -> &'static str {
        "term vector"
    }

    fn pass_message(&self) -> Option<&'static str> {
        Some("Checking term vectors ...")
    }

    fn progress_message(&self, field: &str) -> Option<String> {
        Some(format!("Checking term vectors for '{field}' ..."))
    }

    fn collect(&self, ctx: &FieldContext<'_>) -> Result<Option<GrowableStringArray>> {
        let Some(entries) = ctx.index.term_vector(ctx.field, ctx.doc_id)? else {
            return Ok(None);
        };
        if entries.is_empty() {
            return Ok(None);
        }

        let mut seq = GrowableStringArray::new();
        for entry in &entries {
            match entry.positions.as_deref() {
                Some(positions) if !positions.is_empty() => {
                    for &position in positions {
                        seq.append(position, &entry.term);
                    }
                }
                _ => seq.append(0, &entry.term),
            }
        }
        Ok(Some(seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::MemoryIndex;
    use crate::index::term_vector::TermVectorEntry;

    fn collect(index: &MemoryIndex, field: &str, doc_id: u64) -> Option<GrowableStringArray> {
        let ctx = FieldContext {
            index,
            doc_id,
            field,
            info: None,
        };
        TermVectorSource.collect(&ctx).unwrap()
    }

    #[test]
    fn test_positions_restore_layout() {
        let index = MemoryIndex::builder(1)
            .term_vector("body", 0, vec![
                TermVectorEntry::new("ran").with_positions(vec![2]),
                TermVectorEntry::new("run").with_positions(vec![2, 5]),
                TermVectorEntry::new("she").with_positions(vec![0]),
            ])
            .build()
            .unwrap();
        let seq = collect(&index, "body", 0).unwrap();
        assert_eq!(seq.get(0), Some("she"));
        assert_eq!(seq.get(2), Some("ran|run"));
        assert_eq!(seq.get(5), Some("run"));
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_without_positions_everything_at_zero() {
        let index = MemoryIndex::builder(1)
            .term_vector("body", 0, vec![
                TermVectorEntry::new("a").with_freq(2),
                TermVectorEntry::new("b"),
            ])
            .build()
            .unwrap();
        let seq = collect(&index, "body", 0).unwrap();
        assert_eq!(seq.get(0), Some("a|b"));
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_absent_or_empty_vector() {
        let index = MemoryIndex::builder(2)
            .term_vector("body", 0, Vec::new())
            .build()
            .unwrap();
        assert!(collect(&index, "body", 0).is_none());
        assert!(collect(&index, "body", 1).is_none());
    }
}
