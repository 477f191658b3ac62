//! Recovery from value columns.

use crate::error::Result;
use crate::index::field_info::DocValuesType;
use crate::reconstruct::sequence::GrowableStringArray;
use crate::reconstruct::source::{FieldContext, FieldSource};

/// Reads the per-document value column of a field.
///
/// Single-valued columns give one token at position 0. Sorted-set columns
/// give one token per ordinal at positions 0, 1, 2, ... in ordinal order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueColumnSource;

fn single(token: &str) -> GrowableStringArray {
    let mut seq = GrowableStringArray::new();
    seq.append(0, token);
    seq
}

impl FieldSource for ValueColumnSource {
    fn name(&self) -> &'static str {
        "value column"
    }

    fn collect(&self, ctx: &FieldContext<'_>) -> Result<Option<GrowableStringArray>> {
        let Some(info) = ctx.info else {
            return Ok(None);
        };
        let (index, field, doc_id) = (ctx.index, ctx.field, ctx.doc_id);

        let seq = match info.doc_values_type {
            DocValuesType::None => None,
            DocValuesType::Binary => index
                .binary_doc_value(field, doc_id)?
                .map(|bytes| single(&String::from_utf8_lossy(&bytes))),
            DocValuesType::Numeric => index
                .numeric_doc_value(field, doc_id)?
                .map(|value| single(&value.to_string())),
            DocValuesType::Sorted => index
                .sorted_doc_value(field, doc_id)?
                .map(|bytes| single(&String::from_utf8_lossy(&bytes))),
            DocValuesType::SortedSet => {
                let mut seq = GrowableStringArray::new();
                let mut position = 0u32;
                for ord in index.sorted_set_ords(field, doc_id)? {
                    if let Some(bytes) = index.lookup_sorted_set_ord(field, ord)? {
                        seq.append(position, &String::from_utf8_lossy(&bytes));
                        position += 1;
                    }
                }
                (!seq.is_empty()).then_some(seq)
            }
        };
        Ok(seq)
    }
}
