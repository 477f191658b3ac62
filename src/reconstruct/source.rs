//! Fallback sources for fields without stored values.
//!
//! Each source recovers a field's tokens from one index structure. The
//! engine consults them in order, and a field leaves the running as soon as
//! one source yields something for it.

use std::fmt::Debug;

use crate::error::Result;
use crate::index::field_info::FieldInfo;
use crate::index::reader::IndexAccess;
use crate::reconstruct::sequence::GrowableStringArray;

/// What a source needs to know about the field being recovered.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub index: &'a dyn IndexAccess,
    pub doc_id: u64,
    pub field: &'a str,
    /// `None` when the host does not know the field.
    pub info: Option<&'a FieldInfo>,
}

/// One index structure tokens can be recovered from.
pub trait FieldSource: Send + Sync + Debug {
    /// Short name used in logs and error contexts.
    fn name(&self) -> &'static str;

    /// Progress message announcing the pass over all pending fields.
    fn pass_message(&self) -> Option<&'static str> {
        None
    }

    /// Per-field progress message. Sources that never report return `None`.
    fn progress_message(&self, field: &str) -> Option<String> {
        let _ = field;
        None
    }

    /// Recover the field for the document. `None` leaves the field to the
    /// next source.
    fn collect(&self, ctx: &FieldContext<'_>) -> Result<Option<GrowableStringArray>>;
}
