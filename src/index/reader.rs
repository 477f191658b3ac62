//! Index access trait consumed by the reconstruction engine.

use bit_vec::BitVec;

use crate::error::Result;
use crate::index::field_info::FieldInfo;
use crate::index::stored::StoredField;
use crate::index::term_vector::TermVectorEntry;
use crate::index::terms::Terms;

/// Which parts of the index access surface a host actually provides.
///
/// Stored fields, field infos and postings form the minimum set; value
/// columns and term vectors are optional and simply skipped when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    pub stored_fields: bool,
    pub field_infos: bool,
    pub postings: bool,
    pub doc_values: bool,
    pub term_vectors: bool,
}

impl HostCapabilities {
    /// Names of the missing minimum capabilities.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.stored_fields {
            missing.push("stored fields");
        }
        if !self.field_infos {
            missing.push("field infos");
        }
        if !self.postings {
            missing.push("postings");
        }
        missing
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        HostCapabilities {
            stored_fields: true,
            field_infos: true,
            postings: true,
            doc_values: true,
            term_vectors: true,
        }
    }
}

/// Read-only view of one open index snapshot.
///
/// Document ids are valid in `0..max_doc()` while the snapshot stays open.
/// Every accessor may fail once the snapshot is closed.
pub trait IndexAccess: Send + Sync + std::fmt::Debug {
    /// One past the largest document id.
    fn max_doc(&self) -> u64;

    /// Get the number of live documents in the index.
    fn num_docs(&self) -> u64;

    /// Liveness bitset (bit set = live), `None` when the index does not
    /// track deletions.
    fn live_docs(&self) -> Option<&BitVec>;

    /// Definitions of every field in the index.
    fn field_infos(&self) -> Result<Vec<FieldInfo>>;

    /// Stored fields of a document, in stored order.
    fn document(&self, doc_id: u64) -> Result<Vec<StoredField>>;

    /// Binary value column entry.
    fn binary_doc_value(&self, field: &str, doc_id: u64) -> Result<Option<Vec<u8>>> {
        let _ = (field, doc_id);
        Ok(None)
    }

    /// Numeric value column entry.
    fn numeric_doc_value(&self, field: &str, doc_id: u64) -> Result<Option<i64>> {
        let _ = (field, doc_id);
        Ok(None)
    }

    /// Sorted value column entry, already resolved through its dictionary.
    fn sorted_doc_value(&self, field: &str, doc_id: u64) -> Result<Option<Vec<u8>>> {
        let _ = (field, doc_id);
        Ok(None)
    }

    /// Ordinals of a sorted-set value column entry, in ordinal order.
    fn sorted_set_ords(&self, field: &str, doc_id: u64) -> Result<Vec<u64>> {
        let _ = (field, doc_id);
        Ok(Vec::new())
    }

    /// Resolve a sorted-set ordinal.
    fn lookup_sorted_set_ord(&self, field: &str, ord: u64) -> Result<Option<Vec<u8>>> {
        let _ = (field, ord);
        Ok(None)
    }

    /// Term vector of a document for a field, if one was recorded.
    fn term_vector(&self, field: &str, doc_id: u64) -> Result<Option<Vec<TermVectorEntry>>> {
        let _ = (field, doc_id);
        Ok(None)
    }

    /// Term dictionary of a field, `None` when the field has no terms.
    fn terms(&self, field: &str) -> Result<Option<Box<dyn Terms>>>;

    /// Total number of distinct terms over all fields, if cheaply known.
    fn num_terms(&self) -> Option<u64> {
        None
    }

    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities::default()
    }

    /// Definition of a single field.
    fn field_info(&self, field: &str) -> Result<Option<FieldInfo>> {
        Ok(self.field_infos()?.into_iter().find(|info| info.name == field))
    }

    /// Sorted names of every field in the index.
    fn field_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.field_infos()?.into_iter().map(|i| i.name).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Whether the index marks a document deleted. Always `false` without
    /// liveness tracking.
    fn is_deleted(&self, doc_id: u64) -> bool {
        match self.live_docs() {
            Some(live) => !live.get(doc_id as usize).unwrap_or(false),
            None => false,
        }
    }
}
