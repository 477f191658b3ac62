//! Index-wide statistics.

use serde::Serialize;

use crate::error::Result;
use crate::index::field_info::FieldInfo;
use crate::index::reader::IndexAccess;

/// Overall information about an index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexInfo {
    pub fields: Vec<FieldInfo>,
    pub num_docs: u64,
    pub max_doc: u64,
    pub num_deleted_docs: u64,
    pub num_terms: u64,
    pub has_deletions: bool,
}

impl IndexInfo {
    /// Gather statistics. Fields are sorted by name.
    pub fn collect(index: &dyn IndexAccess, num_terms: u64) -> Result<Self> {
        let mut fields = index.field_infos()?;
        fields.sort_by(|a, b| a.name.cmp(&b.name));

        let max_doc = index.max_doc();
        let num_docs = index.num_docs();
        Ok(IndexInfo {
            fields,
            num_docs,
            max_doc,
            num_deleted_docs: max_doc.saturating_sub(num_docs),
            num_terms,
            has_deletions: num_docs < max_doc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::MemoryIndex;

    #[test]
    fn test_collect() {
        let index = MemoryIndex::builder(4)
            .stored(0, "z", "x")
            .tokens("a", 1, &["t"])
            .delete(3)
            .build()
            .unwrap();
        let info = IndexInfo::collect(&index, 1).unwrap();
        assert_eq!(info.fields[0].name, "a");
        assert_eq!(info.fields[1].name, "z");
        assert_eq!(info.num_docs, 3);
        assert_eq!(info.num_deleted_docs, 1);
        assert!(info.has_deletions);
    }
}
