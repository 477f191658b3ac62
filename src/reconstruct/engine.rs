//! The reconstruction engine.
//!
//! [`DocReconstructor`] rebuilds a document field by field from whatever the
//! index still holds. Sources are consulted from most to least faithful:
//!
//! 1. stored fields, kept verbatim;
//! 2. value columns;
//! 3. term vectors;
//! 4. a scan of the field's term dictionary.
//!
//! A field is taken from the first source that has data for it. The last
//! three only ever produce approximations: analysis already dropped case,
//! stop words and everything that did not make it into a term.

use std::sync::Arc;

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{PalimpsestError, Result};
use crate::index::field_info::FieldInfo;
use crate::index::reader::IndexAccess;
use crate::reconstruct::document::Reconstructed;
use crate::reconstruct::posting_scan::PostingScanSource;
use crate::reconstruct::progress::{ProgressNotification, ProgressSink};
use crate::reconstruct::source::{FieldContext, FieldSource};
use crate::reconstruct::term_vector::TermVectorSource;
use crate::reconstruct::value_column::ValueColumnSource;

/// Configuration for a [`DocReconstructor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructorConfig {
    /// Fields to reconstruct, in order. Empty means every field the index
    /// reports, sorted by name.
    #[serde(default)]
    pub fields: Vec<String>,

    /// Total number of terms in the index, if already known.
    #[serde(default)]
    pub num_terms: Option<u64>,
}

impl ReconstructorConfig {
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_num_terms(mut self, num_terms: u64) -> Self {
        self.num_terms = Some(num_terms);
        self
    }
}

/// Rebuilds documents from one open index.
///
/// ```
/// use std::sync::Arc;
///
/// use palimpsest::index::memory::MemoryIndex;
/// use palimpsest::reconstruct::{DocReconstructor, ReconstructorConfig};
///
/// let index = MemoryIndex::builder(1)
///     .stored(0, "title", "Hello")
///     .tokens("body", 0, &["hello", "brave", "new", "world"])
///     .build()
///     .unwrap();
///
/// let reconstructor = DocReconstructor::new(Arc::new(index), ReconstructorConfig::default()).unwrap();
/// let doc = reconstructor.reconstruct(0).unwrap();
///
/// assert!(doc.is_stored("title"));
/// assert_eq!(doc.recovered("body").unwrap().to_text(" "), "hello brave new world");
/// ```
pub struct DocReconstructor {
    index: Arc<dyn IndexAccess>,
    fields: Vec<String>,
    num_terms: u64,
    sources: Vec<Box<dyn FieldSource>>,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl std::fmt::Debug for DocReconstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocReconstructor")
            .field("fields", &self.fields)
            .field("num_terms", &self.num_terms)
            .field("sources", &self.sources)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl DocReconstructor {
    /// Prepare a reconstructor. Fails with `UnsupportedHost` when the index
    /// lacks stored fields, field definitions or postings.
    pub fn new(index: Arc<dyn IndexAccess>, config: ReconstructorConfig) -> Result<Self> {
        let missing = index.capabilities().missing_required();
        if !missing.is_empty() {
            return Err(PalimpsestError::unsupported_host(format!(
                "index does not provide {}",
                missing.join(", ")
            )));
        }

        let fields = if config.fields.is_empty() {
            index
                .field_names()
                .map_err(|e| PalimpsestError::host_access("reading field names", e))?
        } else {
            config.fields
        };

        let num_terms = match config.num_terms.or_else(|| index.num_terms()) {
            Some(n) => n,
            None => count_terms(index.as_ref())
                .map_err(|e| PalimpsestError::host_access("counting terms", e))?,
        };

        debug!(
            "reconstructor ready: {} fields, {num_terms} terms",
            fields.len()
        );

        Ok(DocReconstructor {
            index,
            fields,
            num_terms,
            sources: vec![
                Box::new(ValueColumnSource),
                Box::new(TermVectorSource),
                Box::new(PostingScanSource),
            ],
            progress: None,
        })
    }

    /// Deliver progress notifications to `sink`.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Total number of distinct terms in the index.
    pub fn num_terms(&self) -> u64 {
        self.num_terms
    }

    pub fn index(&self) -> &Arc<dyn IndexAccess> {
        &self.index
    }

    fn notify(&self, notification: ProgressNotification) {
        if let Some(sink) = &self.progress {
            sink.notify(&notification);
        }
    }

    /// Reconstruct one document.
    ///
    /// Fails with `OutOfRange` for ids at or past `max_doc`, with
    /// `DeletedDocument` for ids the index marks deleted, and with
    /// `HostAccess` when any read from the index fails along the way.
    pub fn reconstruct(&self, doc_id: u64) -> Result<Reconstructed> {
        let index = self.index.as_ref();
        let max_doc = index.max_doc();
        if doc_id >= max_doc {
            return Err(PalimpsestError::out_of_range(doc_id, max_doc));
        }
        if index.is_deleted(doc_id) {
            return Err(PalimpsestError::DeletedDocument(doc_id));
        }

        let mut result = Reconstructed::new();
        let mut unresolved: Vec<&str> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if !unresolved.contains(&field.as_str()) {
                unresolved.push(field.as_str());
            }
        }

        // stored fields, one pass over the document
        let stored = index
            .document(doc_id)
            .map_err(|e| PalimpsestError::host_access(format!("reading document {doc_id}"), e))?;
        let mut by_field: AHashMap<&str, Vec<_>> = AHashMap::new();
        for field in &stored {
            by_field
                .entry(field.name.as_str())
                .or_default()
                .push(field.value.clone());
        }
        unresolved.retain(|field| match by_field.remove(field) {
            Some(values) => {
                debug!("doc {doc_id}: '{field}' from stored fields");
                result.insert_stored(field.to_string(), values);
                false
            }
            None => true,
        });

        let infos: AHashMap<String, FieldInfo> = index
            .field_infos()
            .map_err(|e| PalimpsestError::host_access("reading field infos", e))?
            .into_iter()
            .map(|info| (info.name.clone(), info))
            .collect();

        for source in &self.sources {
            if unresolved.is_empty() {
                break;
            }
            debug!(
                "doc {doc_id}: {} pass over {} fields",
                source.name(),
                unresolved.len()
            );

            let pending = unresolved.clone();
            let total = pending.len() as u64;
            if let Some(message) = source.pass_message() {
                self.notify(ProgressNotification::new(message, 0, total));
            }

            for (n, field) in pending.into_iter().enumerate() {
                if let Some(message) = source.progress_message(field) {
                    self.notify(ProgressNotification::new(message, n as u64 + 1, total));
                }

                let ctx = FieldContext {
                    index,
                    doc_id,
                    field,
                    info: infos.get(field),
                };
                let collected = source.collect(&ctx).map_err(|e| {
                    PalimpsestError::host_access(
                        format!("{} of field '{field}' in document {doc_id}", source.name()),
                        e,
                    )
                })?;

                if let Some(seq) = collected {
                    debug!(
                        "doc {doc_id}: '{field}' from {} ({} positions)",
                        source.name(),
                        seq.len()
                    );
                    result.insert_recovered(field.to_string(), seq);
                    unresolved.retain(|f| *f != field);
                }
            }
        }

        if !unresolved.is_empty() {
            debug!("doc {doc_id}: nothing recovered for {unresolved:?}");
        }

        self.notify(ProgressNotification::new("Done.", 100, 100));

        Ok(result)
    }
}

/// Count distinct terms over every field by enumeration.
fn count_terms(index: &dyn IndexAccess) -> Result<u64> {
    let mut total = 0;
    for field in index.field_names()? {
        if let Some(terms) = index.terms(&field)? {
            let mut terms_enum = terms.iterator()?;
            while terms_enum.next()?.is_some() {
                total += 1;
            }
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::doc_values::DocValuesColumn;
    use crate::index::memory::MemoryIndex;
    use crate::index::reader::HostCapabilities;
    use crate::index::stored::{StoredField, StoredValue};
    use crate::index::term_vector::TermVectorEntry;
    use crate::index::terms::Terms;
    use crate::reconstruct::progress::ProgressLog;

    fn reconstructor(index: MemoryIndex) -> DocReconstructor {
        DocReconstructor::new(Arc::new(index), ReconstructorConfig::default()).unwrap()
    }

    #[test]
    fn test_earlier_sources_win() {
        let index = MemoryIndex::builder(1)
            .stored(0, "title", "Stored Title")
            .tokens("title", 0, &["stored", "title"])
            .doc_values("cat", DocValuesColumn::sorted(vec![(0u64, "books")]))
            .tokens("cat", 0, &["ignored"])
            .term_vector("body", 0, vec![TermVectorEntry::new("vector").with_positions(vec![0])])
            .tokens("body", 0, &["postings"])
            .tokens("rest", 0, &["only", "postings"])
            .build()
            .unwrap();
        let doc = reconstructor(index).reconstruct(0).unwrap();

        assert_eq!(doc.stored("title").unwrap(), &[StoredValue::from("Stored Title")]);
        assert!(doc.recovered("title").is_none());
        assert_eq!(doc.recovered("cat").unwrap().to_text(" "), "books");
        assert_eq!(doc.recovered("body").unwrap().to_text(" "), "vector");
        assert_eq!(doc.recovered("rest").unwrap().to_text(" "), "only postings");
        assert_eq!(doc.field_names(), vec!["body", "cat", "rest", "title"]);
    }

    #[test]
    fn test_explicit_field_list() {
        let index = MemoryIndex::builder(1)
            .stored(0, "a", "1")
            .stored(0, "b", "2")
            .build()
            .unwrap();
        let config = ReconstructorConfig::default().with_fields(["b", "zzz"]);
        let reconstructor = DocReconstructor::new(Arc::new(index), config).unwrap();
        let doc = reconstructor.reconstruct(0).unwrap();
        assert_eq!(doc.field_names(), vec!["b"]);
    }

    #[test]
    fn test_num_terms() {
        let index = MemoryIndex::builder(1)
            .tokens("x", 0, &["a", "b"])
            .tokens("y", 0, &["a"])
            .build()
            .unwrap();
        assert_eq!(reconstructor(index).num_terms(), 3);

        let index = MemoryIndex::builder(1).build().unwrap();
        let config = ReconstructorConfig::default().with_num_terms(99);
        let reconstructor = DocReconstructor::new(Arc::new(index), config).unwrap();
        assert_eq!(reconstructor.num_terms(), 99);
    }

    #[test]
    fn test_range_and_deletion_checks() {
        let index = MemoryIndex::builder(3).delete(1).build().unwrap();
        let reconstructor = reconstructor(index);
        assert!(matches!(
            reconstructor.reconstruct(3),
            Err(PalimpsestError::OutOfRange { doc_id: 3, max_doc: 3 })
        ));
        assert!(matches!(
            reconstructor.reconstruct(1),
            Err(PalimpsestError::DeletedDocument(1))
        ));
        assert!(reconstructor.reconstruct(2).unwrap().is_empty());
    }

    #[test]
    fn test_progress_events() {
        let index = MemoryIndex::builder(1)
            .stored(0, "title", "x")
            .term_vector("a", 0, vec![TermVectorEntry::new("t")])
            .tokens("b", 0, &["u"])
            .build()
            .unwrap();
        let log = Arc::new(ProgressLog::new());
        let reconstructor = reconstructor(index).with_progress_sink(log.clone());
        reconstructor.reconstruct(0).unwrap();

        assert_eq!(log.messages(), vec![
            "Checking term vectors ...",
            "Checking term vectors for 'a' ...",
            "Checking term vectors for 'b' ...",
            "Collecting terms ...",
            "Collecting terms in b ...",
            "Done.",
        ]);
        let events = log.events();
        assert_eq!(events[2].current, 2);
        assert_eq!(events[2].max, 2);
        assert_eq!(events[4].max, 1);
        assert!(events.iter().all(|e| !e.aborted));
    }

    #[derive(Debug)]
    struct StoredOnly;

    impl IndexAccess for StoredOnly {
        fn max_doc(&self) -> u64 {
            1
        }
        fn num_docs(&self) -> u64 {
            1
        }
        fn live_docs(&self) -> Option<&bit_vec::BitVec> {
            None
        }
        fn field_infos(&self) -> Result<Vec<FieldInfo>> {
            Ok(vec![FieldInfo::new("f")])
        }
        fn document(&self, _doc_id: u64) -> Result<Vec<StoredField>> {
            Ok(vec![StoredField::new("f", "v")])
        }
        fn terms(&self, _field: &str) -> Result<Option<Box<dyn Terms>>> {
            Ok(None)
        }
        fn capabilities(&self) -> HostCapabilities {
            HostCapabilities {
                postings: false,
                ..HostCapabilities::default()
            }
        }
    }

    #[test]
    fn test_unsupported_host() {
        let err = DocReconstructor::new(Arc::new(StoredOnly), ReconstructorConfig::default())
            .unwrap_err();
        assert!(matches!(err, PalimpsestError::UnsupportedHost(_)));
        assert!(err.to_string().contains("postings"));
    }

    #[test]
    fn test_closed_index_fails_call() {
        let index = Arc::new(
            MemoryIndex::builder(1)
                .tokens("body", 0, &["x"])
                .build()
                .unwrap(),
        );
        let reconstructor =
            DocReconstructor::new(index.clone(), ReconstructorConfig::default()).unwrap();
        index.close();
        assert!(matches!(
            reconstructor.reconstruct(0),
            Err(PalimpsestError::HostAccess { .. })
        ));
    }
}
