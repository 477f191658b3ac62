#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bit_vec::BitVec;
    use palimpsest::error::{PalimpsestError, Result};
    use palimpsest::index::doc_values::DocValuesColumn;
    use palimpsest::index::field_info::FieldInfo;
    use palimpsest::index::memory::MemoryIndex;
    use palimpsest::index::posting::Posting;
    use palimpsest::index::reader::IndexAccess;
    use palimpsest::index::stored::{StoredField, StoredValue};
    use palimpsest::index::term_vector::TermVectorEntry;
    use palimpsest::index::terms::Terms;
    use palimpsest::numeric;
    use palimpsest::reconstruct::{
        DocReconstructor, ProgressLog, ProgressNotification, ReconstructorConfig,
    };

    fn reconstructor(index: MemoryIndex) -> DocReconstructor {
        DocReconstructor::new(Arc::new(index), ReconstructorConfig::default()).unwrap()
    }

    #[test]
    fn test_stored_values_come_back_verbatim() {
        let index = MemoryIndex::builder(1)
            .stored(0, "author", "Ann")
            .stored(0, "author", "Bob")
            .stored(0, "blob", StoredValue::Binary(vec![1, 2, 3]))
            .stored(0, "year", 1999i64)
            .build()
            .unwrap();
        let doc = reconstructor(index).reconstruct(0).unwrap();

        assert_eq!(
            doc.stored("author").unwrap(),
            &[StoredValue::from("Ann"), StoredValue::from("Bob")]
        );
        assert_eq!(doc.stored("blob").unwrap(), &[StoredValue::Binary(vec![1, 2, 3])]);
        assert_eq!(doc.stored("year").unwrap(), &[StoredValue::Long(1999)]);
        assert!(doc.recovered_fields().is_empty());
    }

    #[test]
    fn test_sorted_set_column_positions() {
        let index = MemoryIndex::builder(1)
            .doc_values("tags", DocValuesColumn::sorted_set(vec![(0u64, vec!["b", "c", "a"])]))
            .build()
            .unwrap();
        let doc = reconstructor(index).reconstruct(0).unwrap();
        let tags = doc.recovered("tags").unwrap();

        assert_eq!(tags.get(0), Some("a"));
        assert_eq!(tags.get(1), Some("b"));
        assert_eq!(tags.get(2), Some("c"));
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_term_vector_collisions() {
        let index = MemoryIndex::builder(1)
            .term_vector("body", 0, vec![
                TermVectorEntry::new("ran").with_positions(vec![2]),
                TermVectorEntry::new("run").with_positions(vec![2, 5]),
            ])
            .build()
            .unwrap();
        let doc = reconstructor(index).reconstruct(0).unwrap();
        let body = doc.recovered("body").unwrap();

        assert_eq!(body.get(2), Some("ran|run"));
        assert_eq!(body.get(5), Some("run"));
        assert_eq!(body.get(3), None);
    }

    #[test]
    fn test_long_field_recovered_in_both_forms() {
        let index = MemoryIndex::builder(3)
            .long_value("count", 0, 42, 4)
            .long_value("count", 1, 1_000_000, 4)
            .long_value("count", 2, -5, 4)
            .build()
            .unwrap();
        let doc = reconstructor(index).reconstruct(0).unwrap();
        let count = doc.recovered("count").unwrap();

        let expected = format!("<long>42|<double>{:?}", numeric::sortable_long_to_double(42));
        assert_eq!(count.get(0), Some(expected.as_str()));
        // coarser trie terms never contribute
        assert_eq!(count.len(), 1);
        assert_eq!(count.get(0).unwrap().matches("<long>").count(), 1);
    }

    #[test]
    fn test_float_field_decoded_as_int() {
        let bits = numeric::float_to_sortable_int(1.5);
        let index = MemoryIndex::builder(1)
            .int_value("weight", 0, bits, 8)
            .build()
            .unwrap();
        let doc = reconstructor(index).reconstruct(0).unwrap();
        let weight = doc.recovered("weight").unwrap().get(0).unwrap();
        assert_eq!(weight, format!("<int>{bits}|<float>1.5"));
    }

    #[test]
    fn test_single_bad_term_turns_field_into_text() {
        let index = MemoryIndex::builder(1)
            .long_value("count", 0, 42, 16)
            .posting("count", "oops", Posting::new(0))
            .build()
            .unwrap();
        let doc = reconstructor(index).reconstruct(0).unwrap();
        let slot = doc.recovered("count").unwrap().get(0).unwrap().to_string();

        assert!(slot.split('|').any(|t| t == "oops"));
        assert!(!slot.contains("<long>"));
        assert!(!slot.contains("<double>"));
    }

    #[test]
    fn test_out_of_range() {
        let reconstructor = reconstructor(MemoryIndex::builder(5).build().unwrap());
        let err = reconstructor.reconstruct(5).unwrap_err();
        assert!(matches!(err, PalimpsestError::OutOfRange { doc_id: 5, max_doc: 5 }));
        assert!(err.is_recoverable());
        assert!(reconstructor.reconstruct(4).is_ok());
    }

    #[test]
    fn test_deleted_only_when_liveness_tracked() {
        let tracked = reconstructor(
            MemoryIndex::builder(3)
                .stored(1, "title", "gone")
                .delete(1)
                .build()
                .unwrap(),
        );
        assert!(matches!(
            tracked.reconstruct(1),
            Err(PalimpsestError::DeletedDocument(1))
        ));

        let untracked = reconstructor(
            MemoryIndex::builder(3)
                .stored(1, "title", "still here")
                .build()
                .unwrap(),
        );
        let doc = untracked.reconstruct(1).unwrap();
        assert_eq!(doc.stored("title").unwrap(), &[StoredValue::from("still here")]);
    }

    #[test]
    fn test_idempotent() {
        let index = MemoryIndex::builder(2)
            .stored(0, "title", "t")
            .tokens("body", 0, &["one", "two", "one"])
            .long_value("n", 0, 9, 16)
            .doc_values("dv", DocValuesColumn::numeric(vec![(0, 3)]))
            .build()
            .unwrap();
        let reconstructor = reconstructor(index);
        let first = reconstructor.reconstruct(0).unwrap();
        let second = reconstructor.reconstruct(0).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.recovered("body").unwrap().to_text(" "), "one two one");
        assert_eq!(first.recovered("dv").unwrap().get(0), Some("3"));
    }

    #[test]
    fn test_closing_index_aborts_with_host_access() {
        let index = Arc::new(
            MemoryIndex::builder(1)
                .stored(0, "title", "t")
                .tokens("body", 0, &["x"])
                .build()
                .unwrap(),
        );
        let reconstructor =
            DocReconstructor::new(index.clone(), ReconstructorConfig::default()).unwrap();
        assert!(reconstructor.reconstruct(0).is_ok());

        index.close();
        let err = reconstructor.reconstruct(0).unwrap_err();
        assert!(matches!(err, PalimpsestError::HostAccess { .. }));
        assert!(!err.is_recoverable());
    }

    /// Delegates to a memory index but fails every term dictionary lookup.
    #[derive(Debug)]
    struct BrokenPostings(MemoryIndex);

    impl IndexAccess for BrokenPostings {
        fn max_doc(&self) -> u64 {
            self.0.max_doc()
        }
        fn num_docs(&self) -> u64 {
            self.0.num_docs()
        }
        fn live_docs(&self) -> Option<&BitVec> {
            self.0.live_docs()
        }
        fn field_infos(&self) -> Result<Vec<FieldInfo>> {
            self.0.field_infos()
        }
        fn document(&self, doc_id: u64) -> Result<Vec<StoredField>> {
            self.0.document(doc_id)
        }
        fn terms(&self, field: &str) -> Result<Option<Box<dyn Terms>>> {
            Err(PalimpsestError::index(format!("segment for '{field}' is corrupt")))
        }
        fn num_terms(&self) -> Option<u64> {
            Some(0)
        }
    }

    #[test]
    fn test_host_failure_discards_partial_result() {
        let index = MemoryIndex::builder(1)
            .stored(0, "title", "kept?")
            .tokens("body", 0, &["x"])
            .build()
            .unwrap();
        let reconstructor =
            DocReconstructor::new(Arc::new(BrokenPostings(index)), ReconstructorConfig::default())
                .unwrap();
        match reconstructor.reconstruct(0) {
            Err(PalimpsestError::HostAccess { context, source }) => {
                assert!(context.contains("body"));
                assert!(matches!(*source, PalimpsestError::Index(_)));
            }
            other => panic!("Expected HostAccess, got {other:?}"),
        }
    }

    #[test]
    fn test_progress_through_channel() {
        let index = MemoryIndex::builder(1)
            .tokens("a", 0, &["x"])
            .tokens("b", 0, &["y"])
            .build()
            .unwrap();
        let (tx, rx) = crossbeam_channel::unbounded::<ProgressNotification>();
        let reconstructor = reconstructor(index).with_progress_sink(Arc::new(tx));
        reconstructor.reconstruct(0).unwrap();

        let events: Vec<ProgressNotification> = rx.try_iter().collect();
        let last = events.last().unwrap();
        assert_eq!(last.message, "Done.");
        assert!(events.iter().any(|e| e.message == "Collecting terms in b ..." && e.current == 2));
    }

    #[test]
    fn test_no_progress_when_stored_and_columns_suffice() {
        let index = MemoryIndex::builder(1)
            .stored(0, "title", "t")
            .doc_values("n", DocValuesColumn::numeric(vec![(0, 1)]))
            .build()
            .unwrap();
        let log = Arc::new(ProgressLog::new());
        let reconstructor = reconstructor(index).with_progress_sink(log.clone());
        reconstructor.reconstruct(0).unwrap();
        assert_eq!(log.messages(), vec!["Done."]);
    }
}
