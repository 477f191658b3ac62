//! The result of reconstructing one document.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::index::stored::StoredValue;
use crate::reconstruct::sequence::GrowableStringArray;

/// A reconstructed document.
///
/// Fields kept verbatim by the index land in `stored`; everything else that
/// could be pieced together from the inverted structures lands in
/// `recovered`. A field name never appears in both.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reconstructed {
    stored: BTreeMap<String, Vec<StoredValue>>,
    recovered: BTreeMap<String, GrowableStringArray>,
}

impl Reconstructed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted union of stored and recovered field names.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .stored
            .keys()
            .chain(self.recovered.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.stored.contains_key(field) || self.recovered.contains_key(field)
    }

    pub fn is_stored(&self, field: &str) -> bool {
        self.stored.contains_key(field)
    }

    pub fn stored(&self, field: &str) -> Option<&[StoredValue]> {
        self.stored.get(field).map(Vec::as_slice)
    }

    pub fn recovered(&self, field: &str) -> Option<&GrowableStringArray> {
        self.recovered.get(field)
    }

    pub fn stored_fields(&self) -> &BTreeMap<String, Vec<StoredValue>> {
        &self.stored
    }

    pub fn recovered_fields(&self) -> &BTreeMap<String, GrowableStringArray> {
        &self.recovered
    }

    pub fn is_empty(&self) -> bool {
        self.stored.is_empty() && self.recovered.is_empty()
    }

    pub(crate) fn insert_stored(&mut self, field: String, values: Vec<StoredValue>) {
        self.recovered.remove(&field);
        self.stored.insert(field, values);
    }

    pub(crate) fn insert_recovered(&mut self, field: String, sequence: GrowableStringArray) {
        if !self.stored.contains_key(&field) {
            self.recovered.insert(field, sequence);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_sets_are_disjoint() {
        let mut doc = Reconstructed::new();
        let mut seq = GrowableStringArray::new();
        seq.append(0, "x");

        doc.insert_stored("title".to_string(), vec![StoredValue::from("Hi")]);
        doc.insert_recovered("title".to_string(), seq.clone());
        doc.insert_recovered("body".to_string(), seq);

        assert!(doc.is_stored("title"));
        assert!(doc.recovered("title").is_none());
        assert_eq!(doc.field_names(), vec!["body", "title"]);
        assert!(doc.has_field("body"));
        assert!(!doc.has_field("missing"));
        assert_eq!(doc.stored("title").unwrap().len(), 1);
    }

    #[test]
    fn test_serialize_shape() {
        let mut doc = Reconstructed::new();
        let mut seq = GrowableStringArray::new();
        seq.append(3, "b");
        doc.insert_recovered("f".to_string(), seq);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["recovered"]["f"]["3"], "b");
        assert!(json["stored"].as_object().unwrap().is_empty());
    }
}
