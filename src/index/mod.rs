//! Read-only index access.
//!
//! [`reader::IndexAccess`] is the surface the reconstruction engine reads
//! from: stored fields, field definitions, value columns, term vectors and
//! the term dictionary with its postings. [`memory::MemoryIndex`] is the
//! in-memory host shipped with the crate.

pub mod doc_values;
pub mod field_info;
pub mod memory;
pub mod posting;
pub mod reader;
pub mod stored;
pub mod term_vector;
pub mod terms;

pub use doc_values::{DocValuesColumn, DocValuesSnapshot, FieldDocValues, SortedSetColumn};
pub use field_info::{DocValuesType, FieldInfo, IndexOptions};
pub use memory::{IndexSnapshot, MAX_DOCS, MemoryIndex, MemoryIndexBuilder};
pub use posting::{NO_MORE_DOCS, Posting, PostingIterator, PostingList};
pub use reader::{HostCapabilities, IndexAccess};
pub use stored::{StoredField, StoredValue};
pub use term_vector::TermVectorEntry;
pub use terms::{TermStats, Terms, TermsEnum};
