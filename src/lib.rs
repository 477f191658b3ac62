//! # Palimpsest
//!
//! Best-effort reconstruction of documents from an inverted index.
//!
//! Stored fields come back verbatim. Every other field is pieced together
//! from what indexing left behind: value columns, term vectors, and finally
//! the postings of every term in the field, with trie-encoded numeric
//! fields detected and decoded along the way.
//!
//! ## Features
//!
//! - Source cascade: stored fields, value columns, term vectors, postings
//! - Positional layout recovery with colliding tokens kept side by side
//! - Prefix-coded numeric field detection
//! - In-memory index host with a JSON snapshot format
//! - Bulk export to XML or JSON lines
//!
//! ```
//! use std::sync::Arc;
//!
//! use palimpsest::prelude::*;
//!
//! let index = MemoryIndex::builder(1)
//!     .stored(0, "title", "Dune")
//!     .tokens("body", 0, &["spice", "must", "flow"])
//!     .long_value("year", 0, 1965, 16)
//!     .build()
//!     .unwrap();
//!
//! let reconstructor = DocReconstructor::new(Arc::new(index), ReconstructorConfig::default()).unwrap();
//! let doc = reconstructor.reconstruct(0).unwrap();
//!
//! assert_eq!(doc.recovered("body").unwrap().to_text(" "), "spice must flow");
//! assert!(doc.recovered("year").unwrap().get(0).unwrap().starts_with("<long>1965|<double>"));
//! ```

pub mod cli;
pub mod error;
pub mod export;
pub mod index;
pub mod numeric;
pub mod reconstruct;

pub mod prelude {
    pub use crate::error::{PalimpsestError, Result};
    pub use crate::export::{DocRanges, DocumentExporter, ExportConfig, ExportFormat};
    pub use crate::index::{IndexAccess, MemoryIndex};
    pub use crate::reconstruct::{
        DocReconstructor, GrowableStringArray, ProgressNotification, ProgressSink, Reconstructed,
        ReconstructorConfig,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
