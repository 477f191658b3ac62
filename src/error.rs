//! Error types for the Palimpsest library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`PalimpsestError`] enum. Reconstruction distinguishes two families:
//!
//! - expected, recoverable conditions ([`PalimpsestError::OutOfRange`],
//!   [`PalimpsestError::DeletedDocument`]) that batch callers usually skip;
//! - hard failures ([`PalimpsestError::UnsupportedHost`],
//!   [`PalimpsestError::HostAccess`]) that abort the operation in progress.
//!
//! # Examples
//!
//! ```
//! use palimpsest::error::{PalimpsestError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PalimpsestError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Palimpsest operations.
#[derive(Error, Debug)]
pub enum PalimpsestError {
    /// Document id outside `0..max_doc`.
    #[error("Document {doc_id} outside of valid range (max_doc = {max_doc})")]
    OutOfRange { doc_id: u64, max_doc: u64 },

    /// Document is marked deleted by the index liveness information.
    #[error("Document {0} is deleted")]
    DeletedDocument(u64),

    /// The index access object lacks a required capability.
    #[error("Unsupported index host: {0}")]
    UnsupportedHost(String),

    /// Any failure surfaced while reading from the index host.
    #[error("Index access failure while {context}: {source}")]
    HostAccess {
        context: String,
        #[source]
        source: Box<PalimpsestError>,
    },

    /// The index snapshot was closed.
    #[error("Index is closed")]
    IndexClosed,

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors (file operations, pipes, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PalimpsestError.
pub type Result<T> = std::result::Result<T, PalimpsestError>;

impl PalimpsestError {
    /// Create a new out-of-range error.
    pub fn out_of_range(doc_id: u64, max_doc: u64) -> Self {
        PalimpsestError::OutOfRange { doc_id, max_doc }
    }

    /// Create a new unsupported host error.
    pub fn unsupported_host<S: Into<String>>(msg: S) -> Self {
        PalimpsestError::UnsupportedHost(msg.into())
    }

    /// Wrap an error raised by the index host.
    ///
    /// Errors that already are host access failures are passed through.
    pub fn host_access<S: Into<String>>(context: S, source: PalimpsestError) -> Self {
        match source {
            PalimpsestError::HostAccess { .. } => source,
            other => PalimpsestError::HostAccess {
                context: context.into(),
                source: Box::new(other),
            },
        }
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        PalimpsestError::Index(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        PalimpsestError::InvalidArgument(msg.into())
    }

    /// Whether a batch caller may skip this error and continue with the next id.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PalimpsestError::OutOfRange { .. } | PalimpsestError::DeletedDocument(_)
        )
    }
}
