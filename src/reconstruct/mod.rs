//! Document reconstruction.
//!
//! The engine in [`engine`] walks each requested field through the fallback
//! sources in [`value_column`], [`term_vector`] and [`posting_scan`], and
//! collects the result in a [`Reconstructed`].

pub mod document;
pub mod engine;
pub mod numeric_hypothesis;
pub mod posting_scan;
pub mod progress;
pub mod sequence;
pub mod source;
pub mod term_vector;
pub mod value_column;

pub use document::Reconstructed;
pub use engine::{DocReconstructor, ReconstructorConfig};
pub use numeric_hypothesis::NumericHypothesis;
pub use progress::{ProgressLog, ProgressNotification, ProgressSink};
pub use sequence::{GrowableStringArray, SEPARATOR};
pub use source::{FieldContext, FieldSource};
