//! Exporting reconstructed documents in bulk.

pub mod exporter;
pub mod info;
pub mod ranges;

pub use exporter::{AbortHandle, DocumentExporter, ExportConfig, ExportFormat, ExportSummary, xml_escape};
pub use info::IndexInfo;
pub use ranges::DocRanges;
