//! Bulk export of reconstructed documents.
//!
//! The exporter runs a [`DocReconstructor`] over a set of document ids and
//! streams each result out as XML or as JSON lines:
//!
//! ```text
//! <?xml version='1.0' encoding='UTF-8'?>
//! <index>
//! <info> ... </info>
//! <doc id='0'>
//! <field name='title' source='stored'>
//! <val type='text'>Hello</val>
//! </field>
//! <field name='body' source='recovered'>
//! <val pos='0'>hello</val>
//! <val pos='1'>world</val>
//! </field>
//! </doc>
//! </index>
//! ```
//!
//! With [`ExportConfig::gzip`] set, the whole stream is gzip-compressed.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use flate2::Compression;
use flate2::write::GzEncoder;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::export::info::IndexInfo;
use crate::export::ranges::DocRanges;
use crate::index::stored::StoredValue;
use crate::reconstruct::document::Reconstructed;
use crate::reconstruct::engine::DocReconstructor;
use crate::reconstruct::progress::{ProgressNotification, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xml,
    /// One JSON object per line.
    Jsonl,
}

/// Configuration for a [`DocumentExporter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub format: ExportFormat,

    /// Name of the XML root element.
    pub root_element: String,

    /// Write the XML declaration.
    pub preamble: bool,

    /// Write index statistics before the documents.
    pub include_info: bool,

    /// Gzip-compress the output.
    #[serde(default)]
    pub gzip: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            format: ExportFormat::Xml,
            root_element: "index".to_string(),
            preamble: true,
            include_info: true,
            gzip: false,
        }
    }
}

/// Outcome of an export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub exported: u64,
    pub skipped_deleted: u64,
    pub aborted: bool,
}

/// Shared flag that stops a running export before its next document.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Writes reconstructed documents to a stream.
#[derive(Debug)]
pub struct DocumentExporter {
    reconstructor: DocReconstructor,
    config: ExportConfig,
    abort: AbortHandle,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl DocumentExporter {
    pub fn new(reconstructor: DocReconstructor, config: ExportConfig) -> Self {
        DocumentExporter {
            reconstructor,
            config,
            abort: AbortHandle::default(),
            progress: None,
        }
    }

    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Handle for stopping the export from another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_aborted()
    }

    fn notify(&self, notification: &ProgressNotification) {
        if let Some(sink) = &self.progress {
            sink.notify(notification);
        }
    }

    /// Export the documents in `ranges`, or every document when `None`.
    ///
    /// Deleted documents are skipped; ids at or past `max_doc` end the run.
    pub fn export<W: Write>(&self, writer: W, ranges: Option<&DocRanges>) -> Result<ExportSummary> {
        if !self.config.gzip {
            return self.write_documents(writer, ranges);
        }
        let mut encoder = GzEncoder::new(writer, Compression::default());
        let summary = self.write_documents(&mut encoder, ranges)?;
        encoder.finish()?.flush()?;
        Ok(summary)
    }

    fn write_documents<W: Write>(&self, mut writer: W, ranges: Option<&DocRanges>) -> Result<ExportSummary> {
        let index = self.reconstructor.index();
        let max_doc = index.max_doc();
        let all;
        let ranges = match ranges {
            Some(ranges) => ranges,
            None => {
                all = DocRanges::all(max_doc);
                &all
            }
        };

        let total = ranges.cardinality_below(max_doc);
        let delta = (total / 100).max(1);
        let mut progress = ProgressNotification::new("Export running ...", 0, total);
        self.notify(&progress);
        info!("exporting up to {total} documents as {:?}", self.config.format);

        self.write_header(&mut writer)?;

        let mut summary = ExportSummary::default();
        let mut since_notify = 0;
        for doc_id in ranges.iter() {
            if doc_id >= max_doc {
                break;
            }
            if self.is_aborted() {
                progress.message = "User requested abort.".to_string();
                progress.aborted = true;
                self.notify(&progress);
                summary.aborted = true;
                break;
            }
            if index.is_deleted(doc_id) {
                debug!("skipping deleted document {doc_id}");
                summary.skipped_deleted += 1;
                continue;
            }

            let doc = self.reconstructor.reconstruct(doc_id)?;
            match self.config.format {
                ExportFormat::Xml => write_xml_doc(&mut writer, doc_id, &doc)?,
                ExportFormat::Jsonl => write_json_doc(&mut writer, doc_id, &doc)?,
            }
            summary.exported += 1;

            progress.current += 1;
            since_notify += 1;
            if since_notify >= delta {
                since_notify = 0;
                self.notify(&progress);
            }
        }

        if self.config.format == ExportFormat::Xml {
            writeln!(writer, "</{}>", self.config.root_element)?;
        }
        writer.flush()?;

        if !summary.aborted {
            progress.message = "Finished.".to_string();
            self.notify(&progress);
        }
        info!(
            "export done: {} written, {} deleted skipped{}",
            summary.exported,
            summary.skipped_deleted,
            if summary.aborted { ", aborted" } else { "" }
        );
        Ok(summary)
    }

    fn write_header<W: Write>(&self, writer: &mut W) -> Result<()> {
        let info = if self.config.include_info {
            let index = self.reconstructor.index();
            Some(IndexInfo::collect(index.as_ref(), self.reconstructor.num_terms())?)
        } else {
            None
        };
        let timestamp = Utc::now().to_rfc3339();

        match self.config.format {
            ExportFormat::Xml => {
                if self.config.preamble {
                    writeln!(writer, "<?xml version='1.0' encoding='UTF-8'?>")?;
                }
                writeln!(writer, "<{}>", self.config.root_element)?;
                if let Some(info) = info {
                    write_xml_info(writer, &info, &timestamp)?;
                }
            }
            ExportFormat::Jsonl => {
                if let Some(info) = info {
                    let line = serde_json::json!({ "info": info, "exported": timestamp });
                    serde_json::to_writer(&mut *writer, &line)?;
                    writeln!(writer)?;
                }
            }
        }
        Ok(())
    }
}

/// Escape text for XML content and single- or double-quoted attributes.
pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn write_xml_info<W: Write>(writer: &mut W, info: &IndexInfo, timestamp: &str) -> Result<()> {
    writeln!(writer, "<info>")?;
    writeln!(writer, " <fields count='{}'>", info.fields.len())?;
    for field in &info.fields {
        writeln!(
            writer,
            "  <field name='{}' docValues='{}' indexOptions='{}' termVectors='{}'/>",
            xml_escape(&field.name),
            field.doc_values_type,
            field.index_options,
            field.store_term_vectors
        )?;
    }
    writeln!(writer, " </fields>")?;
    writeln!(writer, " <numDocs>{}</numDocs>", info.num_docs)?;
    writeln!(writer, " <maxDoc>{}</maxDoc>", info.max_doc)?;
    writeln!(writer, " <numDeletedDocs>{}</numDeletedDocs>", info.num_deleted_docs)?;
    writeln!(writer, " <numTerms>{}</numTerms>", info.num_terms)?;
    writeln!(writer, " <hasDeletions>{}</hasDeletions>", info.has_deletions)?;
    writeln!(writer, " <exported>{timestamp}</exported>")?;
    writeln!(writer, "</info>")?;
    Ok(())
}

fn write_xml_doc<W: Write>(writer: &mut W, doc_id: u64, doc: &Reconstructed) -> Result<()> {
    writeln!(writer, "<doc id='{doc_id}'>")?;
    for name in doc.field_names() {
        if let Some(values) = doc.stored(name) {
            writeln!(writer, "<field name='{}' source='stored'>", xml_escape(name))?;
            for value in values {
                write_xml_stored_value(writer, value)?;
            }
        } else if let Some(seq) = doc.recovered(name) {
            writeln!(writer, "<field name='{}' source='recovered'>", xml_escape(name))?;
            for (position, tokens) in seq.iter() {
                writeln!(writer, "<val pos='{position}'>{}</val>", xml_escape(tokens))?;
            }
        }
        writeln!(writer, "</field>")?;
    }
    writeln!(writer, "</doc>")?;
    Ok(())
}

fn write_xml_stored_value<W: Write>(writer: &mut W, value: &StoredValue) -> Result<()> {
    writeln!(
        writer,
        "<val type='{}'>{}</val>",
        value.type_name(),
        xml_escape(&value.to_display_string())
    )?;
    Ok(())
}

#[derive(Serialize)]
struct JsonDoc<'a> {
    id: u64,
    #[serde(flatten)]
    doc: &'a Reconstructed,
}

fn write_json_doc<W: Write>(writer: &mut W, doc_id: u64, doc: &Reconstructed) -> Result<()> {
    serde_json::to_writer(&mut *writer, &JsonDoc { id: doc_id, doc })?;
    writeln!(writer)?;
    Ok(())
}
