//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{OutputFormat, PalimpsestArgs};
use crate::error::Result;
use crate::export::{ExportSummary, IndexInfo};
use crate::reconstruct::Reconstructed;

/// Result structure for a single reconstruction.
#[derive(Debug, Serialize)]
pub struct ReconstructionResult {
    pub doc_id: u64,
    #[serde(flatten)]
    pub document: Reconstructed,
}

/// Result structure for an export run.
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub output: String,
    #[serde(flatten)]
    pub summary: ExportSummary,
    pub duration_ms: u64,
}

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn render_human(&self) -> String;
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &PalimpsestArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            print!("{}", result.render_human());
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &PalimpsestArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

impl HumanOutput for IndexInfo {
    fn render_human(&self) -> String {
        let mut out = String::new();
        out.push_str("Index Information:\n");
        out.push_str("══════════════════\n");
        out.push_str(&format!("Max doc: {}\n", self.max_doc));
        out.push_str(&format!("Live documents: {}\n", self.num_docs));
        out.push_str(&format!(
            "Deleted documents: {}{}\n",
            self.num_deleted_docs,
            if self.has_deletions { "" } else { " (no deletions)" }
        ));
        out.push_str(&format!("Total terms: {}\n", self.num_terms));
        out.push('\n');
        out.push_str(&format!("Fields ({}):\n", self.fields.len()));
        out.push_str("────────────\n");
        for field in &self.fields {
            out.push_str(&format!(
                "{:<24} values={:<10} postings={}{}\n",
                field.name,
                field.doc_values_type,
                field.index_options,
                if field.store_term_vectors { " term-vectors" } else { "" }
            ));
        }
        out
    }
}

impl HumanOutput for ReconstructionResult {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let title = format!("Document {}", self.doc_id);
        out.push_str(&format!("{title}\n{}\n", "═".repeat(title.chars().count())));

        if self.document.is_empty() {
            out.push_str("(nothing recovered)\n");
            return out;
        }

        for name in self.document.field_names() {
            if let Some(values) = self.document.stored(name) {
                out.push_str(&format!("{name} [stored]\n"));
                for value in values {
                    out.push_str(&format!("  {}\n", value.to_display_string()));
                }
            } else if let Some(seq) = self.document.recovered(name) {
                out.push_str(&format!("{name} [recovered]\n"));
                for (position, tokens) in seq.iter() {
                    out.push_str(&format!("  {position}: {tokens}\n"));
                }
            }
        }
        out
    }
}

impl HumanOutput for ExportResult {
    fn render_human(&self) -> String {
        let mut out = format!(
            "Exported {} documents to {} in {}ms",
            self.summary.exported, self.output, self.duration_ms
        );
        if self.summary.skipped_deleted > 0 {
            out.push_str(&format!(" ({} deleted skipped)", self.summary.skipped_deleted));
        }
        if self.summary.aborted {
            out.push_str(" [aborted]");
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::MemoryIndex;
    use crate::reconstruct::{DocReconstructor, ReconstructorConfig};
    use std::sync::Arc;

    #[test]
    fn test_reconstruction_rendering() {
        let index = MemoryIndex::builder(1)
            .stored(0, "title", "Hello")
            .tokens("body", 0, &["a", "b"])
            .build()
            .unwrap();
        let reconstructor =
            DocReconstructor::new(Arc::new(index), ReconstructorConfig::default()).unwrap();
        let result = ReconstructionResult {
            doc_id: 0,
            document: reconstructor.reconstruct(0).unwrap(),
        };
        let text = result.render_human();
        assert!(text.starts_with("Document 0\n══════════\n"));
        assert!(text.contains("title [stored]\n  Hello\n"));
        assert!(text.contains("body [recovered]\n  0: a\n  1: b\n"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["doc_id"], 0);
        assert_eq!(json["recovered"]["body"]["1"], "b");
    }

    #[test]
    fn test_export_rendering() {
        let result = ExportResult {
            output: "out.xml".to_string(),
            summary: ExportSummary {
                exported: 3,
                skipped_deleted: 1,
                aborted: false,
            },
            duration_ms: 5,
        };
        assert_eq!(
            result.render_human(),
            "Exported 3 documents to out.xml in 5ms (1 deleted skipped)\n"
        );
    }
}
