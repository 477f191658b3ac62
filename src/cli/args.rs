//! Command line argument parsing for the palimpsest CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::export::ExportFormat;

/// Palimpsest - recover document contents from an inverted index
#[derive(Parser, Debug, Clone)]
#[command(name = "palimpsest")]
#[command(about = "Recover document contents from an inverted index")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PalimpsestArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug, 4=trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PalimpsestArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show overall information about an index snapshot
    Info(InfoArgs),

    /// Reconstruct a single document
    Reconstruct(ReconstructArgs),

    /// Export reconstructed documents
    Export(ExportArgs),
}

/// Arguments for showing index information
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {
    /// Path to the JSON index snapshot
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,
}

/// Arguments for reconstructing a document
#[derive(Parser, Debug, Clone)]
pub struct ReconstructArgs {
    /// Path to the JSON index snapshot
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Document id
    #[arg(value_name = "DOC_ID")]
    pub doc_id: u64,

    /// Only reconstruct these fields (repeatable; default: all fields)
    #[arg(long = "field", value_name = "NAME")]
    pub fields: Vec<String>,
}

/// Arguments for exporting documents
#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Path to the JSON index snapshot
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Output file, or '-' for standard output
    #[arg(value_name = "OUTPUT")]
    pub output: String,

    /// Documents to export, e.g. 0-5,15,32-100 (no whitespace)
    #[arg(long, value_name = "EXPR")]
    pub range: Option<String>,

    /// Document serialization
    #[arg(long = "format", default_value = "xml")]
    pub format: DocFormat,

    /// Export only the overall information about the index
    #[arg(long)]
    pub only_info: bool,

    /// Omit the XML declaration
    #[arg(long)]
    pub no_preamble: bool,

    /// Compress the output with gzip
    #[arg(long)]
    pub gzip: bool,

    /// Name of the XML root element
    #[arg(long, default_value = "index")]
    pub root_element: String,
}

/// Output formats for command results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Serializations available to the export command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    /// XML document
    Xml,
    /// One JSON object per line
    Jsonl,
}

impl From<DocFormat> for ExportFormat {
    fn from(format: DocFormat) -> Self {
        match format {
            DocFormat::Xml => ExportFormat::Xml,
            DocFormat::Jsonl => ExportFormat::Jsonl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruct_command() {
        let args = PalimpsestArgs::try_parse_from([
            "palimpsest",
            "reconstruct",
            "index.json",
            "7",
            "--field",
            "title",
            "--field",
            "body",
        ])
        .unwrap();

        if let Command::Reconstruct(reconstruct_args) = args.command {
            assert_eq!(reconstruct_args.snapshot, PathBuf::from("index.json"));
            assert_eq!(reconstruct_args.doc_id, 7);
            assert_eq!(reconstruct_args.fields, vec!["title", "body"]);
        } else {
            panic!("Expected Reconstruct command");
        }
    }

    #[test]
    fn test_export_command() {
        let args = PalimpsestArgs::try_parse_from([
            "palimpsest",
            "export",
            "index.json",
            "-",
            "--range",
            "0-5,9",
            "--format",
            "jsonl",
            "--no-preamble",
        ])
        .unwrap();

        if let Command::Export(export_args) = args.command {
            assert_eq!(export_args.output, "-");
            assert_eq!(export_args.range.as_deref(), Some("0-5,9"));
            assert_eq!(export_args.format, DocFormat::Jsonl);
            assert!(export_args.no_preamble);
            assert!(!export_args.only_info);
            assert!(!export_args.gzip);
            assert_eq!(export_args.root_element, "index");
        } else {
            panic!("Expected Export command");
        }
    }

    #[test]
    fn test_negative_doc_id_rejected() {
        assert!(PalimpsestArgs::try_parse_from(["palimpsest", "reconstruct", "i.json", "-1"]).is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        let args = PalimpsestArgs::try_parse_from(["palimpsest", "info", "i.json"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = PalimpsestArgs::try_parse_from(["palimpsest", "-vvv", "info", "i.json"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args = PalimpsestArgs::try_parse_from(["palimpsest", "-q", "-vv", "info", "i.json"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            PalimpsestArgs::try_parse_from(["palimpsest", "--format", "json", "info", "i.json"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
