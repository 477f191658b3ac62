//! Command implementations for the palimpsest CLI.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{PalimpsestError, Result};
use crate::export::{DocRanges, DocumentExporter, ExportConfig, IndexInfo};
use crate::index::memory::MemoryIndex;
use crate::reconstruct::{DocReconstructor, ProgressNotification, ReconstructorConfig};

/// Execute a CLI command.
pub fn execute_command(args: PalimpsestArgs) -> Result<()> {
    match &args.command {
        Command::Info(info_args) => show_info(info_args, &args),
        Command::Reconstruct(reconstruct_args) => reconstruct_document(reconstruct_args, &args),
        Command::Export(export_args) => export_documents(export_args, &args),
    }
}

fn open_snapshot(path: &Path) -> Result<Arc<MemoryIndex>> {
    info!("loading index snapshot from {}", path.display());
    let index = MemoryIndex::load_json(path)?;
    Ok(Arc::new(index))
}

/// Show overall index information.
fn show_info(args: &InfoArgs, cli_args: &PalimpsestArgs) -> Result<()> {
    let index = open_snapshot(&args.snapshot)?;
    let reconstructor = DocReconstructor::new(index.clone(), ReconstructorConfig::default())?;
    let info = IndexInfo::collect(index.as_ref(), reconstructor.num_terms())?;

    output_result(
        &format!("Index snapshot: {}", args.snapshot.display()),
        &info,
        cli_args,
    )
}

/// Reconstruct one document.
fn reconstruct_document(args: &ReconstructArgs, cli_args: &PalimpsestArgs) -> Result<()> {
    let index = open_snapshot(&args.snapshot)?;
    let config = ReconstructorConfig::default().with_fields(args.fields.iter().cloned());
    let mut reconstructor = DocReconstructor::new(index, config)?;
    if cli_args.verbosity() > 1 {
        reconstructor = reconstructor.with_progress_sink(Arc::new(log_progress));
    }

    let document = reconstructor.reconstruct(args.doc_id)?;

    output_result(
        "Document reconstructed",
        &ReconstructionResult {
            doc_id: args.doc_id,
            document,
        },
        cli_args,
    )
}

/// Export documents to a file or standard output.
fn export_documents(args: &ExportArgs, cli_args: &PalimpsestArgs) -> Result<()> {
    let to_stdout = args.output == "-";
    if !to_stdout && Path::new(&args.output).exists() {
        return Err(PalimpsestError::invalid_argument(format!(
            "Output file already exists: '{}'",
            args.output
        )));
    }

    let ranges = if args.only_info {
        Some(DocRanges::empty())
    } else {
        args.range.as_deref().map(DocRanges::parse).transpose()?
    };

    let index = open_snapshot(&args.snapshot)?;
    let reconstructor = DocReconstructor::new(index, ReconstructorConfig::default())?;
    let config = ExportConfig {
        format: args.format.into(),
        root_element: args.root_element.clone(),
        preamble: !args.no_preamble,
        include_info: true,
        gzip: args.gzip,
    };
    let mut exporter = DocumentExporter::new(reconstructor, config);
    if cli_args.verbosity() > 1 {
        exporter = exporter.with_progress_sink(Arc::new(log_progress));
    }

    let start_time = Instant::now();
    let summary = if to_stdout {
        exporter.export(io::stdout().lock(), ranges.as_ref())?
    } else {
        let file = File::create(&args.output)?;
        exporter.export(BufWriter::new(file), ranges.as_ref())?
    };
    let duration = start_time.elapsed();

    // standard output carries the export itself
    if to_stdout {
        info!(
            "exported {} documents in {}ms",
            summary.exported,
            duration.as_millis()
        );
        return Ok(());
    }

    output_result(
        "Export finished",
        &ExportResult {
            output: args.output.clone(),
            summary,
            duration_ms: duration.as_millis() as u64,
        },
        cli_args,
    )
}

fn log_progress(notification: &ProgressNotification) {
    info!(
        "{} [{}/{}]",
        notification.message, notification.current, notification.max
    );
}
