//! csv-export - save JSON records as a CSV file
//!
//! Reads a JSON array of objects, serializes it to CSV with the configured
//! options, and saves the result into the output directory (or prints it
//! with `--stdout`). An empty array is not an error: nothing is written.
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success (including empty input) |
//! | 1 | Configuration/argument error or malformed input |
//! | 3 | File I/O error |

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use csv_export::cli::Args;
use csv_export::csv_handler::{load_records, serialize, SystemClock};
use csv_export::download::FileDownload;
use csv_export::error::CsvExportError;
use csv_export::exporter::{CsvExporter, ExportOutcome};
use csv_export::logging::init_logging;

/// Exit code for success
const EXIT_SUCCESS: u8 = 0;
/// Exit code for configuration/argument errors
const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for file I/O errors
const EXIT_IO_ERROR: u8 = 3;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    if let Err(e) = args.validate() {
        eprintln!("Error: Configuration error: {}", e);
        eprintln!("  Hint: Use --help for usage information");
        return ExitCode::from(EXIT_CONFIG_ERROR);
    }

    match run(&args) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(error_to_exit_code(&e))
        }
    }
}

fn run(args: &Args) -> Result<(), CsvExportError> {
    let records = load_records(&args.input)?;
    info!(records = records.len(), input = %args.input.display(), "Loaded records");

    let options = args.to_options(records)?;

    if args.stdout {
        if !options.data.is_empty() {
            let document = serialize(&options, &SystemClock);
            println!("{}", document.content);
        }
        return Ok(());
    }

    let mut exporter = CsvExporter::new(FileDownload::new(&args.output_dir));
    match exporter.export(options)? {
        ExportOutcome::Skipped => {
            eprintln!("No records in {:?}, nothing exported.", args.input);
        }
        ExportOutcome::Delivered(receipt) => {
            let location = receipt
                .location
                .map(|p| p.display().to_string())
                .unwrap_or(receipt.filename);
            eprintln!("Exported {} bytes to {}", receipt.bytes, location);
        }
    }
    Ok(())
}

/// Map an error to its process exit code.
fn error_to_exit_code(error: &CsvExportError) -> u8 {
    match error {
        CsvExportError::Io(_) | CsvExportError::Persist(_) => EXIT_IO_ERROR,
        CsvExportError::Json(_)
        | CsvExportError::InvalidRecord { .. }
        | CsvExportError::InvalidArgument(_) => EXIT_CONFIG_ERROR,
    }
}
