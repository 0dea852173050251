//! CLI argument parsing module
//!
//! Handles command-line argument parsing using `clap` derive macros and
//! turns the parsed arguments into [`ExportOptions`].
//!
//! Option precedence is: built-in defaults, then the `--config` file, then
//! individual flags.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::csv_handler::Record;
use crate::error::CsvExportError;
use crate::options::{ExportOptions, Newline, OptionsFile};

/// Command-line arguments for the CSV exporter.
///
/// Use the `validate()` method after parsing to ensure the arguments are
/// usable.
///
/// # Example
///
/// ```rust,ignore
/// use clap::Parser;
/// use csv_export::cli::Args;
///
/// let args = Args::parse();
/// args.validate()?;
/// ```
#[derive(Parser, Debug)]
#[command(name = "csv-export")]
#[command(about = "Export JSON records to a CSV file")]
#[command(version)]
pub struct Args {
    /// JSON file containing an array of records
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory the CSV file is saved into
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// JSON file with export options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output filename (default: export.csv)
    #[arg(short, long)]
    pub filename: Option<String>,

    /// Comma-separated list of fields to export, in order
    #[arg(long, value_delimiter = ',')]
    pub headers: Option<Vec<String>>,

    /// Comma-separated header labels, one per field
    #[arg(long, value_delimiter = ',')]
    pub labels: Option<Vec<String>>,

    /// Cell delimiter (default: ",")
    #[arg(short, long)]
    pub delimiter: Option<String>,

    /// Charset label declared on the output (default: utf-8)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Use field names as header text, ignoring labels
    #[arg(long, default_value = "false")]
    pub use_keys_as_header: bool,

    /// Omit the header row
    #[arg(long, default_value = "false")]
    pub no_header: bool,

    /// Prefix the file with a byte-order mark
    #[arg(long, default_value = "false")]
    pub bom: bool,

    /// Only quote cells that contain the delimiter, quotes, or newlines
    #[arg(long, default_value = "false")]
    pub no_quote: bool,

    /// Separate rows with CRLF instead of LF
    #[arg(long, default_value = "false")]
    pub crlf: bool,

    /// Append a timestamp to the filename
    #[arg(long, default_value = "false")]
    pub timestamp: bool,

    /// Literal row written before the header, cells separated by the delimiter (repeatable)
    #[arg(long)]
    pub prepend: Vec<String>,

    /// Literal row written after the data, cells separated by the delimiter (repeatable)
    #[arg(long)]
    pub append: Vec<String>,

    /// Print the CSV to stdout instead of saving a file
    #[arg(long, default_value = "false")]
    pub stdout: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Validates argument values that clap cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns [`CsvExportError::InvalidArgument`] when the delimiter or
    /// encoding is empty, or when the input file does not exist.
    pub fn validate(&self) -> Result<(), CsvExportError> {
        if matches!(self.delimiter.as_deref(), Some("")) {
            return Err(CsvExportError::InvalidArgument(
                "--delimiter must not be empty".to_string(),
            ));
        }

        if matches!(self.encoding.as_deref(), Some("")) {
            return Err(CsvExportError::InvalidArgument(
                "--encoding must not be empty".to_string(),
            ));
        }

        if !self.input.is_file() {
            return Err(CsvExportError::InvalidArgument(format!(
                "input file {:?} does not exist",
                self.input
            )));
        }

        if !self.stdout && !self.output_dir.is_dir() {
            return Err(CsvExportError::InvalidArgument(format!(
                "output directory {:?} does not exist",
                self.output_dir
            )));
        }

        Ok(())
    }

    /// Builds export options for `data` from the config file and flags.
    ///
    /// # Errors
    ///
    /// Returns an error when the config file cannot be read or parsed.
    pub fn to_options(&self, data: Vec<Record>) -> Result<ExportOptions, CsvExportError> {
        let mut options = ExportOptions::new(data);

        if let Some(path) = &self.config {
            options = OptionsFile::from_json_file(path)?.apply(options);
        }

        if let Some(filename) = &self.filename {
            options.filename = filename.clone();
        }
        if let Some(headers) = &self.headers {
            options.headers = Some(headers.clone());
        }
        if let Some(labels) = &self.labels {
            options.labels = Some(labels.clone());
        }
        if let Some(delimiter) = &self.delimiter {
            options.delimiter = delimiter.clone();
        }
        if let Some(encoding) = &self.encoding {
            options.encoding = encoding.clone();
        }
        if self.use_keys_as_header {
            options.use_keys_as_header = true;
        }
        if self.no_header {
            options.include_header = false;
        }
        if self.bom {
            options.include_bom = true;
        }
        if self.no_quote {
            options.quote_values = false;
        }
        if self.crlf {
            options.newline = Newline::CrLf;
        }
        if self.timestamp {
            options.add_timestamp = true;
        }

        // The config file may set an empty delimiter even when the flag is absent.
        options.validate()?;

        if !self.prepend.is_empty() {
            options.prepend_rows = split_rows(&self.prepend, &options.delimiter);
        }
        if !self.append.is_empty() {
            options.append_rows = split_rows(&self.append, &options.delimiter);
        }

        Ok(options)
    }
}

/// Splits each raw row into cells on `delimiter`. An empty row has no cells.
fn split_rows(rows: &[String], delimiter: &str) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            if row.is_empty() {
                Vec::new()
            } else {
                row.split(delimiter).map(str::to_string).collect()
            }
        })
        .collect()
}
