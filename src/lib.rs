//! CSV Export Library
//!
//! Serializes in-memory records (ordered key/value objects) to CSV text and
//! hands the result to a download target that saves it as a file.
//!
//! - [`csv_handler`]: header resolution, cell escaping, row assembly,
//!   byte-order mark and filename decoration. Pure.
//! - [`download`]: the save-to-file collaborator.
//! - [`exporter`]: runs one export end to end, with lifecycle hooks.
//! - [`hook`]: a bound, reusable export callable.
//!
//! # Example
//!
//! ```
//! use csv_export::csv_handler::{record_from_pairs, serialize, SystemClock};
//! use csv_export::options::ExportOptions;
//! use serde_json::json;
//!
//! let options = ExportOptions::new(vec![record_from_pairs([
//!     ("name", json!("Doe, John")),
//!     ("age", json!(30)),
//! ])]);
//! let document = serialize(&options, &SystemClock);
//! assert_eq!(document.content, "name,age\n\"Doe, John\",\"30\"");
//! ```

pub mod cli;
pub mod csv_handler;
pub mod download;
pub mod error;
pub mod exporter;
pub mod hook;
pub mod logging;
pub mod options;

pub use csv_handler::{serialize, CsvDocument, Record};
pub use download::{DownloadTarget, FileDownload, MemoryDownload};
pub use error::CsvExportError;
pub use exporter::{export_to_csv, CsvExporter, ExportOutcome};
pub use options::{ExportOptions, Newline};
