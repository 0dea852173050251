//! Error module
//!
//! Defines the crate-wide error type using `thiserror`.
//!
//! Serialization itself never fails: every variant here comes from the
//! edges of the system (loading records or options from disk, validating
//! command-line input, and handing the finished document to a download
//! target).

use thiserror::Error;

/// The main error type for CSV export.
///
/// # Error Categories
///
/// - **File I/O errors**: reading inputs and writing the downloaded file
/// - **Input errors**: malformed JSON records or option files
/// - **Configuration errors**: invalid arguments
///
/// # Example
///
/// ```rust,ignore
/// use csv_export::error::CsvExportError;
///
/// fn example() -> Result<(), CsvExportError> {
///     // Errors from underlying types are automatically converted
///     let file = std::fs::File::open("nonexistent.json")?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum CsvExportError {
    /// General I/O error.
    ///
    /// Raised for file system operations such as reading the records file
    /// or writing the exported document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    ///
    /// Raised when a records file or an options file is not valid JSON or
    /// does not have the expected structure.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The temporary download file could not be moved to its final name.
    #[error("Failed to save file: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// An entry of the records array is not a JSON object.
    #[error("Record {index} is not a JSON object")]
    InvalidRecord {
        /// Zero-based position of the offending entry.
        index: usize,
    },

    /// Invalid command-line argument or option value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
