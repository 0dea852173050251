//! Download module
//!
//! Hands a finished document to the host's "save as file" mechanism.
//!
//! # Targets
//!
//! - [`FileDownload`] writes the payload into a directory. The bytes go to a
//!   transient temp file first and are moved to the final name only once
//!   fully written; the temp file is removed on any failure.
//! - [`MemoryDownload`] keeps every delivery in memory, for hosts that
//!   render or upload the payload themselves.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::csv_handler::CsvDocument;
use crate::error::CsvExportError;

/// MIME type of every payload, before the charset parameter.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// The binary object handed to a download target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPayload {
    /// Document bytes (UTF-8).
    pub bytes: Vec<u8>,
    /// `text/csv;charset=<label>`.
    pub content_type: String,
}

impl CsvPayload {
    /// Wraps `text` and tags it with the charset `encoding`.
    #[must_use]
    pub fn new(text: &str, encoding: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
            content_type: format!("{};charset={}", CSV_MIME_TYPE, encoding),
        }
    }

    /// Builds the payload for a finished document.
    #[must_use]
    pub fn from_document(document: &CsvDocument) -> Self {
        Self::new(&document.content, &document.encoding)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Name the payload was saved under.
    pub filename: String,
    /// Where the file ended up, for targets that write to disk.
    pub location: Option<PathBuf>,
    /// Payload size in bytes.
    pub bytes: usize,
    /// Payload content type.
    pub content_type: String,
}

/// The host's save-to-file mechanism.
pub trait DownloadTarget {
    /// Saves `payload` under `filename`.
    fn deliver(
        &mut self,
        payload: &CsvPayload,
        filename: &str,
    ) -> Result<DeliveryReceipt, CsvExportError>;
}

impl<T: DownloadTarget + ?Sized> DownloadTarget for &mut T {
    fn deliver(
        &mut self,
        payload: &CsvPayload,
        filename: &str,
    ) -> Result<DeliveryReceipt, CsvExportError> {
        (**self).deliver(payload, filename)
    }
}

impl<T: DownloadTarget + ?Sized> DownloadTarget for Box<T> {
    fn deliver(
        &mut self,
        payload: &CsvPayload,
        filename: &str,
    ) -> Result<DeliveryReceipt, CsvExportError> {
        (**self).deliver(payload, filename)
    }
}

/// Saves downloads as files in a directory.
#[derive(Debug, Clone)]
pub struct FileDownload {
    dir: PathBuf,
}

impl Default for FileDownload {
    /// Saves into the current working directory.
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The destination directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Rejects names that would escape the destination directory.
fn check_filename(filename: &str) -> Result<(), CsvExportError> {
    let escapes = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains('/')
        || filename.contains('\\');
    if escapes {
        return Err(CsvExportError::InvalidArgument(format!(
            "invalid download filename {:?}",
            filename
        )));
    }
    Ok(())
}

impl DownloadTarget for FileDownload {
    fn deliver(
        &mut self,
        payload: &CsvPayload,
        filename: &str,
    ) -> Result<DeliveryReceipt, CsvExportError> {
        check_filename(filename)?;

        let mut part = tempfile::Builder::new()
            .prefix(".csv-export-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        part.write_all(&payload.bytes)?;
        part.flush()?;

        let location = self.dir.join(filename);
        part.persist(&location)?;

        info!(
            file = %location.display(),
            bytes = payload.len(),
            "Saved CSV download"
        );

        Ok(DeliveryReceipt {
            filename: filename.to_string(),
            location: Some(location),
            bytes: payload.len(),
            content_type: payload.content_type.clone(),
        })
    }
}

/// A delivery captured by [`MemoryDownload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedDownload {
    pub filename: String,
    pub payload: CsvPayload,
}

impl CapturedDownload {
    /// The payload decoded as UTF-8, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload.bytes).into_owned()
    }
}

/// Keeps every delivery in memory, in call order.
#[derive(Debug, Clone, Default)]
pub struct MemoryDownload {
    downloads: Vec<CapturedDownload>,
}

impl MemoryDownload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All deliveries so far.
    #[must_use]
    pub fn downloads(&self) -> &[CapturedDownload] {
        &self.downloads
    }

    /// The most recent delivery.
    #[must_use]
    pub fn last(&self) -> Option<&CapturedDownload> {
        self.downloads.last()
    }
}

impl DownloadTarget for MemoryDownload {
    fn deliver(
        &mut self,
        payload: &CsvPayload,
        filename: &str,
    ) -> Result<DeliveryReceipt, CsvExportError> {
        self.downloads.push(CapturedDownload {
            filename: filename.to_string(),
            payload: payload.clone(),
        });
        Ok(DeliveryReceipt {
            filename: filename.to_string(),
            location: None,
            bytes: payload.len(),
            content_type: payload.content_type.clone(),
        })
    }
}
