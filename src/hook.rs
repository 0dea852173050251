//! Convenience wrapper
//!
//! Binds an exporter once and hands back a callable that forwards each
//! [`ExportOptions`] to it unchanged. The callable owns its exporter; keep
//! it alive for as long as the owning component needs a stable handle.
//!
//! ```rust,ignore
//! use csv_export::hook::use_csv_export;
//!
//! let mut export = use_csv_export();
//! export(ExportOptions::new(rows).with_filename("orders.csv"))?;
//! ```

use crate::csv_handler::{Clock, SystemClock};
use crate::download::{DownloadTarget, FileDownload};
use crate::error::CsvExportError;
use crate::exporter::{CsvExporter, ExportOutcome};
use crate::options::ExportOptions;

/// Returns an export callable that saves into the current directory.
pub fn use_csv_export() -> impl FnMut(ExportOptions) -> Result<ExportOutcome, CsvExportError> {
    use_csv_export_with(FileDownload::default())
}

/// Returns an export callable bound to `target`.
pub fn use_csv_export_with<T>(
    target: T,
) -> impl FnMut(ExportOptions) -> Result<ExportOutcome, CsvExportError>
where
    T: DownloadTarget,
{
    bind(CsvExporter::with_clock(target, SystemClock))
}

/// Wraps an existing exporter in a forwarding callable.
pub fn bind<T, C>(
    mut exporter: CsvExporter<T, C>,
) -> impl FnMut(ExportOptions) -> Result<ExportOutcome, CsvExportError>
where
    T: DownloadTarget,
    C: Clock,
{
    move |options| exporter.export(options)
}
