//! Export orchestrator
//!
//! Runs one export as a single synchronous pass:
//!
//! ```text
//! idle -> started -> serialized -> delivered -> idle
//! ```
//!
//! An empty record collection short-circuits before `started`: no hooks
//! run, no document is built and nothing is delivered. A delivery failure
//! returns the exporter to `idle` and skips the completion hook. Hook and
//! formatter panics are not caught, but the phase still unwinds to `idle`.

use std::fmt;

use tracing::debug;

use crate::csv_handler::{serialize, Clock, SystemClock};
use crate::download::{CsvPayload, DeliveryReceipt, DownloadTarget, FileDownload};
use crate::error::CsvExportError;
use crate::options::ExportOptions;

/// Where an export currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportPhase {
    #[default]
    Idle,
    Started,
    Serialized,
    Delivered,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportPhase::Idle => "idle",
            ExportPhase::Started => "started",
            ExportPhase::Serialized => "serialized",
            ExportPhase::Delivered => "delivered",
        };
        f.write_str(name)
    }
}

/// What an export call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// There were no records; nothing happened.
    Skipped,
    /// The document was handed to the download target.
    Delivered(DeliveryReceipt),
}

impl ExportOutcome {
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, ExportOutcome::Skipped)
    }

    /// The delivery receipt, if a document was delivered.
    #[must_use]
    pub fn receipt(&self) -> Option<&DeliveryReceipt> {
        match self {
            ExportOutcome::Skipped => None,
            ExportOutcome::Delivered(receipt) => Some(receipt),
        }
    }
}

/// Serializes records and hands them to a [`DownloadTarget`].
///
/// # Example
///
/// ```
/// use csv_export::csv_handler::record_from_pairs;
/// use csv_export::download::MemoryDownload;
/// use csv_export::exporter::CsvExporter;
/// use csv_export::options::ExportOptions;
/// use serde_json::json;
///
/// let mut exporter = CsvExporter::new(MemoryDownload::new());
/// let options = ExportOptions::new(vec![record_from_pairs([("id", json!(1))])]);
/// let outcome = exporter.export(options).unwrap();
///
/// assert!(!outcome.is_skipped());
/// assert_eq!(exporter.target().last().unwrap().text(), "id\n\"1\"");
/// ```
pub struct CsvExporter<T, C = SystemClock> {
    target: T,
    clock: C,
    phase: ExportPhase,
}

impl<T: DownloadTarget> CsvExporter<T, SystemClock> {
    /// Creates an exporter that reads time from the system clock.
    pub fn new(target: T) -> Self {
        Self::with_clock(target, SystemClock)
    }
}

impl<T: DownloadTarget, C: Clock> CsvExporter<T, C> {
    /// Creates an exporter with an explicit clock.
    pub fn with_clock(target: T, clock: C) -> Self {
        Self {
            target,
            clock,
            phase: ExportPhase::Idle,
        }
    }

    /// Current phase. Always [`ExportPhase::Idle`] between calls, even after
    /// a hook or formatter panicked mid-export.
    #[must_use]
    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    /// Runs one export.
    ///
    /// # Errors
    ///
    /// Returns the download target's error when delivery fails. The
    /// completion hook does not run in that case.
    pub fn export(&mut self, options: ExportOptions) -> Result<ExportOutcome, CsvExportError> {
        if options.data.is_empty() {
            debug!("No records to export, skipping");
            return Ok(ExportOutcome::Skipped);
        }

        let receipt = {
            let mut phase = PhaseGuard::new(&mut self.phase);
            run(&mut self.target, &self.clock, &mut phase, &options)?
        };

        if let Some(hook) = &options.on_export_complete {
            hook();
        }
        Ok(ExportOutcome::Delivered(receipt))
    }
}

/// Tracks the phase of one export and puts it back to idle when dropped,
/// including when a hook or formatter unwinds.
struct PhaseGuard<'a> {
    phase: &'a mut ExportPhase,
}

impl<'a> PhaseGuard<'a> {
    fn new(phase: &'a mut ExportPhase) -> Self {
        Self { phase }
    }

    fn transition(&mut self, next: ExportPhase) {
        debug!(from = %self.phase, to = %next, "Export phase change");
        *self.phase = next;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.transition(ExportPhase::Idle);
    }
}

fn run<T: DownloadTarget, C: Clock>(
    target: &mut T,
    clock: &C,
    phase: &mut PhaseGuard<'_>,
    options: &ExportOptions,
) -> Result<DeliveryReceipt, CsvExportError> {
    phase.transition(ExportPhase::Started);
    if let Some(hook) = &options.on_export_start {
        hook();
    }

    let document = serialize(options, clock);
    phase.transition(ExportPhase::Serialized);
    debug!(
        filename = %document.filename,
        rows = document.stats.total_rows(),
        "Serialized CSV document"
    );

    let payload = CsvPayload::from_document(&document);
    let receipt = target.deliver(&payload, &document.filename)?;
    phase.transition(ExportPhase::Delivered);
    Ok(receipt)
}

/// Exports into the current working directory using the system clock.
///
/// Returns [`ExportOutcome::Skipped`] when `options.data` is empty.
pub fn export_to_csv(options: ExportOptions) -> Result<ExportOutcome, CsvExportError> {
    CsvExporter::new(FileDownload::default()).export(options)
}
