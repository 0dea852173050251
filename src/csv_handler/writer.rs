use tracing::debug;

use super::escape::format_cell;
use super::finalize::{apply_bom, decorate_filename, Clock};
use super::header::{resolve_columns, Columns};
use super::record::Record;
use crate::options::ExportOptions;

/// Row counts for one serialized document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Literal rows emitted before the header.
    pub prepended_rows: usize,
    /// 1 when the header row was emitted, otherwise 0.
    pub header_rows: usize,
    /// One per input record.
    pub data_rows: usize,
    /// Literal rows emitted after the data.
    pub appended_rows: usize,
}

impl WriteStats {
    /// Total number of rows in the document.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.prepended_rows + self.header_rows + self.data_rows + self.appended_rows
    }
}

/// A finished CSV document, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    /// Full text, including the byte-order mark when requested.
    pub content: String,
    /// Final filename, including the timestamp when requested.
    pub filename: String,
    /// Declared charset label.
    pub encoding: String,
    /// Row counts.
    pub stats: WriteStats,
}

/// Assembles the rows of a CSV document.
///
/// Row order is fixed: prepended rows, the header row (when enabled), one
/// row per record, appended rows. Prepended, appended, and header rows are
/// joined verbatim; only data cells go through formatting and escaping.
///
/// # Example
///
/// ```
/// use csv_export::csv_handler::{record_from_pairs, CsvWriter};
/// use csv_export::options::ExportOptions;
/// use serde_json::json;
///
/// let options = ExportOptions::new(vec![record_from_pairs([
///     ("name", json!("Doe, John")),
///     ("age", json!(30)),
/// ])]);
/// let writer = CsvWriter::new(&options);
/// assert_eq!(writer.body(), "name,age\n\"Doe, John\",\"30\"");
/// ```
pub struct CsvWriter<'a> {
    options: &'a ExportOptions,
    columns: Columns,
}

impl<'a> CsvWriter<'a> {
    /// Creates a writer, resolving the columns once.
    #[must_use]
    pub fn new(options: &'a ExportOptions) -> Self {
        let columns = resolve_columns(options);
        debug!(
            columns = columns.len(),
            records = options.data.len(),
            "Resolved CSV columns"
        );
        Self { options, columns }
    }

    /// The resolved columns.
    #[must_use]
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Joins pre-rendered cells with the delimiter, without escaping.
    #[must_use]
    pub fn literal_row(&self, cells: &[String]) -> String {
        cells.join(&self.options.delimiter)
    }

    /// The header row text.
    #[must_use]
    pub fn header_row(&self) -> String {
        self.literal_row(&self.columns.labels)
    }

    /// Formats one record as a row.
    #[must_use]
    pub fn data_row(&self, record: &Record) -> String {
        let cells: Vec<String> = self
            .columns
            .selectors
            .iter()
            .map(|selector| {
                format_cell(
                    record.get(selector),
                    selector,
                    &self.options.formatters,
                    &self.options.delimiter,
                    self.options.quote_values,
                )
            })
            .collect();
        self.literal_row(&cells)
    }

    /// All rows in document order, with their counts.
    #[must_use]
    pub fn rows(&self) -> (Vec<String>, WriteStats) {
        let options = self.options;
        let mut rows = Vec::with_capacity(
            options.prepend_rows.len() + 1 + options.data.len() + options.append_rows.len(),
        );
        let mut stats = WriteStats::default();

        for cells in &options.prepend_rows {
            rows.push(self.literal_row(cells));
            stats.prepended_rows += 1;
        }

        if options.include_header {
            rows.push(self.header_row());
            stats.header_rows = 1;
        }

        for record in &options.data {
            rows.push(self.data_row(record));
            stats.data_rows += 1;
        }

        for cells in &options.append_rows {
            rows.push(self.literal_row(cells));
            stats.appended_rows += 1;
        }

        (rows, stats)
    }

    /// The document body: all rows joined by the configured newline.
    #[must_use]
    pub fn body(&self) -> String {
        self.rows().0.join(self.options.newline.as_str())
    }

    /// Builds the final document: body, optional BOM, decorated filename.
    #[must_use]
    pub fn finish(&self, clock: &dyn Clock) -> CsvDocument {
        let (rows, stats) = self.rows();
        let body = rows.join(self.options.newline.as_str());
        let timestamp = self.options.add_timestamp.then(|| clock.now());

        CsvDocument {
            content: apply_bom(body, self.options.include_bom),
            filename: decorate_filename(&self.options.filename, timestamp),
            encoding: self.options.encoding.clone(),
            stats,
        }
    }
}

/// Serializes `options.data` into a finished document.
///
/// This is the pure half of an export: no hooks run and nothing is written.
#[must_use]
pub fn serialize(options: &ExportOptions, clock: &dyn Clock) -> CsvDocument {
    CsvWriter::new(options).finish(clock)
}
