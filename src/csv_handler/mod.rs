//! CSV handler module
//!
//! Turns records and export options into a finished CSV document.
//! Nothing in here performs I/O apart from [`load_records`].

pub mod escape;
pub mod finalize;
pub mod header;
pub mod record;
pub mod writer;

pub use escape::{escape_value, format_cell, needs_quoting, unescape_value};
pub use finalize::{decorate_filename, Clock, FixedClock, SystemClock, BOM};
pub use header::{resolve_columns, Columns};
pub use record::{load_records, record_from_pairs, records_from_value, value_to_text, Record};
pub use writer::{serialize, CsvDocument, CsvWriter, WriteStats};
