//! Export options module
//!
//! Defines [`ExportOptions`], the full option set for one export call, and
//! [`OptionsFile`], the serializable subset that can be loaded from JSON.
//!
//! # Defaults
//!
//! | Option | Default |
//! |--------|---------|
//! | `filename` | `export.csv` |
//! | `headers` | keys of the first record |
//! | `labels` | the headers |
//! | `use_keys_as_header` | `false` |
//! | `include_header` | `true` |
//! | `include_bom` | `false` |
//! | `delimiter` | `,` |
//! | `quote_values` | `true` |
//! | `newline` | `\n` |
//! | `encoding` | `utf-8` |
//! | `add_timestamp` | `false` |

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use crate::csv_handler::Record;
use crate::error::CsvExportError;

/// Default output filename.
pub const DEFAULT_FILENAME: &str = "export.csv";

/// Default cell delimiter.
pub const DEFAULT_DELIMITER: &str = ",";

/// Default declared charset.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Per-column value transform.
pub type Formatter = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Zero-argument lifecycle callback.
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// Row separator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Newline {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl Newline {
    /// The separator text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
        }
    }
}

impl std::str::FromStr for Newline {
    type Err = CsvExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "\n" | "lf" | "LF" => Ok(Newline::Lf),
            "\r\n" | "crlf" | "CRLF" => Ok(Newline::CrLf),
            other => Err(CsvExportError::InvalidArgument(format!(
                "unsupported newline {:?}, expected \"\\n\" or \"\\r\\n\"",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Newline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Formatter table keyed by field selector.
///
/// Selectors without an entry pass their raw value through unchanged.
#[derive(Clone, Default)]
pub struct Formatters {
    inner: HashMap<String, Formatter>,
}

impl Formatters {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` for `selector`, replacing any previous entry.
    pub fn insert<F>(&mut self, selector: impl Into<String>, f: F)
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.inner.insert(selector.into(), Arc::new(f));
    }

    /// Applies the formatter for `selector`, or returns the value unchanged.
    #[must_use]
    pub fn apply(&self, selector: &str, value: &Value) -> Value {
        match self.inner.get(selector) {
            Some(f) => f(value),
            None => value.clone(),
        }
    }

    /// Whether a formatter is registered for `selector`.
    #[must_use]
    pub fn contains(&self, selector: &str) -> bool {
        self.inner.contains_key(selector)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for Formatters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.inner.keys().collect();
        keys.sort();
        f.debug_set().entries(keys).finish()
    }
}

/// Options for a single export call.
///
/// Only `data` is required; every other field has a default. Build with
/// [`ExportOptions::new`] and the `with_*` methods:
///
/// ```
/// use csv_export::csv_handler::record_from_pairs;
/// use csv_export::options::{ExportOptions, Newline};
/// use serde_json::json;
///
/// let options = ExportOptions::new(vec![record_from_pairs([("name", json!("Alice"))])])
///     .with_filename("people.csv")
///     .with_delimiter(";")
///     .with_newline(Newline::CrLf);
/// assert_eq!(options.delimiter, ";");
/// ```
#[derive(Clone)]
pub struct ExportOptions {
    /// Source rows.
    pub data: Vec<Record>,
    /// Base output filename.
    pub filename: String,
    /// Column selectors and order. Derived from the first record when unset.
    pub headers: Option<Vec<String>>,
    /// Header display text, one per column.
    pub labels: Option<Vec<String>>,
    /// Use the selectors as header text, ignoring `labels`.
    pub use_keys_as_header: bool,
    /// Emit the header row.
    pub include_header: bool,
    /// Prefix the document with a byte-order mark.
    pub include_bom: bool,
    /// Cell separator.
    pub delimiter: String,
    /// Quote every non-empty cell. Unsafe cells are quoted regardless.
    pub quote_values: bool,
    /// Row separator.
    pub newline: Newline,
    /// Charset label declared on the payload.
    pub encoding: String,
    /// Append a timestamp to the filename.
    pub add_timestamp: bool,
    /// Per-column value transforms.
    pub formatters: Formatters,
    /// Literal rows emitted before the header.
    pub prepend_rows: Vec<Vec<String>>,
    /// Literal rows emitted after the data.
    pub append_rows: Vec<Vec<String>>,
    /// Called before serialization.
    pub on_export_start: Option<Hook>,
    /// Called after delivery.
    pub on_export_complete: Option<Hook>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            filename: DEFAULT_FILENAME.to_string(),
            headers: None,
            labels: None,
            use_keys_as_header: false,
            include_header: true,
            include_bom: false,
            delimiter: DEFAULT_DELIMITER.to_string(),
            quote_values: true,
            newline: Newline::Lf,
            encoding: DEFAULT_ENCODING.to_string(),
            add_timestamp: false,
            formatters: Formatters::new(),
            prepend_rows: Vec::new(),
            append_rows: Vec::new(),
            on_export_start: None,
            on_export_complete: None,
        }
    }
}

impl fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportOptions")
            .field("records", &self.data.len())
            .field("filename", &self.filename)
            .field("headers", &self.headers)
            .field("labels", &self.labels)
            .field("use_keys_as_header", &self.use_keys_as_header)
            .field("include_header", &self.include_header)
            .field("include_bom", &self.include_bom)
            .field("delimiter", &self.delimiter)
            .field("quote_values", &self.quote_values)
            .field("newline", &self.newline)
            .field("encoding", &self.encoding)
            .field("add_timestamp", &self.add_timestamp)
            .field("formatters", &self.formatters)
            .field("prepend_rows", &self.prepend_rows.len())
            .field("append_rows", &self.append_rows.len())
            .field("on_export_start", &self.on_export_start.is_some())
            .field("on_export_complete", &self.on_export_complete.is_some())
            .finish()
    }
}

impl ExportOptions {
    /// Creates options for `data` with every other field at its default.
    #[must_use]
    pub fn new(data: Vec<Record>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Checks values that would make the output unusable.
    ///
    /// # Errors
    ///
    /// Returns [`CsvExportError::InvalidArgument`] when the delimiter or the
    /// encoding label is empty.
    pub fn validate(&self) -> Result<(), CsvExportError> {
        if self.delimiter.is_empty() {
            return Err(CsvExportError::InvalidArgument(
                "delimiter must not be empty".to_string(),
            ));
        }
        if self.encoding.is_empty() {
            return Err(CsvExportError::InvalidArgument(
                "encoding must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    #[must_use]
    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_use_keys_as_header(mut self, enable: bool) -> Self {
        self.use_keys_as_header = enable;
        self
    }

    #[must_use]
    pub fn with_include_header(mut self, enable: bool) -> Self {
        self.include_header = enable;
        self
    }

    #[must_use]
    pub fn with_bom(mut self, enable: bool) -> Self {
        self.include_bom = enable;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn with_quote_values(mut self, enable: bool) -> Self {
        self.quote_values = enable;
        self
    }

    #[must_use]
    pub fn with_newline(mut self, newline: Newline) -> Self {
        self.newline = newline;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, enable: bool) -> Self {
        self.add_timestamp = enable;
        self
    }

    /// Registers a formatter for one column.
    #[must_use]
    pub fn with_formatter<F>(mut self, selector: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.formatters.insert(selector, f);
        self
    }

    #[must_use]
    pub fn with_prepend_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.prepend_rows = rows;
        self
    }

    #[must_use]
    pub fn with_append_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.append_rows = rows;
        self
    }

    #[must_use]
    pub fn on_export_start<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_export_start = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_export_complete<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_export_complete = Some(Arc::new(f));
        self
    }
}

/// Serializable export options loaded from a JSON file.
///
/// Every field is optional; unset fields leave the target options untouched.
/// Keys use the camelCase spelling common to front-end configs:
///
/// ```json
/// {
///     "filename": "report.csv",
///     "headers": ["name", "age"],
///     "labels": ["Name", "Age"],
///     "delimiter": ";",
///     "includeBOM": true,
///     "newline": "\r\n",
///     "prependRows": [["Quarterly report"], []]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptionsFile {
    pub filename: Option<String>,
    pub headers: Option<Vec<String>>,
    pub labels: Option<Vec<String>>,
    pub use_keys_as_header: Option<bool>,
    pub include_header: Option<bool>,
    #[serde(rename = "includeBOM", alias = "includeBom")]
    pub include_bom: Option<bool>,
    pub delimiter: Option<String>,
    pub quote_values: Option<bool>,
    pub newline: Option<Newline>,
    pub encoding: Option<String>,
    pub add_timestamp: Option<bool>,
    pub prepend_rows: Option<Vec<Vec<String>>>,
    pub append_rows: Option<Vec<Vec<String>>>,
}

impl OptionsFile {
    /// Loads options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, CsvExportError> {
        let file = File::open(path)?;
        let options = serde_json::from_reader(BufReader::new(file))?;
        Ok(options)
    }

    /// Overlays the fields that are set onto `options`.
    #[must_use]
    pub fn apply(self, mut options: ExportOptions) -> ExportOptions {
        if let Some(filename) = self.filename {
            options.filename = filename;
        }
        if let Some(headers) = self.headers {
            options.headers = Some(headers);
        }
        if let Some(labels) = self.labels {
            options.labels = Some(labels);
        }
        if let Some(v) = self.use_keys_as_header {
            options.use_keys_as_header = v;
        }
        if let Some(v) = self.include_header {
            options.include_header = v;
        }
        if let Some(v) = self.include_bom {
            options.include_bom = v;
        }
        if let Some(delimiter) = self.delimiter {
            options.delimiter = delimiter;
        }
        if let Some(v) = self.quote_values {
            options.quote_values = v;
        }
        if let Some(newline) = self.newline {
            options.newline = newline;
        }
        if let Some(encoding) = self.encoding {
            options.encoding = encoding;
        }
        if let Some(v) = self.add_timestamp {
            options.add_timestamp = v;
        }
        if let Some(rows) = self.prepend_rows {
            options.prepend_rows = rows;
        }
        if let Some(rows) = self.append_rows {
            options.append_rows = rows;
        }
        options
    }
}
