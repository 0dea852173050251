//! Record types for CSV serialization.
//!
//! A [`Record`] is an ordered JSON object: field name to scalar value. Key
//! order is preserved (the `preserve_order` feature of `serde_json`), which
//! is what makes header derivation from the first record deterministic.

use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::CsvExportError;

/// One exportable row: an ordered mapping from field name to value.
///
/// Field sets may differ between records. Fields that a record lacks render
/// as empty cells.
///
/// # Example
///
/// ```
/// use csv_export::csv_handler::Record;
/// use serde_json::json;
///
/// let mut record = Record::new();
/// record.insert("name".to_string(), json!("Doe, John"));
/// record.insert("age".to_string(), json!(30));
/// assert_eq!(record.keys().collect::<Vec<_>>(), ["name", "age"]);
/// ```
pub type Record = Map<String, Value>;

/// Converts a value to its canonical cell text.
///
/// Returns `None` for `null`, which callers render as an empty cell.
/// Strings are used verbatim, numbers and booleans use their JSON spelling,
/// and nested arrays or objects are written as compact JSON.
#[must_use]
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_to_text(n)),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Whole-number floats drop the `.0` that `serde_json` prints for them.
fn number_to_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
            format!("{}", f)
        }
        _ => n.to_string(),
    }
}

/// Builds a [`Record`] from `(field, value)` pairs, keeping their order.
pub fn record_from_pairs<I, K>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Parses records from a JSON array of objects.
///
/// # Errors
///
/// Returns [`CsvExportError::Json`] when the input is not a JSON array and
/// [`CsvExportError::InvalidRecord`] when an element is not an object.
pub fn records_from_value(value: Value) -> Result<Vec<Record>, CsvExportError> {
    let items: Vec<Value> = serde_json::from_value(value)?;
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(CsvExportError::InvalidRecord { index }),
        })
        .collect()
}

/// Loads records from a JSON file containing an array of objects.
///
/// ```json
/// [
///     {"name": "Alice", "age": 30},
///     {"name": "Bob", "age": null}
/// ]
/// ```
pub fn load_records(path: &Path) -> Result<Vec<Record>, CsvExportError> {
    let file = File::open(path)?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;
    records_from_value(value)
}
