//! Cell formatting and escaping.
//!
//! A cell goes through four steps: the column formatter (if any), null
//! handling, stringification, and quoting.
//!
//! Quoting is asymmetric. `quote_values = true` quotes every non-empty cell,
//! but `quote_values = false` only skips quoting for cells that are safe on
//! their own. A cell containing the delimiter, a double quote, or a newline
//! is always quoted.

use serde_json::Value;

use super::record::value_to_text;
use crate::options::Formatters;

/// The quote character.
pub const QUOTE: char = '"';

/// Returns true if `text` cannot appear unquoted in a row.
#[must_use]
pub fn needs_quoting(text: &str, delimiter: &str) -> bool {
    text.contains(delimiter) || text.contains(QUOTE) || text.contains('\n')
}

/// Quotes `text` when forced or when it is unsafe, doubling embedded quotes.
///
/// # Examples
///
/// ```
/// use csv_export::csv_handler::escape_value;
///
/// assert_eq!(escape_value("plain", ",", false), "plain");
/// assert_eq!(escape_value("plain", ",", true), "\"plain\"");
/// assert_eq!(escape_value("a,b", ",", false), "\"a,b\"");
/// assert_eq!(escape_value("say \"hi\"", ",", false), "\"say \"\"hi\"\"\"");
/// ```
#[must_use]
pub fn escape_value(text: &str, delimiter: &str, force: bool) -> String {
    if !force && !needs_quoting(text, delimiter) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push(QUOTE);
    for c in text.chars() {
        if c == QUOTE {
            out.push(QUOTE);
        }
        out.push(c);
    }
    out.push(QUOTE);
    out
}

/// Inverse of [`escape_value`] for a single quoted cell.
///
/// Unquoted input is returned unchanged.
#[must_use]
pub fn unescape_value(cell: &str) -> String {
    match cell
        .strip_prefix(QUOTE)
        .and_then(|inner| inner.strip_suffix(QUOTE))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => cell.to_string(),
    }
}

/// Produces the final text of one cell.
///
/// `raw` is `None` when the record has no such field; the formatter then
/// sees `null`. A `null` before or after formatting yields an empty,
/// unquoted cell.
#[must_use]
pub fn format_cell(
    raw: Option<&Value>,
    selector: &str,
    formatters: &Formatters,
    delimiter: &str,
    quote_values: bool,
) -> String {
    let raw = raw.unwrap_or(&Value::Null);
    let formatted = formatters.apply(selector, raw);
    match value_to_text(&formatted) {
        Some(text) => escape_value(&text, delimiter, quote_values),
        None => String::new(),
    }
}
