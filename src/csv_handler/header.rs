//! Header resolution.
//!
//! Decides once per export which fields are read from each record (the
//! selectors) and what text the header row shows (the labels).

use crate::options::ExportOptions;

/// Resolved column set for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    /// Field selectors, in output order.
    pub selectors: Vec<String>,
    /// Header text, one per selector.
    pub labels: Vec<String>,
}

impl Columns {
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// Resolves selectors and labels from the options.
///
/// Selectors are the explicit `headers` when given and non-empty, otherwise
/// the key order of the first record. Labels are the selectors when
/// `use_keys_as_header` is set; otherwise each label comes from `labels` at
/// the same position, falling back to the selector when `labels` is absent
/// or too short.
#[must_use]
pub fn resolve_columns(options: &ExportOptions) -> Columns {
    let selectors: Vec<String> = match options.headers.as_deref() {
        Some(headers) if !headers.is_empty() => headers.to_vec(),
        _ => options
            .data
            .first()
            .map(|record| record.keys().cloned().collect())
            .unwrap_or_default(),
    };

    let labels = if options.use_keys_as_header {
        selectors.clone()
    } else {
        let given = options.labels.as_deref().unwrap_or_default();
        selectors
            .iter()
            .enumerate()
            .map(|(i, selector)| given.get(i).unwrap_or(selector).clone())
            .collect()
    };

    Columns { selectors, labels }
}
