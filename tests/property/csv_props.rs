//! Property-based tests for CSV serialization
//!
//! Output is read back with the `csv` crate wherever a property concerns
//! what a spreadsheet or CSV parser would see.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{json, Value};

use csv_export::csv_handler::{
    escape_value, needs_quoting, record_from_pairs, serialize, unescape_value, CsvWriter,
    FixedClock, Record,
};
use csv_export::options::{ExportOptions, Newline};

/// Strategy for single-byte delimiters the csv crate can read back
fn delimiter_strategy() -> impl Strategy<Value = u8> {
    prop_oneof![Just(b','), Just(b';'), Just(b'|'), Just(b'\t')]
}

/// Strategy for cell text, biased towards characters that need quoting
fn cell_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Plain text
        "[a-zA-Z0-9 ]{0,20}".prop_map(|s| s),
        // Text with delimiters of every kind
        "[a-zA-Z0-9]{0,5}[,;|\t][a-zA-Z0-9]{0,5}".prop_map(|s| s),
        // Text with double quotes
        "[a-zA-Z0-9]{0,5}\"[a-zA-Z0-9]{0,5}\"[a-zA-Z0-9]{0,5}".prop_map(|s| s),
        // Text with newlines
        "[a-zA-Z0-9]{0,10}\n[a-zA-Z0-9]{0,10}".prop_map(|s| s),
        // Mixed special characters
        "[a-zA-Z0-9]{0,5},\"[a-zA-Z0-9]{0,5}\"\n[a-zA-Z0-9]{0,5}".prop_map(|s| s),
        Just(r#"{"key": "value, with comma"}"#.to_string()),
        Just("Hello 世界 🌍".to_string()),
    ]
}

/// Strategy for a cell value: text, number, boolean or null
fn cell_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        cell_text_strategy().prop_map(Value::String),
        any::<i64>().prop_map(|n| json!(n)),
        // Floats in half steps, whole numbers included
        (-2000i32..2000).prop_map(|n| json!(f64::from(n) / 2.0)),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
    ]
}

/// Strategy for records with a non-empty `id` followed by two arbitrary columns
fn records_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(
        (
            "[a-z][a-z0-9]{0,8}",
            cell_value_strategy(),
            cell_value_strategy(),
        )
            .prop_map(|(id, a, b)| record_from_pairs([("id", json!(id)), ("a", a), ("b", b)])),
        1..20,
    )
}

/// Strategy for clock instants with millisecond precision
fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (
        2000i32..2100,
        1u32..13,
        1u32..29,
        0u32..24,
        0u32..60,
        0u32..60,
        0i64..1000,
    )
        .prop_map(|(year, month, day, hour, min, sec, millis)| {
            Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
                .unwrap()
                + Duration::milliseconds(millis)
        })
}

/// Expected text of a value as read back by a CSV parser
fn expected_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.is_f64() => {
            let f = n.as_f64().unwrap();
            if f.fract() == 0.0 {
                format!("{}", f as i64)
            } else {
                let half = f.trunc() as i64;
                let sign = if f < 0.0 && half == 0 { "-" } else { "" };
                format!("{}{}.5", sign, half)
            }
        }
        Some(other) => other.to_string(),
    }
}

fn read_back(content: &str, delimiter: u8) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes())
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Escaping a value and stripping the quotes again yields the original text.
    #[test]
    fn escape_unescape_roundtrip(
        text in cell_text_strategy(),
        delimiter in delimiter_strategy(),
        force in any::<bool>(),
    ) {
        let delimiter = (delimiter as char).to_string();
        let escaped = escape_value(&text, &delimiter, force);
        prop_assert_eq!(unescape_value(&escaped), text);
    }

    // Unsafe text is always quoted, whatever the quoting setting.
    #[test]
    fn unsafe_text_is_always_quoted(
        text in cell_text_strategy(),
        delimiter in delimiter_strategy(),
    ) {
        let delimiter = (delimiter as char).to_string();
        let escaped = escape_value(&text, &delimiter, false);
        if needs_quoting(&text, &delimiter) {
            prop_assert!(escaped.starts_with('"') && escaped.ends_with('"'));
            prop_assert!(escaped.len() >= text.len() + 2);
        } else {
            prop_assert_eq!(escaped, text);
        }
    }

    // A CSV parser reads back exactly the header and the stringified values.
    #[test]
    fn csv_reader_sees_original_values(
        records in records_strategy(),
        delimiter in delimiter_strategy(),
        quote_values in any::<bool>(),
        crlf in any::<bool>(),
    ) {
        let options = ExportOptions::new(records.clone())
            .with_delimiter((delimiter as char).to_string())
            .with_quote_values(quote_values)
            .with_newline(if crlf { Newline::CrLf } else { Newline::Lf });
        let body = CsvWriter::new(&options).body();
        let rows = read_back(&body, delimiter);

        prop_assert_eq!(rows.len(), records.len() + 1);
        prop_assert_eq!(&rows[0], &vec!["id".to_string(), "a".to_string(), "b".to_string()]);
        for (row, record) in rows[1..].iter().zip(&records) {
            let expected: Vec<String> = ["id", "a", "b"]
                .iter()
                .map(|k| expected_text(record.get(*k)))
                .collect();
            prop_assert_eq!(row, &expected);
        }
    }

    // Header + data rows equal 1 + record count, independent of extra rows.
    #[test]
    fn row_count_matches_records(
        records in records_strategy(),
        include_header in any::<bool>(),
        prepend in 0usize..4,
        append in 0usize..4,
    ) {
        let count = records.len();
        let options = ExportOptions::new(records)
            .with_include_header(include_header)
            .with_prepend_rows(vec![vec!["pre".to_string()]; prepend])
            .with_append_rows(vec![vec!["post".to_string()]; append]);
        let (rows, stats) = CsvWriter::new(&options).rows();

        prop_assert_eq!(stats.header_rows + stats.data_rows, usize::from(include_header) + count);
        prop_assert_eq!(stats.prepended_rows, prepend);
        prop_assert_eq!(stats.appended_rows, append);
        prop_assert_eq!(rows.len(), stats.total_rows());
    }

    // Dropping the header leaves the data rows untouched and in order.
    #[test]
    fn excluding_header_keeps_data_rows(records in records_strategy()) {
        let with_header = ExportOptions::new(records.clone());
        let without_header = ExportOptions::new(records).with_include_header(false);

        let (rows_with, _) = CsvWriter::new(&with_header).rows();
        let (rows_without, _) = CsvWriter::new(&without_header).rows();
        prop_assert_eq!(&rows_with[1..], &rows_without[..]);
    }

    // Same input and a frozen clock give byte-identical documents.
    #[test]
    fn serialization_is_idempotent(
        records in records_strategy(),
        at in instant_strategy(),
        include_bom in any::<bool>(),
    ) {
        let options = ExportOptions::new(records)
            .with_bom(include_bom)
            .with_timestamp(true)
            .with_filename("data.csv");
        let clock = FixedClock(at);

        let first = serialize(&options, &clock);
        let second = serialize(&options, &clock);
        prop_assert_eq!(first.content.as_bytes(), second.content.as_bytes());
        prop_assert_eq!(&first.filename, &second.filename);
        prop_assert!(first.filename.starts_with("data-"));
        prop_assert!(first.filename.ends_with(".csv"));
        prop_assert!(!first.filename.contains(':'));
    }

    // Null and missing fields never render as text.
    #[test]
    fn null_fields_render_empty(
        count in 1usize..10,
        quote_values in any::<bool>(),
    ) {
        let records: Vec<Record> = (0..count)
            .map(|i| {
                if i % 2 == 0 {
                    record_from_pairs([("x", Value::Null), ("y", Value::Null)])
                } else {
                    record_from_pairs([("x", Value::Null)])
                }
            })
            .collect();
        let options = ExportOptions::new(records)
            .with_include_header(false)
            .with_quote_values(quote_values);
        let body = CsvWriter::new(&options).body();

        prop_assert!(!body.contains("null"));
        prop_assert!(!body.contains("undefined"));
        prop_assert!(body.split('\n').all(|row| row == ","));
    }

    // With use_keys_as_header the header row is the selector list, labels or not.
    #[test]
    fn keys_as_header_ignores_labels(
        labels in prop::collection::vec("[A-Z][a-z]{0,8}", 0..5),
        records in records_strategy(),
    ) {
        let options = ExportOptions::new(records)
            .with_labels(labels)
            .with_use_keys_as_header(true);
        let (rows, _) = CsvWriter::new(&options).rows();
        prop_assert_eq!(&rows[0], "id,a,b");
    }
}

#[test]
fn example_default_options() {
    let options = ExportOptions::new(vec![record_from_pairs([
        ("name", json!("Doe, John")),
        ("age", json!(30)),
    ])]);
    let body = CsvWriter::new(&options).body();
    assert_eq!(body, "name,age\n\"Doe, John\",\"30\"");
}

#[test]
fn example_prepend_title_and_blank_row() {
    let options = ExportOptions::new(vec![record_from_pairs([
        ("name", json!("Doe, John")),
        ("age", json!(30)),
    ])])
    .with_prepend_rows(vec![vec!["Title".to_string()], vec![]]);
    let body = CsvWriter::new(&options).body();
    assert!(body.starts_with("Title\n\nname,age\n"));
}
