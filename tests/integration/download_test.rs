//! Integration tests for exporting to files on disk

use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

use csv_export::csv_handler::{record_from_pairs, FixedClock, Record};
use csv_export::download::FileDownload;
use csv_export::exporter::{CsvExporter, ExportOutcome};
use csv_export::options::{ExportOptions, Newline};

fn orders() -> Vec<Record> {
    vec![
        record_from_pairs([
            ("id", json!(1)),
            ("customer", json!("Doe, John")),
            ("note", json!("said \"rush\"")),
            ("paid", json!(true)),
        ]),
        record_from_pairs([
            ("id", json!(2)),
            ("customer", json!("Ann")),
            ("note", json!(null)),
            ("paid", json!(false)),
        ]),
        record_from_pairs([("id", json!(3)), ("customer", json!("Multi\nLine"))]),
    ]
}

/// Test a full export with default options.
///
/// 1. Export three records into a temp directory
/// 2. Verify the file name, content type and exact content
#[test]
fn test_export_writes_expected_file() {
    let dir = tempdir().unwrap();
    let mut exporter = CsvExporter::new(FileDownload::new(dir.path()));

    let outcome = exporter.export(ExportOptions::new(orders())).unwrap();
    let receipt = outcome.receipt().expect("document should be delivered");

    assert_eq!(receipt.filename, "export.csv");
    assert_eq!(receipt.content_type, "text/csv;charset=utf-8");

    let content = std::fs::read_to_string(dir.path().join("export.csv")).unwrap();
    assert_eq!(
        content,
        "id,customer,note,paid\n\
         \"1\",\"Doe, John\",\"said \"\"rush\"\"\",\"true\"\n\
         \"2\",\"Ann\",,\"false\"\n\
         \"3\",\"Multi\nLine\",,"
    );
}

/// Test that the csv crate reads back exactly the values written.
#[test]
fn test_exported_file_reads_back_with_csv_crate() {
    let dir = tempdir().unwrap();
    let mut exporter = CsvExporter::new(FileDownload::new(dir.path()));
    exporter
        .export(
            ExportOptions::new(orders())
                .with_quote_values(false)
                .with_newline(Newline::CrLf),
        )
        .unwrap();

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(dir.path().join("export.csv"))
        .unwrap();

    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, ["id", "customer", "note", "paid"]);

    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], ["1", "Doe, John", "said \"rush\"", "true"]);
    assert_eq!(rows[1], ["2", "Ann", "", "false"]);
    assert_eq!(rows[2], ["3", "Multi\nLine", "", ""]);
}

/// Test BOM, timestamped filename and extra rows together.
#[test]
fn test_export_with_bom_timestamp_and_extra_rows() {
    let dir = tempdir().unwrap();
    let clock = FixedClock(
        Utc.with_ymd_and_hms(2023, 12, 25, 10, 30, 45).unwrap()
            + chrono::Duration::milliseconds(123),
    );
    let mut exporter = CsvExporter::with_clock(FileDownload::new(dir.path()), clock);

    let options = ExportOptions::new(vec![record_from_pairs([("name", json!("Alice"))])])
        .with_filename("test.csv")
        .with_timestamp(true)
        .with_bom(true)
        .with_quote_values(false)
        .with_prepend_rows(vec![vec!["Title".to_string()], vec![]])
        .with_append_rows(vec![vec!["Generated".to_string(), "today".to_string()]]);
    exporter.export(options).unwrap();

    let path = dir.path().join("test-2023-12-25T10-30-45.csv");
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..3], [0xEF, 0xBB, 0xBF]);
    assert_eq!(
        std::str::from_utf8(&bytes[3..]).unwrap(),
        "Title\n\nname\nAlice\nGenerated,today"
    );
}

/// Test that an empty record list writes nothing and calls no hooks.
#[test]
fn test_empty_export_writes_nothing() {
    let dir = tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let start_calls = calls.clone();
    let complete_calls = calls.clone();

    let options = ExportOptions::new(Vec::new())
        .on_export_start(move || {
            start_calls.fetch_add(1, Ordering::SeqCst);
        })
        .on_export_complete(move || {
            complete_calls.fetch_add(1, Ordering::SeqCst);
        });

    let mut exporter = CsvExporter::new(FileDownload::new(dir.path()));
    let outcome = exporter.export(options).unwrap();

    assert_eq!(outcome, ExportOutcome::Skipped);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// Test that exporting twice to the same name replaces the file.
#[test]
fn test_repeated_export_overwrites() {
    let dir = tempdir().unwrap();
    let mut exporter = CsvExporter::new(FileDownload::new(dir.path()));

    exporter
        .export(ExportOptions::new(vec![record_from_pairs([("v", json!("first"))])]))
        .unwrap();
    exporter
        .export(ExportOptions::new(vec![record_from_pairs([("v", json!("second"))])]))
        .unwrap();

    let content = std::fs::read_to_string(dir.path().join("export.csv")).unwrap();
    assert_eq!(content, "v\n\"second\"");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

/// Test that a delivery failure surfaces as an error and skips the completion hook.
#[test]
fn test_export_into_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let completed = Arc::new(AtomicUsize::new(0));
    let completed_hook = completed.clone();

    let mut exporter = CsvExporter::new(FileDownload::new(dir.path().join("nope")));
    let options = ExportOptions::new(orders()).on_export_complete(move || {
        completed_hook.fetch_add(1, Ordering::SeqCst);
    });

    assert!(exporter.export(options).is_err());
    assert_eq!(completed.load(Ordering::SeqCst), 0);
}
