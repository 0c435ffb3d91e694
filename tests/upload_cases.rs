use csv::ReaderBuilder;
use pretty_assertions::assert_eq;
use statement_to_csv::{
    ConversionReport, EventCode, ExtractEvent, OutputMode, Severity,
};
use statement_uploader::error::ApiError;
use statement_uploader::models::{ConversionSummary, DeclaredType, UploadOutcome};
use statement_uploader::upload::{
    RAW_TEXT_MESSAGE, preview_csv_bytes, read_artifact, validate_declared_type,
};
use tempfile::tempdir;

#[test]
fn declared_type_mismatch_names_the_expected_type() {
    let error = validate_declared_type(Some("csv"), Some("statement.pdf")).expect_err("mismatch");
    assert_eq!(
        error,
        ApiError::TypeMismatch(
            "The uploaded file is not a CSV. Please upload a valid CSV file.".to_string()
        )
    );

    assert_eq!(
        validate_declared_type(Some("pdf"), Some("statement.pdf")).expect("match"),
        DeclaredType::Pdf
    );
}

#[test]
fn preview_matches_a_direct_parse() {
    let content = "Date,Description,Amount\n03/01,\"Coffee, large\",-3.50\n03/02,Salary,2500.00\n";

    let preview = preview_csv_bytes(content.as_bytes(), 5).expect("valid CSV");

    let mut reader = ReaderBuilder::new().from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("record")
                .iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    assert_eq!(preview.headers, headers);
    assert_eq!(preview.rows, rows);
    assert_eq!(preview.total_rows, 2);
}

#[test]
fn wider_csv_records_are_a_parse_error() {
    let error = preview_csv_bytes(b"Date,Amount\n03/01,1,extra\n", 5).expect_err("too wide");
    assert_eq!(error.code(), "parse_error");
}

#[test]
fn artifact_that_is_a_table_is_previewed() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("converted.csv");
    std::fs::write(&path, "Date,Amount\n03/01,-3.50\n").expect("artifact should be written");

    let outcome = read_artifact(&path, 5, None).expect("readable artifact");

    let UploadOutcome::Table { source, preview, .. } = outcome else {
        panic!("expected a table, got {outcome:?}");
    };
    assert_eq!(source, DeclaredType::Pdf);
    assert_eq!(preview.rows, vec![vec!["03/01".to_string(), "-3.50".to_string()]]);
}

#[test]
fn artifact_with_short_lines_is_still_a_table() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("converted.csv");
    std::fs::write(&path, "03/01,Coffee,-3.50\nClosing balance,120.00\n")
        .expect("artifact should be written");

    let outcome = read_artifact(&path, 5, None).expect("readable artifact");

    let UploadOutcome::Table { preview, .. } = outcome else {
        panic!("expected a table, got {outcome:?}");
    };
    assert_eq!(preview.headers, vec!["03/01", "Coffee", "-3.50"]);
    assert_eq!(
        preview.rows,
        vec![vec![
            "Closing balance".to_string(),
            "120.00".to_string(),
            String::new()
        ]]
    );
}

#[test]
fn artifact_that_is_not_a_table_falls_back_to_raw_text() {
    let dir = tempdir().expect("tempdir should be created");
    let path = dir.path().join("converted.csv");
    let ocr_text = "Closing balance,120.00\n03/01,Coffee,-3.50\n";
    std::fs::write(&path, ocr_text).expect("artifact should be written");

    let outcome = read_artifact(&path, 5, None).expect("readable artifact");

    assert_eq!(
        outcome,
        UploadOutcome::Text {
            source: DeclaredType::Pdf,
            message: RAW_TEXT_MESSAGE.to_string(),
            text: ocr_text.to_string(),
            conversion: None,
        }
    );
}

#[test]
fn conversion_summary_keeps_only_warnings_and_errors() {
    let report = ConversionReport {
        mode: OutputMode::OcrText,
        row_count: 3,
        page_count: 2,
        table_pages: Vec::new(),
        ocr_pages: vec![1, 2],
        warnings: vec![
            ExtractEvent::new(Severity::Info, EventCode::NoTableOnPage, "no table found")
                .with_page(1),
            ExtractEvent::new(Severity::Warning, EventCode::OcrFailed, "tesseract exited 1")
                .with_page(2),
        ],
    };

    let summary = ConversionSummary::from(&report);

    assert_eq!(summary.mode, "ocr-text");
    assert_eq!(summary.ocr_pages, vec![1, 2]);
    assert_eq!(summary.warnings, vec!["page 2: tesseract exited 1".to_string()]);
}
