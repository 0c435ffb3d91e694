use std::path::Path;

use csv::ReaderBuilder;
use statement_to_csv::{
    DEFAULT_OUTPUT_NAME, ExtractError, TesseractOcr, TracingSink, convert_pdf_to_csv,
};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{
    ConversionSummary, DeclaredType, TablePreview, UPLOAD_FILE_NAME, UploadOutcome,
};

pub const CSV_SUCCESS_MESSAGE: &str = "CSV file uploaded successfully";
pub const PDF_SUCCESS_MESSAGE: &str = "PDF converted to CSV successfully";
pub const RAW_TEXT_MESSAGE: &str = "OCR extracted text but couldn't structure it as a table.";

/// A submitted form: the declared type plus the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub file_type: Option<String>,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Checks the declared type and that the file name carries its extension.
pub fn validate_declared_type(
    file_type: Option<&str>,
    file_name: Option<&str>,
) -> Result<DeclaredType, ApiError> {
    let raw = file_type.ok_or_else(|| {
        ApiError::BadRequest("Select the type of file you want to upload.".to_string())
    })?;
    let declared = DeclaredType::parse(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("unsupported file type '{raw}'")))?;

    let name = file_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Upload your file.".to_string()))?;
    if !name.to_ascii_lowercase().ends_with(declared.extension()) {
        return Err(ApiError::TypeMismatch(format!(
            "The uploaded file is not a {label}. Please upload a valid {label} file.",
            label = declared.label()
        )));
    }

    Ok(declared)
}

/// Parses CSV content with a header row and keeps the first `preview_rows`
/// records. Records shorter than the header are padded with empty cells;
/// a record wider than the header is a parse error.
pub fn preview_csv_bytes(bytes: &[u8], preview_rows: usize) -> Result<TablePreview, ApiError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()?
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    if headers.is_empty() {
        return Err(ApiError::Parse(
            "Failed to read CSV: no columns to parse from file".to_string(),
        ));
    }

    let mut rows = Vec::new();
    let mut total_rows = 0_usize;
    for record in reader.records() {
        let record = record?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, csv::Position::line);
            return Err(ApiError::Parse(format!(
                "Failed to read CSV: expected {} fields in line {line}, saw {}",
                headers.len(),
                record.len()
            )));
        }
        if rows.len() < preview_rows {
            let mut row = record.iter().map(ToString::to_string).collect::<Vec<_>>();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        total_rows += 1;
    }

    Ok(TablePreview {
        headers,
        rows,
        total_rows,
    })
}

/// Reads a conversion artifact as a table, or as raw text when it does not
/// parse as one.
pub fn read_artifact(
    path: &Path,
    preview_rows: usize,
    conversion: Option<ConversionSummary>,
) -> Result<UploadOutcome, ApiError> {
    let bytes = std::fs::read(path)?;
    match preview_csv_bytes(&bytes, preview_rows) {
        Ok(preview) => Ok(UploadOutcome::Table {
            source: DeclaredType::Pdf,
            message: PDF_SUCCESS_MESSAGE.to_string(),
            preview,
            conversion,
        }),
        Err(error) => {
            tracing::info!(%error, "artifact is not a table; showing raw text");
            Ok(UploadOutcome::Text {
                source: DeclaredType::Pdf,
                message: RAW_TEXT_MESSAGE.to_string(),
                text: String::from_utf8_lossy(&bytes).into_owned(),
                conversion,
            })
        }
    }
}

/// Converts an uploaded PDF inside its own scratch directory, which is removed
/// once the preview has been read.
pub fn convert_pdf_upload(bytes: &[u8], config: &AppConfig) -> Result<UploadOutcome, ApiError> {
    let workspace = tempfile::Builder::new()
        .prefix("statement-")
        .tempdir_in(&config.work_dir)?;
    let pdf_path = workspace.path().join(UPLOAD_FILE_NAME);
    let csv_path = workspace.path().join(DEFAULT_OUTPUT_NAME);
    std::fs::write(&pdf_path, bytes)?;

    let ocr = TesseractOcr::new(config.ocr_language.clone());
    let report = convert_pdf_to_csv(
        &pdf_path,
        &csv_path,
        &config.extract_options(),
        &ocr,
        &mut TracingSink,
    )
    .inspect_err(|error| log_conversion_failure(workspace.path(), error))?;

    read_artifact(&csv_path, config.preview_rows, Some(ConversionSummary::from(&report)))
}

fn log_conversion_failure(workspace: &Path, error: &ExtractError) {
    tracing::warn!(workspace = %workspace.display(), %error, "PDF conversion failed");
}

pub fn preview_csv_upload(bytes: &[u8], preview_rows: usize) -> Result<UploadOutcome, ApiError> {
    let preview = preview_csv_bytes(bytes, preview_rows)?;
    Ok(UploadOutcome::Table {
        source: DeclaredType::Csv,
        message: CSV_SUCCESS_MESSAGE.to_string(),
        preview,
        conversion: None,
    })
}

/// Validates the form and dispatches on the declared type. PDF conversion
/// runs on the blocking pool.
pub async fn process_upload(
    form: UploadForm,
    config: std::sync::Arc<AppConfig>,
) -> Result<UploadOutcome, ApiError> {
    let declared = validate_declared_type(form.file_type.as_deref(), form.file_name.as_deref())?;
    tracing::info!(
        file_type = declared.label(),
        file_name = form.file_name.as_deref().unwrap_or_default(),
        bytes = form.bytes.len(),
        "processing upload"
    );

    match declared {
        DeclaredType::Csv => preview_csv_upload(&form.bytes, config.preview_rows),
        DeclaredType::Pdf => {
            let bytes = form.bytes;
            tokio::task::spawn_blocking(move || convert_pdf_upload(&bytes, &config)).await?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{preview_csv_bytes, validate_declared_type};
    use crate::error::ApiError;
    use crate::models::DeclaredType;

    #[test]
    fn extension_check_is_case_insensitive() {
        let declared =
            validate_declared_type(Some("PDF"), Some("March Statement.PDF")).expect("valid");
        assert_eq!(declared, DeclaredType::Pdf);
    }

    #[test]
    fn missing_file_name_is_a_bad_request() {
        let error = validate_declared_type(Some("csv"), Some("  ")).expect_err("no name");
        assert!(matches!(error, ApiError::BadRequest(_)));
    }

    #[test]
    fn preview_counts_all_rows_but_keeps_the_first_few() {
        let csv = "Date,Amount\n03/01,1\n03/02,2\n03/03,3\n";
        let preview = preview_csv_bytes(csv.as_bytes(), 2).expect("valid csv");
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.total_rows, 3);
    }

    #[test]
    fn short_records_are_padded_to_the_header() {
        let csv = "Date,Description,Amount\n03/01,Coffee,-3.50\n03/02,Fee\n";
        let preview = preview_csv_bytes(csv.as_bytes(), 5).expect("short rows are allowed");
        assert_eq!(preview.rows[1], vec!["03/02", "Fee", ""]);
    }

    #[test]
    fn wide_records_name_the_line() {
        let csv = "Date,Amount\n03/01,-3.50\n03/02,Fee,-1.00\n";
        let error = preview_csv_bytes(csv.as_bytes(), 5).expect_err("too many fields");
        assert_eq!(
            error,
            ApiError::Parse("Failed to read CSV: expected 2 fields in line 3, saw 3".to_string())
        );
    }

    #[test]
    fn empty_content_has_no_columns() {
        let error = preview_csv_bytes(b"", 5).expect_err("empty");
        assert!(matches!(error, ApiError::Parse(_)));
    }
}
