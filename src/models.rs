use serde::{Deserialize, Serialize};
use statement_to_csv::{ConversionReport, Severity};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const UPLOAD_FILE_NAME: &str = "temp_uploaded.pdf";
pub const PAGE_TITLE: &str = "Transaction File Uploader";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredType {
    Csv,
    Pdf,
}

impl DeclaredType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Pdf => ".pdf",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Pdf => "PDF",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversionSummary {
    pub mode: String,
    pub page_count: usize,
    pub table_pages: Vec<u32>,
    pub ocr_pages: Vec<u32>,
    pub warnings: Vec<String>,
}

impl From<&ConversionReport> for ConversionSummary {
    fn from(report: &ConversionReport) -> Self {
        let warnings = report
            .warnings
            .iter()
            .filter(|event| event.severity >= Severity::Warning)
            .map(|event| match event.page {
                Some(page) => format!("page {page}: {}", event.message),
                None => event.message.clone(),
            })
            .collect();

        Self {
            mode: report.mode.as_str().to_string(),
            page_count: report.page_count,
            table_pages: report.table_pages.clone(),
            ocr_pages: report.ocr_pages.clone(),
            warnings,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UploadOutcome {
    Table {
        source: DeclaredType,
        message: String,
        preview: TablePreview,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        conversion: Option<ConversionSummary>,
    },
    Text {
        source: DeclaredType,
        message: String,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        conversion: Option<ConversionSummary>,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConvertResponse<'a> {
    #[serde(flatten)]
    pub outcome: &'a UploadOutcome,
    pub processed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub ocr_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
