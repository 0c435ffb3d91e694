use crate::event::ExtractEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
    pub confidence: f32,
}

/// Raw OCR output for one page that had no table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrFragment {
    pub page: u32,
    pub text: String,
}

/// Everything gathered from the pages before it is shaped into output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedContent {
    pub table_rows: Vec<Vec<String>>,
    pub fragments: Vec<OcrFragment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Table(TabularData),
    /// Non-blank OCR lines with tabs already rewritten to the delimiter.
    Text(Vec<String>),
}

impl Extraction {
    #[must_use]
    pub fn mode(&self) -> OutputMode {
        match self {
            Self::Table(_) => OutputMode::Table,
            Self::Text(_) => OutputMode::OcrText,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::Table(table) => table.rows.len(),
            Self::Text(lines) => lines.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    OcrText,
}

impl OutputMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::OcrText => "ocr-text",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub mode: OutputMode,
    pub row_count: usize,
    pub page_count: usize,
    pub table_pages: Vec<u32>,
    pub ocr_pages: Vec<u32>,
    pub warnings: Vec<ExtractEvent>,
}
