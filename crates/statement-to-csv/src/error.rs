use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no pages available after applying selection")]
    NoPagesSelected,

    #[error("no data extracted from PDF (tables or OCR)")]
    NoDataExtracted,

    #[error("{header_columns} columns in header, but data rows have {data_columns} columns")]
    ColumnMismatch {
        header_columns: usize,
        data_columns: usize,
    },
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("{tool} is not installed or not in PATH")]
    ToolNotFound { tool: &'static str },

    #[error("{tool} exited with status {code}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        code: i32,
        stderr: String,
    },

    #[error("page {page} was not rendered to an image")]
    NoImage { page: u32 },

    #[error("OCR I/O error: {0}")]
    Io(#[from] io::Error),
}
