use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::OcrError;
use crate::options::DEFAULT_OCR_LANGUAGE;

const PDFTOPPM: &str = "pdftoppm";
const TESSERACT: &str = "tesseract";

/// Turns one PDF page into plain text by rendering it and reading the image.
pub trait PageOcr {
    fn recognize_page(&self, pdf: &Path, page: u32, dpi: u32) -> Result<String, OcrError>;
}

/// OCR through the `pdftoppm` (poppler-utils) and `tesseract` executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractOcr {
    language: String,
}

impl TesseractOcr {
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Both executables answer a version probe.
    #[must_use]
    pub fn is_available() -> bool {
        let pdftoppm = Command::new(PDFTOPPM).arg("-v").output().is_ok();
        let tesseract = Command::new(TESSERACT).arg("--version").output().is_ok();
        if !pdftoppm {
            tracing::debug!("pdftoppm not found; install poppler-utils for OCR support");
        }
        if !tesseract {
            tracing::debug!("tesseract not found; install tesseract-ocr for OCR support");
        }
        pdftoppm && tesseract
    }

    /// Renders a single page to `<out_dir>/page-<n>.png`.
    pub fn render_page(
        &self,
        pdf: &Path,
        page: u32,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<PathBuf, OcrError> {
        let prefix = out_dir.join(format!("page-{page}"));
        let output = Command::new(PDFTOPPM)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-singlefile")
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|error| spawn_error(PDFTOPPM, error))?;
        check_status(PDFTOPPM, &output)?;

        let image = prefix.with_extension("png");
        if !image.exists() {
            return Err(OcrError::NoImage { page });
        }
        Ok(image)
    }

    pub fn recognize_image(&self, image: &Path) -> Result<String, OcrError> {
        let output = Command::new(TESSERACT)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|error| spawn_error(TESSERACT, error))?;
        check_status(TESSERACT, &output)?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(DEFAULT_OCR_LANGUAGE)
    }
}

impl PageOcr for TesseractOcr {
    fn recognize_page(&self, pdf: &Path, page: u32, dpi: u32) -> Result<String, OcrError> {
        let scratch = tempfile::tempdir()?;
        let image = self.render_page(pdf, page, dpi, scratch.path())?;
        tracing::debug!(page, dpi, image = %image.display(), "rendered page for OCR");
        self.recognize_image(&image)
    }
}

fn spawn_error(tool: &'static str, error: io::Error) -> OcrError {
    if error.kind() == io::ErrorKind::NotFound {
        OcrError::ToolNotFound { tool }
    } else {
        OcrError::Io(error)
    }
}

fn check_status(tool: &'static str, output: &Output) -> Result<(), OcrError> {
    if output.status.success() {
        return Ok(());
    }
    Err(OcrError::ToolFailed {
        tool,
        code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}
