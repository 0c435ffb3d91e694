use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const DEFAULT_RENDER_DPI: u32 = 300;
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
pub const DEFAULT_OUTPUT_NAME: &str = "converted.csv";
pub const RENDER_DPI_RANGE: RangeInclusive<u32> = 36..=1200;

/// How rows collected from several page tables are split into header and data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderPolicy {
    /// The first collected row is the header; every later row is data, even
    /// when a later page repeats the header.
    #[default]
    FirstRowOnly,
    /// Like `FirstRowOnly`, but later rows identical to the header are dropped.
    DropRepeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if start == 0 || end == 0 {
                    return Err("pages are 1-based".to_string());
                }
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                pages.extend(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                if page == 0 {
                    return Err("pages are 1-based".to_string());
                }
                pages.insert(page);
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub pages: Option<PageSelection>,
    pub delimiter: u8,
    pub min_cols: usize,
    pub header_policy: HeaderPolicy,
    pub ocr_fallback: bool,
    pub render_dpi: u32,
}

impl ExtractOptions {
    pub(crate) fn validate(&self) -> Result<(), crate::ExtractError> {
        if self.min_cols < 2 {
            return Err(crate::ExtractError::InvalidOption(
                "min_cols must be at least 2".to_string(),
            ));
        }
        if !self.delimiter.is_ascii() || self.delimiter == b'\n' || self.delimiter == b'"' {
            return Err(crate::ExtractError::InvalidOption(format!(
                "unsupported delimiter byte 0x{:02x}",
                self.delimiter
            )));
        }
        if !RENDER_DPI_RANGE.contains(&self.render_dpi) {
            return Err(crate::ExtractError::InvalidOption(format!(
                "render dpi {} is outside {}..={}",
                self.render_dpi,
                RENDER_DPI_RANGE.start(),
                RENDER_DPI_RANGE.end()
            )));
        }
        Ok(())
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            delimiter: b',',
            min_cols: 2,
            header_policy: HeaderPolicy::FirstRowOnly,
            ocr_fallback: true,
            render_dpi: DEFAULT_RENDER_DPI,
        }
    }
}
