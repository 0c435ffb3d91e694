use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::{UTF_16BE, UTF_16LE};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::error::ExtractError;
use crate::model::PageText;
use crate::options::PageSelection;
use crate::table_parse::split_line_into_cells;

const IDENTITY_H_PLACEHOLDER: &str = "?Identity-H Unimplemented?";

/// pdf-extract separates pages with form feeds.
fn split_layout_pages(raw_text: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw_text.split('\u{000C}').map(str::to_string).collect();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn is_garbled(text: &str) -> bool {
    if text.contains(IDENTITY_H_PLACEHOLDER) {
        return true;
    }

    let mut total = 0_usize;
    let mut suspicious = 0_usize;
    for ch in text.chars() {
        total += 1;
        if ch == '\u{FFFD}' || (ch.is_control() && !matches!(ch, '\n' | '\r' | '\t')) {
            suspicious += 1;
        }
    }
    total > 0 && suspicious * 8 > total
}

/// Decodes a PDF string operand. Strings carrying a UTF-16 byte order mark
/// are decoded as UTF-16; everything else goes through the font encoding.
fn decode_string(encoding: Option<&str>, bytes: &[u8]) -> String {
    let utf16 = match bytes {
        [0xFE, 0xFF, rest @ ..] => Some(UTF_16BE.decode_without_bom_handling(rest)),
        [0xFF, 0xFE, rest @ ..] => Some(UTF_16LE.decode_without_bom_handling(rest)),
        _ => None,
    };
    if let Some((text, had_errors)) = utf16 {
        if !had_errors {
            return text.into_owned();
        }
    }

    Document::decode_text(encoding, bytes)
}

fn is_amount(token: &str) -> bool {
    let digits = token.trim_start_matches(['-', '+', '(', '$']).trim_end_matches([')', '-']);
    let Some((whole, cents)) = digits.rsplit_once('.') else {
        return false;
    };
    cents.len() == 2
        && cents.bytes().all(|byte| byte.is_ascii_digit())
        && !whole.is_empty()
        && whole.bytes().all(|byte| byte.is_ascii_digit() || byte == b',')
}

fn is_date(token: &str) -> bool {
    let parts: Vec<&str> = token.split(['/', '-', '.']).collect();
    (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.len() <= 4 && part.bytes().all(|b| b.is_ascii_digit()))
}

/// Rates how much a page text looks like a statement: column-aligned lines
/// weigh most, then lines carrying a date or an amount.
fn statement_layout_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let mut score = 0_i64;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        score += 1;
        if split_line_into_cells(line).len() >= 2 {
            score += 40;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.iter().any(|token| is_date(token)) {
            score += 10;
        }
        if tokens.iter().any(|token| is_amount(token)) {
            score += 10;
        }
    }

    if is_garbled(text) { score - 1000 } else { score }
}

fn best_candidate(candidates: &[String]) -> String {
    candidates
        .iter()
        .max_by_key(|text| statement_layout_score(text))
        .cloned()
        .unwrap_or_default()
}

/// Text shown by one content stream, one entry per text line.
#[derive(Default)]
struct StreamText {
    lines: Vec<String>,
    current: String,
}

impl StreamText {
    fn push_operands(&mut self, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => self.current.push_str(&decode_string(encoding, bytes)),
                Object::Array(items) => {
                    self.push_operands(encoding, items);
                    self.current.push(' ');
                }
                // large negative kerning inside TJ is a word gap
                Object::Integer(offset) if *offset < -100 => self.current.push(' '),
                Object::Real(offset) if *offset < -100.0 => self.current.push(' '),
                _ => {}
            }
        }
    }

    fn break_line(&mut self) {
        if !self.current.trim().is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
        self.current.clear();
    }

    fn finish(mut self) -> Option<String> {
        self.break_line();
        (!self.lines.is_empty()).then(|| self.lines.join("\n"))
    }
}

fn page_stream_text(document: &Document, page_id: ObjectId) -> Result<Option<String>, lopdf::Error> {
    let content = Content::decode(&document.get_page_content(page_id)?)?;
    let fonts: BTreeMap<Vec<u8>, &str> = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();

    let mut text = StreamText::default();
    let mut encoding = None;
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|name| fonts.get(name).copied());
            }
            "Tj" | "TJ" | "'" | "\"" => text.push_operands(encoding, &operation.operands),
            "T*" | "Td" | "TD" | "Tm" | "ET" => text.break_line(),
            _ => {}
        }
    }
    Ok(text.finish())
}

/// Gathers the usable text candidates for a page. A content stream lopdf
/// cannot decode only costs its own candidate; it fails the page when no other
/// candidate produced text.
fn gather_candidates(
    layout: Option<String>,
    stream: Result<Option<String>, lopdf::Error>,
    extracted: Option<String>,
) -> Result<Vec<String>, lopdf::Error> {
    let layout = layout.filter(|text| !text.trim().is_empty());
    let extracted = extracted.filter(|text| !text.trim().is_empty());
    let stream = match stream {
        Ok(text) => text,
        Err(error) if layout.is_none() && extracted.is_none() => return Err(error),
        Err(error) => {
            tracing::debug!(%error, "content stream unreadable, using other text candidates");
            None
        }
    };

    Ok([layout, stream, extracted].into_iter().flatten().collect())
}

/// An opened PDF whose pages can be read one at a time.
pub(crate) struct PdfSource {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
    layout_pages: Option<Vec<String>>,
}

impl PdfSource {
    /// Loads the document structure. Any failure here means the file is not a
    /// usable PDF, so no page is looked at.
    pub(crate) fn open(input_pdf: &Path) -> Result<Self, ExtractError> {
        let document = Document::load(input_pdf)?;
        let pages = document.get_pages();

        let layout_pages = pdf_extract::extract_text(input_pdf)
            .ok()
            .map(|text| split_layout_pages(&text))
            .filter(|split| split.len() == pages.len());

        Ok(Self {
            document,
            pages,
            layout_pages,
        })
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn selected_pages(&self, selection: Option<&PageSelection>) -> Vec<(u32, ObjectId)> {
        self.pages
            .iter()
            .filter(|(page_no, _)| selection.is_none_or(|selected| selected.contains(**page_no)))
            .map(|(page_no, page_id)| (*page_no, *page_id))
            .collect()
    }

    pub(crate) fn page_text(
        &self,
        page_no: u32,
        page_id: ObjectId,
    ) -> Result<PageText, lopdf::Error> {
        let index = self.pages.range(..page_no).count();
        let layout = self
            .layout_pages
            .as_ref()
            .and_then(|split| split.get(index).cloned());
        let stream = page_stream_text(&self.document, page_id);
        let extracted = self.document.extract_text(&[page_no]).ok();

        let candidates = gather_candidates(layout, stream, extracted)?;
        Ok(PageText {
            page_number: page_no,
            text: best_candidate(&candidates),
        })
    }
}
