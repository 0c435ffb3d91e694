#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use statement_to_csv::{OcrError, PageOcr};

/// Builds a PDF with one page per entry. An empty entry becomes a page with no
/// text layer at all, standing in for a scanned page.
pub fn create_statement_pdf(
    path: &Path,
    pages: &[Vec<&str>],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        if !lines.is_empty() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
            operations.push(Operation::new("TL", vec![14.into()]));
            operations.push(Operation::new("Td", vec![40.into(), 790.into()]));
            for (index, line) in lines.iter().enumerate() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                if index + 1 < lines.len() {
                    operations.push(Operation::new("T*", vec![]));
                }
            }
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path)?;
    Ok(())
}

/// Scripted OCR: returns canned text per page and records every call.
#[derive(Default)]
pub struct ScriptedOcr {
    pages: BTreeMap<u32, Result<String, String>>,
    calls: RefCell<Vec<(u32, u32)>>,
}

impl ScriptedOcr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, page: u32, text: &str) -> Self {
        self.pages.insert(page, Ok(text.to_string()));
        self
    }

    pub fn with_failure(mut self, page: u32, stderr: &str) -> Self {
        self.pages.insert(page, Err(stderr.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<(u32, u32)> {
        self.calls.borrow().clone()
    }
}

impl PageOcr for ScriptedOcr {
    fn recognize_page(&self, _pdf: &Path, page: u32, dpi: u32) -> Result<String, OcrError> {
        self.calls.borrow_mut().push((page, dpi));
        match self.pages.get(&page) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(stderr)) => Err(OcrError::ToolFailed {
                tool: "tesseract",
                code: 1,
                stderr: stderr.clone(),
            }),
            None => Ok(String::new()),
        }
    }
}
