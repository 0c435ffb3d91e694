//! Bank statement PDF to CSV conversion.
//!
//! Each page is searched for a column-aligned table in its text layer. Pages
//! without a table are rendered and run through OCR instead. Table rows from
//! all pages are flattened into one header + data table; when no page had a
//! table, the OCR text is written out line by line.

mod csv_out;
mod error;
mod event;
mod model;
mod ocr;
mod options;
mod pdf_reader;
mod table_detect;
mod table_parse;
mod tabulate;

use std::path::Path;

use crate::event::Diagnostics;
use crate::pdf_reader::PdfSource;
use crate::table_detect::{LOW_CONFIDENCE_THRESHOLD, detect_page_table};
use crate::tabulate::{build_table, ocr_lines};

pub use csv_out::write_extraction;
pub use error::{ExtractError, OcrError};
pub use event::{EventCode, EventSink, ExtractEvent, Severity, TracingSink};
pub use model::{
    CollectedContent, ConversionReport, Extraction, OcrFragment, OutputMode, TabularData,
};
pub use ocr::{PageOcr, TesseractOcr};
pub use options::{
    DEFAULT_OCR_LANGUAGE, DEFAULT_OUTPUT_NAME, DEFAULT_RENDER_DPI, ExtractOptions, HeaderPolicy,
    PageSelection, RENDER_DPI_RANGE,
};

struct PageWalk {
    collected: CollectedContent,
    table_pages: Vec<u32>,
    ocr_pages: Vec<u32>,
}

fn walk_pages(
    source: &PdfSource,
    input_pdf: &Path,
    options: &ExtractOptions,
    ocr: &dyn PageOcr,
    diagnostics: &mut Diagnostics<'_>,
) -> Result<PageWalk, ExtractError> {
    let selected = source.selected_pages(options.pages.as_ref());
    if selected.is_empty() && options.pages.is_some() {
        return Err(ExtractError::NoPagesSelected);
    }

    let mut walk = PageWalk {
        collected: CollectedContent::default(),
        table_pages: Vec::new(),
        ocr_pages: Vec::new(),
    };

    for (page_no, page_id) in selected {
        let page = match source.page_text(page_no, page_id) {
            Ok(page) => page,
            Err(error) => {
                diagnostics.emit(
                    ExtractEvent::new(
                        Severity::Error,
                        EventCode::PageReadFailed,
                        format!("failed to process page: {error}"),
                    )
                    .with_page(page_no),
                );
                continue;
            }
        };

        if let Some(table) = detect_page_table(&page, options.min_cols) {
            if table.confidence < LOW_CONFIDENCE_THRESHOLD {
                diagnostics.emit(
                    ExtractEvent::new(
                        Severity::Warning,
                        EventCode::LowConfidenceTable,
                        "table columns are irregular; rows kept as detected",
                    )
                    .with_page(table.page)
                    .with_confidence(table.confidence),
                );
            }
            walk.table_pages.push(page_no);
            walk.collected.table_rows.extend(table.rows);
            continue;
        }

        if !options.ocr_fallback {
            diagnostics.emit(
                ExtractEvent::new(
                    Severity::Info,
                    EventCode::OcrDisabled,
                    "no table found and OCR fallback is disabled",
                )
                .with_page(page_no),
            );
            continue;
        }

        diagnostics.emit(
            ExtractEvent::new(
                Severity::Debug,
                EventCode::NoTableOnPage,
                "no table found, trying OCR",
            )
            .with_page(page_no),
        );

        match ocr.recognize_page(input_pdf, page_no, options.render_dpi) {
            Ok(text) if !text.trim().is_empty() => {
                walk.ocr_pages.push(page_no);
                walk.collected.fragments.push(OcrFragment {
                    page: page_no,
                    text,
                });
            }
            Ok(_) => diagnostics.emit(
                ExtractEvent::new(
                    Severity::Info,
                    EventCode::OcrTextEmpty,
                    "OCR recovered no text",
                )
                .with_page(page_no),
            ),
            Err(error) => diagnostics.emit(
                ExtractEvent::new(
                    Severity::Error,
                    EventCode::OcrFailed,
                    format!("failed to process page: {error}"),
                )
                .with_page(page_no),
            ),
        }
    }

    Ok(walk)
}

fn shape_output(
    collected: CollectedContent,
    options: &ExtractOptions,
    diagnostics: &mut Diagnostics<'_>,
) -> Result<Extraction, ExtractError> {
    if !collected.table_rows.is_empty() {
        let (table, dropped) = build_table(collected.table_rows, options.header_policy)?;
        if dropped > 0 {
            diagnostics.emit(ExtractEvent::new(
                Severity::Info,
                EventCode::RepeatedHeaderDropped,
                format!("dropped {dropped} repeated header row(s)"),
            ));
        }
        return Ok(Extraction::Table(table));
    }

    if !collected.fragments.is_empty() {
        return Ok(Extraction::Text(ocr_lines(
            &collected.fragments,
            options.delimiter,
        )));
    }

    Err(ExtractError::NoDataExtracted)
}

/// Runs table detection with OCR fallback over the document without writing
/// anything.
///
/// Opening the document is the only step that can fail before pages are
/// visited. Page-level failures are reported to `sink` and skip the page.
pub fn extract_pdf(
    input_pdf: &Path,
    options: &ExtractOptions,
    ocr: &dyn PageOcr,
    sink: &mut dyn EventSink,
) -> Result<(Extraction, ConversionReport), ExtractError> {
    options.validate()?;

    let source = PdfSource::open(input_pdf)?;
    let mut diagnostics = Diagnostics::new(sink);
    let walk = walk_pages(&source, input_pdf, options, ocr, &mut diagnostics)?;
    let extraction = shape_output(walk.collected, options, &mut diagnostics)?;

    let report = ConversionReport {
        mode: extraction.mode(),
        row_count: extraction.row_count(),
        page_count: source.page_count(),
        table_pages: walk.table_pages,
        ocr_pages: walk.ocr_pages,
        warnings: diagnostics.into_events(),
    };
    Ok((extraction, report))
}

/// Converts `input_pdf` and writes the result to `output_csv`.
pub fn convert_pdf_to_csv(
    input_pdf: &Path,
    output_csv: &Path,
    options: &ExtractOptions,
    ocr: &dyn PageOcr,
    sink: &mut dyn EventSink,
) -> Result<ConversionReport, ExtractError> {
    let (extraction, report) = extract_pdf(input_pdf, options, ocr, sink)?;
    write_extraction(output_csv, &extraction, options.delimiter)?;

    tracing::info!(
        mode = report.mode.as_str(),
        rows = report.row_count,
        pages = report.page_count,
        output = %output_csv.display(),
        "statement conversion completed"
    );
    Ok(report)
}
