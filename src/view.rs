use std::fmt::Write as _;

use axum::Json;
use axum::http::{HeaderValue, header};
use axum::response::{Html, IntoResponse, Response};
use chrono::{SecondsFormat, Utc};

use crate::error::ApiError;
use crate::models::{ConversionSummary, ConvertResponse, PAGE_TITLE, TablePreview, UploadOutcome};

/// The three things the upload flow ever shows.
pub trait ResultView {
    fn table(&self, outcome: &UploadOutcome, preview: &TablePreview) -> Response;
    fn raw_text(&self, outcome: &UploadOutcome, text: &str) -> Response;
    fn error(&self, error: &ApiError) -> Response;
}

pub fn render<V>(view: &V, result: &Result<UploadOutcome, ApiError>) -> Response
where
    V: ResultView,
{
    let mut response = match result {
        Ok(outcome @ UploadOutcome::Table { preview, .. }) => view.table(outcome, preview),
        Ok(outcome @ UploadOutcome::Text { text, .. }) => view.raw_text(outcome, text),
        Err(error) => view.error(error),
    };
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonView;

impl JsonView {
    fn outcome(outcome: &UploadOutcome) -> Response {
        Json(ConvertResponse {
            outcome,
            processed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })
        .into_response()
    }
}

impl ResultView for JsonView {
    fn table(&self, outcome: &UploadOutcome, _preview: &TablePreview) -> Response {
        Self::outcome(outcome)
    }

    fn raw_text(&self, outcome: &UploadOutcome, _text: &str) -> Response {
        Self::outcome(outcome)
    }

    fn error(&self, error: &ApiError) -> Response {
        error.clone().into_response()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlView;

impl ResultView for HtmlView {
    fn table(&self, outcome: &UploadOutcome, preview: &TablePreview) -> Response {
        let mut body = banner("success", outcome_message(outcome));
        body.push_str("<table>\n<thead><tr>");
        for header in &preview.headers {
            let _ = write!(body, "<th>{}</th>", escape_html(header));
        }
        body.push_str("</tr></thead>\n<tbody>\n");
        for row in &preview.rows {
            body.push_str("<tr>");
            for cell in row {
                let _ = write!(body, "<td>{}</td>", escape_html(cell));
            }
            body.push_str("</tr>\n");
        }
        body.push_str("</tbody>\n</table>\n");
        let _ = writeln!(
            body,
            "<p class=\"meta\">Showing {} of {} row(s).</p>",
            preview.rows.len(),
            preview.total_rows
        );
        push_conversion(&mut body, outcome_conversion(outcome));
        Html(page(&body)).into_response()
    }

    fn raw_text(&self, outcome: &UploadOutcome, text: &str) -> Response {
        let mut body = banner("warning", outcome_message(outcome));
        let _ = writeln!(
            body,
            "<label for=\"ocr-text\">Extracted OCR Text:</label>\n\
             <textarea id=\"ocr-text\" rows=\"16\" readonly>{}</textarea>",
            escape_html(text)
        );
        push_conversion(&mut body, outcome_conversion(outcome));
        Html(page(&body)).into_response()
    }

    fn error(&self, error: &ApiError) -> Response {
        let body = banner("error", error.message());
        (error.status_code(), Html(page(&body))).into_response()
    }
}

fn outcome_message(outcome: &UploadOutcome) -> &str {
    match outcome {
        UploadOutcome::Table { message, .. } | UploadOutcome::Text { message, .. } => message,
    }
}

fn outcome_conversion(outcome: &UploadOutcome) -> Option<&ConversionSummary> {
    match outcome {
        UploadOutcome::Table { conversion, .. } | UploadOutcome::Text { conversion, .. } => {
            conversion.as_ref()
        }
    }
}

fn banner(kind: &str, message: &str) -> String {
    format!(
        "<p class=\"banner {kind}\">{}</p>\n",
        escape_html(message)
    )
}

fn push_conversion(body: &mut String, conversion: Option<&ConversionSummary>) {
    let Some(conversion) = conversion else {
        return;
    };

    let _ = writeln!(
        body,
        "<p class=\"meta\">{} page(s); tables on {:?}; OCR on {:?}.</p>",
        conversion.page_count, conversion.table_pages, conversion.ocr_pages
    );
    if !conversion.warnings.is_empty() {
        body.push_str("<ul class=\"warnings\">\n");
        for warning in &conversion.warnings {
            let _ = writeln!(body, "<li>{}</li>", escape_html(warning));
        }
        body.push_str("</ul>\n");
    }
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn page(body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{PAGE_TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <main>\n<h1>{PAGE_TITLE}</h1>\n{body}<p><a href=\"/\">Upload another file</a></p>\n\
         </main>\n</body>\n</html>\n"
    )
}

pub fn upload_form() -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{PAGE_TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main>\n\
         <h1>{PAGE_TITLE}</h1>\n\
         <form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <fieldset>\n<legend>Select the type of file you want to upload:</legend>\n\
         <label><input type=\"radio\" name=\"file_type\" value=\"csv\" checked> CSV</label>\n\
         <label><input type=\"radio\" name=\"file_type\" value=\"pdf\"> PDF</label>\n\
         </fieldset>\n\
         <label>Upload your file <input type=\"file\" name=\"file\" accept=\".csv,.pdf\" required></label>\n\
         <button type=\"submit\">Upload</button>\n</form>\n</main>\n</body>\n</html>\n"
    )
}

const STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:60rem}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.25rem .5rem}\
.banner{padding:.5rem}.success{background:#e6f4ea}.warning{background:#fef7e0}\
.error{background:#fce8e6}textarea{width:100%}.meta{color:#555}";

#[cfg(test)]
mod tests {
    use super::escape_html;

    #[test]
    fn escapes_markup_in_cells() {
        assert_eq!(
            escape_html("<b>Tom & \"Jerry\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
    }
}
