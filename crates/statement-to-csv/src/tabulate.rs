use crate::error::ExtractError;
use crate::model::{OcrFragment, TabularData};
use crate::options::HeaderPolicy;
use crate::table_parse::normalize_rows;

/// Splits the flat row collection into header and data.
///
/// Returns the table and how many repeated header rows were dropped.
pub(crate) fn build_table(
    mut rows: Vec<Vec<String>>,
    policy: HeaderPolicy,
) -> Result<(TabularData, usize), ExtractError> {
    if rows.is_empty() {
        return Err(ExtractError::NoDataExtracted);
    }

    let headers = rows.remove(0);
    let before = rows.len();
    if policy == HeaderPolicy::DropRepeated {
        rows.retain(|row| *row != headers);
    }
    let dropped = before - rows.len();

    if let Some(data_columns) = rows.iter().map(Vec::len).max() {
        if data_columns != headers.len() {
            return Err(ExtractError::ColumnMismatch {
                header_columns: headers.len(),
                data_columns,
            });
        }
    }

    let rows = normalize_rows(&rows, headers.len());
    Ok((TabularData { headers, rows }, dropped))
}

/// Every character that ends a line, including the vertical-tab, form-feed
/// and separator controls tesseract can leave behind. A `\r\n` pair yields an
/// empty piece, which the blank-line filter drops.
fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}'..='\u{1E}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Flattens OCR fragments into output lines: blank lines are skipped and tabs
/// become the field delimiter. Lines are otherwise kept verbatim.
pub(crate) fn ocr_lines(fragments: &[OcrFragment], delimiter: u8) -> Vec<String> {
    let separator = char::from(delimiter).to_string();
    fragments
        .iter()
        .flat_map(|fragment| fragment.text.split(is_line_break))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.replace('\t', &separator))
        .collect()
}
