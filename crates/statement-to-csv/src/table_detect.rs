use crate::model::{DetectedTable, PageText};
use crate::table_parse::{
    modal_width, normalize_rows, soft_split_line_into_cells, split_line_into_cells,
};

pub(crate) const LOW_CONFIDENCE_THRESHOLD: f32 = 0.60;

fn table_confidence(rows: &[Vec<String>]) -> f32 {
    if rows.len() < 2 {
        return 0.0;
    }

    let modal = modal_width(rows);
    if modal == 0 {
        return 0.0;
    }

    let consistent =
        rows.iter().filter(|row| row.len() == modal).count() as f32 / rows.len() as f32;
    let max_width = rows.iter().map(Vec::len).max().unwrap_or(modal);
    let min_width = rows.iter().map(Vec::len).min().unwrap_or(modal);
    let uniformity = if max_width == 0 {
        0.0
    } else {
        1.0 - ((max_width - min_width) as f32 / max_width as f32)
    };

    (consistent * 0.75 + uniformity * 0.25).clamp(0.0, 1.0)
}

/// A single-spaced line may continue a run when it carries a figure and
/// splits into exactly as many words as the run's first row has cells.
fn continuation_cells(line: &str, width: usize) -> Option<Vec<String>> {
    let cells = soft_split_line_into_cells(line);
    let has_digit = line.chars().any(|ch| ch.is_ascii_digit());
    (has_digit && cells.len() == width).then_some(cells)
}

fn close_run(page: u32, run: &mut Vec<Vec<String>>, tables: &mut Vec<DetectedTable>) {
    let rows = std::mem::take(run);
    if rows.len() >= 2 {
        tables.push(DetectedTable {
            page,
            confidence: table_confidence(&rows),
            rows,
        });
    }
}

/// Every run of two or more consecutive table lines on the page. A run only
/// starts on a column-aligned line (cells separated by tabs or wide gaps).
pub(crate) fn detect_tables_in_page(page: &PageText, min_cols: usize) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    let mut run: Vec<Vec<String>> = Vec::new();

    for line in page.text.lines() {
        let aligned = split_line_into_cells(line);
        if aligned.len() >= min_cols {
            run.push(aligned);
            continue;
        }

        let continued = run
            .first()
            .map(Vec::len)
            .and_then(|width| continuation_cells(line, width));
        match continued {
            Some(cells) => run.push(cells),
            None => close_run(page.page_number, &mut run, &mut tables),
        }
    }

    close_run(page.page_number, &mut run, &mut tables);
    tables
}

/// The page's largest table (first one wins a tie), padded to a rectangle.
pub(crate) fn detect_page_table(page: &PageText, min_cols: usize) -> Option<DetectedTable> {
    let mut best: Option<DetectedTable> = None;
    for table in detect_tables_in_page(page, min_cols.max(2)) {
        if best
            .as_ref()
            .is_none_or(|current| table.rows.len() > current.rows.len())
        {
            best = Some(table);
        }
    }

    best.map(|mut table| {
        let width = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        table.rows = normalize_rows(&table.rows, width);
        table
    })
}
