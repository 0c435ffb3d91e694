use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;

use crate::error::ExtractError;
use crate::model::{Extraction, TabularData};

/// Writes the extraction to `path`, replacing whatever was there.
pub fn write_extraction(
    path: &Path,
    extraction: &Extraction,
    delimiter: u8,
) -> Result<(), ExtractError> {
    match extraction {
        Extraction::Table(table) => write_table(path, table, delimiter),
        Extraction::Text(lines) => write_lines(path, lines),
    }
}

fn write_table(path: &Path, table: &TabularData, delimiter: u8) -> Result<(), ExtractError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_lines(path: &Path, lines: &[String]) -> Result<(), ExtractError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_extraction;
    use crate::model::{Extraction, TabularData};

    #[test]
    fn table_output_quotes_cells_with_delimiters() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("converted.csv");
        let extraction = Extraction::Table(TabularData {
            headers: vec!["Date".to_string(), "Description".to_string()],
            rows: vec![vec!["03/01".to_string(), "Fee, monthly".to_string()]],
        });

        write_extraction(&path, &extraction, b',').expect("write");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "Date,Description\n03/01,\"Fee, monthly\"\n");
    }

    #[test]
    fn text_output_is_written_verbatim_and_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("converted.csv");
        std::fs::write(&path, "stale content from an earlier run\n").expect("seed");

        let extraction = Extraction::Text(vec!["a,b".to_string(), "\"odd\" line".to_string()]);
        write_extraction(&path, &extraction, b',').expect("write");

        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "a,b\n\"odd\" line\n");
    }
}
