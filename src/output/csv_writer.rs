//! CSV output writer.

use std::fs::File;
use std::io::Write;

use crate::error::Result;
use crate::table::Table;

/// Writes tables to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Every table starts with a header row: `Table`, then its columns
/// - Every data row starts with the table id
/// - Tables with different column counts follow each other in one file
pub fn write_csv(tables: &[Table], output_path: &str) -> Result<()> {
    let file = File::create(output_path)?;
    write_to(tables, file)
}

/// Converts tables to a CSV string.
pub fn to_csv(tables: &[Table]) -> Result<String> {
    let mut buffer = Vec::new();
    write_to(tables, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_to<W: Write>(tables: &[Table], sink: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_writer(sink);

    for table in tables {
        writer.write_record(std::iter::once("Table").chain(table.columns.iter().map(String::as_str)))?;
        for row in &table.rows {
            writer.write_record(std::iter::once(table.id.as_str()).chain(row.iter().map(String::as_str)))?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Translatable;
    use tempfile::NamedTempFile;

    fn sample() -> Table {
        let mut table = Table::new("table_id_Member_1", Translatable::same("You"), ["Description", "Value"]);
        table.push_row(["Number of words", "12"]);
        table.push_row(["Who responds to you the most?", "Member 2"]);
        table
    }

    #[test]
    fn test_to_csv_basic() {
        let csv = to_csv(&[sample()]).unwrap();
        assert!(csv.contains("Table;Description;Value"));
        assert!(csv.contains("table_id_Member_1;Number of words;12"));
    }

    #[test]
    fn test_write_csv_mixed_shapes() {
        let mut wide = Table::new("wide", Translatable::same("W"), ["a", "b", "c"]);
        wide.push_row(["1", "2", "3"]);

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        write_csv(&[sample(), wide], path).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Table;a;b;c"));
        assert!(content.contains("wide;1;2;3"));
    }

    #[test]
    fn test_csv_quotes_delimiters() {
        let mut table = Table::new("t", Translatable::same("T"), ["Value"]);
        table.push_row(["a;b"]);
        let csv = to_csv(&[table]).unwrap();
        assert!(csv.contains("t;\"a;b\""));
    }
}
