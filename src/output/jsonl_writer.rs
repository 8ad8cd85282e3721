//! JSON Lines (JSONL) output writer.
//!
//! Every table row becomes one object keyed by column name, plus a `table`
//! field with the table id.

use std::fs::File;
use std::io::{BufWriter, Write};

use serde_json::{Map, Value};

use crate::error::Result;
use crate::table::Table;

/// Writes table rows to JSONL format.
///
/// ```jsonl
/// {"table":"table_id_Member_1","Description":"Number of words","Value":"12"}
/// ```
pub fn write_jsonl(tables: &[Table], output_path: &str) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(to_jsonl(tables)?.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Converts table rows to a JSONL string (one trailing newline per row).
pub fn to_jsonl(tables: &[Table]) -> Result<String> {
    let mut out = String::new();
    for table in tables {
        for row in &table.rows {
            let mut object = Map::new();
            object.insert("table".to_string(), Value::String(table.id.clone()));
            for (column, cell) in table.columns.iter().zip(row) {
                object.insert(column.clone(), Value::String(cell.clone()));
            }
            out.push_str(&serde_json::to_string(&object)?);
            out.push('\n');
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Translatable;

    #[test]
    fn test_to_jsonl_one_line_per_row() {
        let mut table = Table::new("t", Translatable::same("T"), ["Description", "Value"]);
        table.push_row(["Number of words", "12"]);
        table.push_row(["Number of messages", "3"]);

        let jsonl = to_jsonl(&[table]).unwrap();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["table"], "t");
        assert_eq!(first["Value"], "12");
    }
}
