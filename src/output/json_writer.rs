//! JSON output writer.

use std::fs::File;
use std::io::Write;

use crate::error::Result;
use crate::table::Table;

/// Writes tables to a JSON file as a pretty-printed array.
pub fn write_json(tables: &[Table], output_path: &str) -> Result<()> {
    let json = to_json(tables)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Converts tables to a pretty-printed JSON array.
pub fn to_json(tables: &[Table]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tables)?)
}
