//! Output format selection for reviewed tables.
//!
//! # Example
//!
//! ```rust
//! use chatdonate::format::{OutputFormat, to_format_string};
//! use chatdonate::table::{Table, Translatable};
//!
//! let table = Table::new("t", Translatable::same("Title"), ["Description", "Value"]);
//! let json = to_format_string(&[table], OutputFormat::Json)?;
//! assert!(json.starts_with('['));
//!
//! let format = OutputFormat::from_path("summary.jsonl")?;
//! assert_eq!(format, OutputFormat::Jsonl);
//! # Ok::<(), chatdonate::DonationError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::DonationError;
use crate::table::Table;

/// Output format for reviewed tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// CSV with semicolon delimiter, one block per table
    Csv,

    /// JSON array of tables, the same shape that is donated
    #[default]
    Json,

    /// JSON Lines - one JSON object per table row
    Jsonl,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["csv", "json", "jsonl", "ndjson"]
    }

    /// Detects format from a file path based on extension.
    pub fn from_path(path: &str) -> Result<Self, DonationError> {
        let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();

        match ext.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(DonationError::invalid_format(
                "output",
                format!("Unknown file extension: '.{ext}'. Expected one of: csv, json, jsonl"),
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "CSV"),
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

#[cfg(not(feature = "csv-output"))]
fn csv_disabled() -> DonationError {
    DonationError::invalid_format(
        "output",
        "Output format CSV requires the 'csv-output' feature to be enabled",
    )
}

/// Writes tables to a file in the specified format.
pub fn write_to_format(
    tables: &[Table],
    path: &str,
    format: OutputFormat,
) -> Result<(), DonationError> {
    match format {
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::output::write_csv(tables, path),
        #[cfg(not(feature = "csv-output"))]
        OutputFormat::Csv => Err(csv_disabled()),
        OutputFormat::Json => crate::output::write_json(tables, path),
        OutputFormat::Jsonl => crate::output::write_jsonl(tables, path),
    }
}

/// Converts tables to a string in the specified format.
pub fn to_format_string(tables: &[Table], format: OutputFormat) -> Result<String, DonationError> {
    match format {
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::output::to_csv(tables),
        #[cfg(not(feature = "csv-output"))]
        OutputFormat::Csv => Err(csv_disabled()),
        OutputFormat::Json => crate::output::to_json(tables),
        OutputFormat::Jsonl => crate::output::to_jsonl(tables),
    }
}
