//! Output writers for reviewed tables.
//!
//! - [`write_csv`] / [`to_csv`] - CSV with semicolon delimiter, one block per table - requires `csv-output` feature
//! - [`write_json`] / [`to_json`] - JSON array of tables
//! - [`write_jsonl`] / [`to_jsonl`] - JSON Lines, one object per table row
//!
//! # Example
//!
//! ```rust
//! use chatdonate::output::to_json;
//! use chatdonate::table::{Table, Translatable};
//!
//! let mut table = Table::new("t", Translatable::same("Title"), ["Description", "Value"]);
//! table.push_row(["Number of messages", "3"]);
//!
//! let json = to_json(&[table])?;
//! assert!(json.contains("Number of messages"));
//! # Ok::<(), chatdonate::DonationError>(())
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
mod json_writer;
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
pub use json_writer::{to_json, write_json};
pub use jsonl_writer::{to_jsonl, write_jsonl};
