//! Reconstructed chat record.
//!
//! This module provides [`Record`], one logical message recovered from a chat
//! transcript. A record has three text fields:
//! - `date`: year, month and day captures joined with `-` (missing parts are empty)
//! - `author`: the participant name as written in the export
//! - `message`: the message text, continuation lines joined by a single space
//!
//! A line that cannot be split into fields produces the sentinel
//! [`Record::empty`]. Sentinels are dropped before anything is shown to a
//! participant.
//!
//! # Examples
//!
//! ```
//! use chatdonate::Record;
//!
//! let record = Record::new("21-1-15", "Alice", "Hello!");
//! assert_eq!(record.iso_date().as_deref(), Some("2021-01-15"));
//! assert!(!record.is_empty());
//!
//! assert!(Record::empty().is_empty());
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One logical chat message recovered from a transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Date parts joined as `year-month-day`.
    pub date: String,

    /// Display name of the message author.
    pub author: String,

    /// Message text.
    pub message: String,
}

impl Record {
    /// Creates a record from its three fields.
    pub fn new(
        date: impl Into<String>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            author: author.into(),
            message: message.into(),
        }
    }

    /// Creates the sentinel record for a line that yielded no fields.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the `date` field from optional year, month and day captures.
    ///
    /// ```
    /// use chatdonate::Record;
    ///
    /// assert_eq!(Record::join_date(Some("24"), Some("1"), Some("15")), "24-1-15");
    /// assert_eq!(Record::join_date(Some("[x"), None, None), "[x--");
    /// ```
    pub fn join_date(year: Option<&str>, month: Option<&str>, day: Option<&str>) -> String {
        [year, month, day]
            .iter()
            .map(|part| part.unwrap_or_default())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Returns `true` if no message text was recovered.
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }

    /// Returns the number of whitespace-delimited words in the message.
    pub fn word_count(&self) -> usize {
        self.message.split_whitespace().count()
    }

    /// Returns the year, month and day fields as numbers.
    ///
    /// Two-digit years are read as 20yy.
    fn date_fields(&self) -> Option<(i32, u32, u32)> {
        let mut parts = self.date.split('-');
        let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let mut year: i32 = year.parse().ok()?;
        if year < 100 {
            year += 2000;
        }
        Some((year, month.parse().ok()?, day.parse().ok()?))
    }

    /// Returns the date as `YYYY-MM-DD`, if it is a valid calendar date.
    ///
    /// Two-digit years are read as 20yy.
    pub fn iso_date(&self) -> Option<String> {
        self.iso_date_in(DateOrder::MonthDay)
    }

    /// Returns the date as `YYYY-MM-DD`, reading the fields in `order`.
    pub fn iso_date_in(&self, order: DateOrder) -> Option<String> {
        let (year, first, second) = self.date_fields()?;
        let (month, day) = match order {
            DateOrder::MonthDay => (first, second),
            DateOrder::DayMonth => (second, first),
            DateOrder::Raw => return None,
        };
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Some(date.format("%Y-%m-%d").to_string())
    }
}

/// How the month and day fields of a transcript's dates are to be read.
///
/// The grammar that matched a transcript names its captures, but exports
/// of several locales share one line shape: `05/01/24` is the 1st of May
/// under a US grammar and the 5th of January in a European export. The
/// order is therefore decided once per transcript from the dates
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateOrder {
    /// Fields are read as captured.
    MonthDay,
    /// Month and day captures are swapped.
    DayMonth,
    /// Dates are compared as the raw `date` strings.
    Raw,
}

impl DateOrder {
    /// Decides the order for a whole record sequence.
    ///
    /// A month field above 12 means the fields are swapped. Every record
    /// must normalize under the chosen order, otherwise all of them fall
    /// back to [`DateOrder::Raw`] so keys stay comparable.
    ///
    /// ```
    /// use chatdonate::record::{DateOrder, Record};
    ///
    /// let us = [Record::new("24-1-5", "A", "x"), Record::new("24-1-21", "A", "y")];
    /// assert_eq!(DateOrder::detect(&us), DateOrder::MonthDay);
    ///
    /// let eu = [Record::new("24-5-1", "A", "x"), Record::new("24-21-1", "A", "y")];
    /// assert_eq!(DateOrder::detect(&eu), DateOrder::DayMonth);
    /// ```
    pub fn detect(records: &[Record]) -> Self {
        let mut month_first = false;
        let mut day_first = false;
        for record in records {
            let Some((_, first, second)) = record.date_fields() else {
                return DateOrder::Raw;
            };
            day_first |= first > 12;
            month_first |= second > 12;
        }

        let order = match (month_first, day_first) {
            (_, false) => DateOrder::MonthDay,
            (false, true) => DateOrder::DayMonth,
            (true, true) => return DateOrder::Raw,
        };
        if records.iter().all(|r| r.iso_date_in(order).is_some()) {
            order
        } else {
            DateOrder::Raw
        }
    }

    /// Returns the key used to order `record` by date.
    pub fn key(self, record: &Record) -> String {
        record
            .iso_date_in(self)
            .unwrap_or_else(|| record.date.clone())
    }
}

/// Drops sentinel records, keeping transcript order.
pub fn remove_empty(records: Vec<Record>) -> Vec<Record> {
    records.into_iter().filter(|r| !r.is_empty()).collect()
}
