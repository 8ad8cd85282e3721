//! Tabular artifacts shown to participants for review.
//!
//! A [`Table`] is the unit of review and consent: it has a stable id, a
//! translated title, an optional translated description, and string cells.
//! Tables serialize to JSON for donation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Text in several languages, keyed by language code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translatable(BTreeMap<String, String>);

impl Translatable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a text with identical English and Dutch translations.
    pub fn same(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new().with("en", text.clone()).with("nl", text)
    }

    /// Creates a text from an English and a Dutch translation.
    pub fn en_nl(en: impl Into<String>, nl: impl Into<String>) -> Self {
        Self::new().with("en", en).with("nl", nl)
    }

    /// Adds or replaces one translation.
    #[must_use]
    pub fn with(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(lang.into(), text.into());
        self
    }

    /// Returns the text for `lang`, falling back to English.
    pub fn text(&self, lang: &str) -> Option<&str> {
        self.0
            .get(lang)
            .or_else(|| self.0.get("en"))
            .map(String::as_str)
    }
}

/// One reviewable table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Stable identifier, unique within a review page.
    pub id: String,
    pub title: Translatable,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub description: Option<Translatable>,
    /// Column headers.
    pub columns: Vec<String>,
    /// Rows of cells, each as long as `columns`.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    pub fn new<I, S>(id: impl Into<String>, title: Translatable, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            title,
            description: None,
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: Translatable) -> Self {
        self.description = Some(description);
        self
    }

    /// Appends a row; missing cells are filled with empty strings and extra
    /// cells are dropped.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .take(self.columns.len())
            .map(Into::into)
            .collect();
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Returns the cell in `column` of `row`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
