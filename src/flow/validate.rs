//! Recognition of data packages.
//!
//! A platform describes the packages it understands as a list of
//! [`DdpCategory`]s. Validation checks which category an archive looks like
//! by counting how many of the category's known files it contains.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::archive::{Archive, basename, glob_match};

/// File type of the data inside a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DdpFiletype {
    Json,
    Csv,
    Html,
    Txt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Nl,
}

/// One known shape of a platform's data package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdpCategory {
    pub id: String,
    pub ddp_filetype: DdpFiletype,
    pub language: Language,
    /// File names or `*`/`?` patterns expected in the package.
    pub known_files: Vec<String>,
}

impl DdpCategory {
    pub fn new<I, S>(id: impl Into<String>, ddp_filetype: DdpFiletype, known_files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            ddp_filetype,
            language: Language::En,
            known_files: known_files.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Counts the known files present among `entries`.
    pub fn hits<S: AsRef<str>>(&self, entries: &[S]) -> usize {
        self.known_files
            .iter()
            .filter(|known| entries.iter().any(|e| glob_match(known, basename(e.as_ref()))))
            .count()
    }
}

/// Outcome of validating a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    /// Recognized and acceptable.
    Valid,
    /// Readable, but none of the known files are present.
    NotRecognized,
    /// The package could not be listed.
    Unreadable,
}

impl ValidationStatus {
    /// Numeric status code; `0` means valid.
    pub fn code(&self) -> u8 {
        match self {
            ValidationStatus::Valid => 0,
            ValidationStatus::NotRecognized => 1,
            ValidationStatus::Unreadable => 2,
        }
    }

    pub fn is_valid(&self) -> bool {
        *self == ValidationStatus::Valid
    }
}

/// Decides whether an archive is a package of one of the given categories.
pub trait Validator {
    fn validate(&self, categories: &[DdpCategory], archive: &dyn Archive) -> ValidationStatus;
}

/// Accepts an archive if it contains at least one known file of some category.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownFilesValidator;

impl Validator for KnownFilesValidator {
    fn validate(&self, categories: &[DdpCategory], archive: &dyn Archive) -> ValidationStatus {
        let entries = match archive.entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = e.kind(), "could not list package");
                return ValidationStatus::Unreadable;
            }
        };

        let best = categories
            .iter()
            .map(|c| (c, c.hits(&entries)))
            .filter(|(_, hits)| *hits > 0)
            .fold(None, |best: Option<(&DdpCategory, usize)>, (c, hits)| match best {
                Some((_, top)) if top >= hits => best,
                _ => Some((c, hits)),
            });

        match best {
            Some((category, hits)) => {
                info!(category = category.id.as_str(), hits, "package recognized");
                ValidationStatus::Valid
            }
            None => {
                info!(entries = entries.len(), "package not recognized");
                ValidationStatus::NotRecognized
            }
        }
    }
}
