//! Unified error types for chatdonate.
//!
//! This module provides a single [`DonationError`] enum that covers every
//! error the library can surface. Most of them never reach a participant:
//! the flow degrades per-line, per-entry and per-table failures to "no data"
//! and only archive-level failures route into the retry prompt.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Participants** never see a raw error, only the retry prompt
//! - **Developers** get source error chains for debugging

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatdonate operations.
///
/// # Example
///
/// ```rust
/// use chatdonate::error::Result;
/// use chatdonate::Record;
///
/// fn my_function() -> Result<Vec<Record>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, DonationError>;

/// The error type for all chatdonate operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DonationError {
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// None of the expected filenames are present in the archive.
    #[error("No file found matching any of: {}", patterns.join(", "))]
    NoFileFound {
        /// The filename patterns that were looked up
        patterns: Vec<String>,
    },

    /// The transcript format is not recognized by any grammar in the catalog.
    #[error("No line grammar matched the transcript ({scanned} lines scanned)")]
    NoGrammarMatched {
        /// Number of lines that were scanned before giving up
        scanned: usize,
    },

    /// Bytes could not be decoded as UTF-8.
    #[error("UTF-8 decoding error in {context}: {source}")]
    Decode {
        /// Description of what was being decoded
        context: String,
        /// The underlying UTF-8 error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// A named archive entry does not exist.
    #[error("Archive entry not found: {name}")]
    EntryNotFound {
        /// The entry name that was requested
        name: String,
    },

    /// The archive itself could not be opened or listed.
    #[error("Unreadable archive {}: {message}", path.display())]
    UnreadableArchive {
        /// Path of the archive
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// JSON parsing/serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A participant name that is not part of the chat was selected.
    #[error("Unknown participant '{name}'")]
    UnknownParticipant {
        /// The selected name
        name: String,
    },

    /// The content does not have the expected structure.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },
}

impl From<std::string::FromUtf8Error> for DonationError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DonationError::Decode {
            context: "output conversion".to_string(),
            source: err,
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl DonationError {
    /// Creates a "no file found" error for the given lookup patterns.
    pub fn no_file_found<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DonationError::NoFileFound {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a "no grammar matched" error.
    pub fn no_grammar_matched(scanned: usize) -> Self {
        DonationError::NoGrammarMatched { scanned }
    }

    /// Creates a decode error with context.
    pub fn decode(context: impl Into<String>, source: std::string::FromUtf8Error) -> Self {
        DonationError::Decode {
            context: context.into(),
            source,
        }
    }

    /// Creates an "entry not found" error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        DonationError::EntryNotFound { name: name.into() }
    }

    /// Creates an "unreadable archive" error.
    pub fn unreadable_archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DonationError::UnreadableArchive {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an "unknown participant" error.
    pub fn unknown_participant(name: impl Into<String>) -> Self {
        DonationError::UnknownParticipant { name: name.into() }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        DonationError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Returns a short category name for this error.
    ///
    /// Unlike the `Display` output it never contains file names, paths or
    /// participant names, so it is what flow logs record.
    pub fn kind(&self) -> &'static str {
        match self {
            DonationError::Io(_) => "io",
            DonationError::NoFileFound { .. } => "no_file_found",
            DonationError::NoGrammarMatched { .. } => "no_grammar_matched",
            DonationError::Decode { .. } => "decode",
            DonationError::EntryNotFound { .. } => "entry_not_found",
            DonationError::UnreadableArchive { .. } => "unreadable_archive",
            DonationError::Json(_) => "json",
            #[cfg(feature = "csv-output")]
            DonationError::Csv(_) => "csv",
            DonationError::UnknownParticipant { .. } => "unknown_participant",
            DonationError::InvalidFormat { .. } => "invalid_format",
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, DonationError::Io(_))
    }

    /// Returns `true` if no expected file was found.
    pub fn is_no_file_found(&self) -> bool {
        matches!(self, DonationError::NoFileFound { .. })
    }

    /// Returns `true` if the transcript format was not recognized.
    pub fn is_no_grammar_matched(&self) -> bool {
        matches!(self, DonationError::NoGrammarMatched { .. })
    }

    /// Returns `true` if this is a decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, DonationError::Decode { .. })
    }

    /// Returns `true` if this error concerns the archive as a whole or one of its entries.
    pub fn is_archive(&self) -> bool {
        matches!(
            self,
            DonationError::EntryNotFound { .. } | DonationError::UnreadableArchive { .. }
        )
    }
}
