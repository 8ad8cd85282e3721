//! Record reconstruction from transcript lines.
//!
//! Chat exports write one message per line, except that a message containing
//! newlines continues on the following physical lines without any prefix. The
//! reconstructor keeps an accumulated "current" line and looks one line ahead:
//! a line the grammar matches starts a new message, anything else is appended
//! to the current one.
//!
//! # Example
//!
//! ```rust
//! use chatdonate::chat::ChatParser;
//!
//! let lines = [
//!     "1/1/21, 10:00 - A: hello",
//!     "world",
//!     "1/1/21, 10:01 - B: hi",
//! ];
//! let records = ChatParser::new().parse_lines(&lines)?;
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].message, "hello world");
//! assert_eq!(records[1].author, "B");
//! # Ok::<(), chatdonate::DonationError>(())
//! ```

use tracing::{debug, error};

use super::grammar::{GrammarCatalog, LineGrammar};
use super::transcript::RawTranscript;
use crate::Record;
use crate::config::ChatConfig;
use crate::error::Result;

/// Rebuilds logical messages from lines using an already selected grammar.
///
/// The last accumulated line is always flushed, also when the transcript
/// ends in the middle of a multi-line message. Lines that do not split into
/// fields become [`Record::empty`].
pub fn reconstruct<S: AsRef<str>>(lines: &[S], grammar: &LineGrammar) -> Vec<Record> {
    let mut records = Vec::with_capacity(lines.len());
    let mut lines = lines.iter().map(AsRef::as_ref);

    let Some(first) = lines.next() else {
        return records;
    };
    let mut current = first.to_string();

    for next in lines {
        if grammar.is_match(next) {
            records.push(grammar.record(&current));
            current = next.to_string();
        } else {
            current.push(' ');
            current.push_str(&next.replace(['\r', '\n'], ""));
        }
    }
    records.push(grammar.record(&current));

    records
}

/// Parser for free-form chat transcripts.
///
/// # Example
///
/// ```rust
/// use chatdonate::chat::ChatParser;
/// use chatdonate::config::ChatConfig;
///
/// let parser = ChatParser::with_config(ChatConfig::new().with_scan_limit(100));
/// let records = parser.parse_or_empty(b"garbage only".to_vec());
/// assert!(records.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ChatParser {
    config: ChatConfig,
    catalog: GrammarCatalog,
}

impl ChatParser {
    /// Creates a parser with the default configuration and built-in grammars.
    pub fn new() -> Self {
        Self::with_config(ChatConfig::default())
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: ChatConfig) -> Self {
        Self {
            config,
            catalog: GrammarCatalog::builtin().clone(),
        }
    }

    /// Replaces the grammar catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: GrammarCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the grammar catalog in use.
    pub fn catalog(&self) -> &GrammarCatalog {
        &self.catalog
    }

    /// Selects the grammar for these lines.
    pub fn detect<S: AsRef<str>>(&self, lines: &[S]) -> Result<&LineGrammar> {
        self.catalog.detect(lines, self.config.scan_limit)
    }

    /// Parses lines that are already decoded and stripped of the header line.
    ///
    /// An empty input yields no records. Fails with `NoGrammarMatched` when
    /// the format is not recognized.
    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<Record>> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }
        let grammar = self.detect(lines)?;
        let records = reconstruct(lines, grammar);
        debug!(lines = lines.len(), records = records.len(), "reconstructed transcript");
        Ok(records)
    }

    /// Parses a decoded transcript.
    pub fn parse_transcript(&self, transcript: &RawTranscript) -> Result<Vec<Record>> {
        self.parse_lines(transcript.lines())
    }

    /// Decodes and parses raw export bytes.
    pub fn parse_bytes(&self, bytes: Vec<u8>) -> Result<Vec<Record>> {
        let transcript = RawTranscript::from_bytes(bytes, &self.config)?;
        self.parse_transcript(&transcript)
    }

    /// Decodes and parses raw export bytes, degrading every failure to an
    /// empty result.
    pub fn parse_or_empty(&self, bytes: Vec<u8>) -> Vec<Record> {
        self.parse_bytes(bytes).unwrap_or_else(|e| {
            error!(error = e.kind(), "could not parse chat transcript");
            Vec::new()
        })
    }
}

impl Default for ChatParser {
    fn default() -> Self {
        Self::new()
    }
}
