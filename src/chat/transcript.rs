//! Decoded transcript lines.
//!
//! Exports carry invisible noise: byte order marks, left-to-right marks around
//! names and dates, narrow no-break spaces before `AM`/`PM`. All of that is
//! stripped per line so the grammars only have to describe visible text.

use crate::config::ChatConfig;
use crate::error::{DonationError, Result};

/// Ordered, immutable lines of a chat export with the leading system lines removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTranscript {
    lines: Vec<String>,
}

impl RawTranscript {
    /// Decodes UTF-8 bytes into a transcript.
    pub fn from_bytes(bytes: Vec<u8>, config: &ChatConfig) -> Result<Self> {
        let text = String::from_utf8(bytes)
            .map_err(|e| DonationError::decode("chat transcript", e))?;
        Ok(Self::from_text(&text, config))
    }

    /// Builds a transcript from already decoded text.
    pub fn from_text(text: &str, config: &ChatConfig) -> Self {
        let lines = text
            .lines()
            .map(clean_line)
            .skip(config.skip_leading_lines)
            .collect();
        Self { lines }
    }

    /// Builds a transcript from lines that are used as-is.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the transcript lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Removes control and format characters and folds compatibility spaces.
///
/// The zero width joiner is kept so emoji sequences survive.
pub fn clean_line(line: &str) -> String {
    line.chars()
        .filter(|&c| !is_noise(c))
        .map(|c| if is_compat_space(c) { ' ' } else { c })
        .collect()
}

fn is_noise(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{00AD}'
                | '\u{0600}'..='\u{0605}'
                | '\u{061C}'
                | '\u{06DD}'
                | '\u{070F}'
                | '\u{180E}'
                | '\u{200B}'
                | '\u{200C}'
                | '\u{200E}'
                | '\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{206F}'
                | '\u{FEFF}'
                | '\u{FFF9}'..='\u{FFFB}'
        )
}

fn is_compat_space(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}
