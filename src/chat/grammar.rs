//! Line grammars and the schema matcher.
//!
//! A [`LineGrammar`] describes how one physical transcript line encodes a
//! date, an author and a message. Grammars are written as simplified
//! templates where `%` codes stand for named capture groups:
//!
//! | Code | Group | Pattern |
//! |------|-------|---------|
//! | `%Y`, `%y` | `year` | `\d{2,4}` |
//! | `%m` | `month` | `\d{1,2}` |
//! | `%d` | `day` | `\d{1,2}` |
//! | `%H`, `%I` | `hour` | `\d{1,2}` |
//! | `%M` | `minutes` | `\d{2}` |
//! | `%S` | `seconds` | `\d{2}` |
//! | `%P`, `%p` | `ampm` | `[AaPp].? ?[Mm].?` |
//! | `%name` | `name` | `[^:]*` |
//! | `%chat_message` | `chat_message` | `.*` |
//!
//! The [`GrammarCatalog`] is an ordered list. Earlier entries are more
//! specific; the last one is a permissive fallback that takes everything in
//! front of `] ` or ` - ` as the date.
//!
//! # Example
//!
//! ```rust
//! use chatdonate::chat::GrammarCatalog;
//!
//! let catalog = GrammarCatalog::builtin();
//! let lines = vec!["1/15/24, 10:30 - Alice: Hello".to_string()];
//! let grammar = catalog.detect(&lines, None)?;
//!
//! let record = grammar.record(&lines[0]);
//! assert_eq!(record.author, "Alice");
//! assert_eq!(record.date, "24-1-15");
//! # Ok::<(), chatdonate::DonationError>(())
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error};

use crate::Record;
use crate::error::{DonationError, Result};

/// Locale grammars in priority order, fallback last.
pub const BUILTIN_TEMPLATES: &[&str] = &[
    r"^%m/%d/%y, %H:%M - %name: %chat_message$",
    r"^\[%d/%m/%y, %H:%M:%S\] %name: %chat_message$",
    r"^%d-%m-%y %H:%M - %name: %chat_message$",
    r"^\[%d-%m-%y %H:%M:%S\] %name: %chat_message$",
    r"^\[%m/%d/%y, %H:%M:%S\] %name: %chat_message$",
    r"^%d/%m/%y, %H:%M – %name: %chat_message$",
    r"^%d/%m/%y, %H:%M - %name: %chat_message$",
    r"^%d\.%m\.%y, %H:%M – %name: %chat_message$",
    r"^%d\.%m\.%y, %H:%M - %name: %chat_message$",
    r"^%m\.%d\.%y, %H:%M - %name: %chat_message$",
    r"^%m\.%d\.%y %H:%M - %name: %chat_message$",
    r"^\[%d/%m/%y, %H:%M:%S %P\] %name: %chat_message$",
    r"^\[%m/%d/%y, %H:%M:%S %P\] %name: %chat_message$",
    r"^\[%d\.%m\.%y, %H:%M:%S\] %name: %chat_message$",
    r"^\[%m/%d/%y %H:%M:%S\] %name: %chat_message$",
    r"^\[%m-%d-%y, %H:%M:%S\] %name: %chat_message$",
    r"^\[%m-%d-%y %H:%M:%S\] %name: %chat_message$",
    r"^%m-%d-%y %H:%M - %name: %chat_message$",
    r"^%m-%d-%y, %H:%M - %name: %chat_message$",
    r"^%m-%d-%y, %H:%M , %name: %chat_message$",
    r"^%m/%d/%y, %H:%M , %name: %chat_message$",
    r"^%d-%m-%y, %H:%M , %name: %chat_message$",
    r"^%d/%m/%y, %H:%M , %name: %chat_message$",
    r"^%d\.%m\.%y %H:%M – %name: %chat_message$",
    r"^%m\.%d\.%y, %H:%M – %name: %chat_message$",
    r"^%m\.%d\.%y %H:%M – %name: %chat_message$",
    r"^\[%d\.%m\.%y %H:%M:%S\] %name: %chat_message$",
    r"^\[%m\.%d\.%y, %H:%M:%S\] %name: %chat_message$",
    r"^\[%m\.%d\.%y %H:%M:%S\] %name: %chat_message$",
    // Fallback: everything before the delimiter ends up in `year`
    r"^(?P<year>.*?)(?:\] | - )%name: %chat_message$",
];

static BUILTIN: LazyLock<GrammarCatalog> = LazyLock::new(|| {
    GrammarCatalog::from_templates(BUILTIN_TEMPLATES)
        .expect("built-in grammar templates are valid")
});

/// Expands a `%` code into its named capture group.
fn code_pattern(code: &str) -> Option<&'static str> {
    let pattern = match code {
        "%Y" | "%y" => r"(?P<year>\d{2,4})",
        "%m" => r"(?P<month>\d{1,2})",
        "%d" => r"(?P<day>\d{1,2})",
        "%H" | "%I" => r"(?P<hour>\d{1,2})",
        "%M" => r"(?P<minutes>\d{2})",
        "%S" => r"(?P<seconds>\d{2})",
        "%P" | "%p" => r"(?P<ampm>[AaPp].? ?[Mm].?)",
        "%name" => r"(?P<name>[^:]*)",
        "%chat_message" => r"(?P<chat_message>.*)",
        _ => return None,
    };
    Some(pattern)
}

/// Replaces every `%` code of a template with its capture group.
pub fn expand_template(template: &str) -> Result<String> {
    static CODE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"%\w+").expect("code pattern is valid"));

    let mut unknown = None;
    let expanded = CODE.replace_all(template, |caps: &regex::Captures<'_>| {
        let code = &caps[0];
        code_pattern(code).map(str::to_string).unwrap_or_else(|| {
            error!(code, "no pattern for grammar code");
            unknown.get_or_insert_with(|| code.to_string());
            code.to_string()
        })
    });

    match unknown {
        Some(code) => Err(DonationError::invalid_format(
            "grammar template",
            format!("unknown code {code} in {template}"),
        )),
        None => Ok(expanded.into_owned()),
    }
}

/// One compiled line grammar.
#[derive(Debug, Clone)]
pub struct LineGrammar {
    template: String,
    regex: Regex,
}

impl LineGrammar {
    /// Compiles a grammar from a simplified template.
    pub fn from_template(template: &str) -> Result<Self> {
        let expanded = expand_template(template)?;
        let regex = Regex::new(&expanded)
            .map_err(|e| DonationError::invalid_format("grammar template", e.to_string()))?;
        Ok(Self {
            template: template.to_string(),
            regex,
        })
    }

    /// Returns the template this grammar was built from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns `true` if the whole line matches this grammar from the line start.
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Splits a logical line into a [`Record`].
    ///
    /// Returns the sentinel [`Record::empty`] when the line does not match.
    pub fn record(&self, line: &str) -> Record {
        let Some(caps) = self.regex.captures(line) else {
            return Record::empty();
        };
        let group = |name: &str| caps.name(name).map(|m| m.as_str());

        Record {
            date: Record::join_date(group("year"), group("month"), group("day")),
            author: group("name").unwrap_or_default().to_string(),
            message: group("chat_message").unwrap_or_default().to_string(),
        }
    }
}

impl PartialEq for LineGrammar {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for LineGrammar {}

/// An ordered list of line grammars.
#[derive(Debug, Clone)]
pub struct GrammarCatalog {
    grammars: Vec<LineGrammar>,
}

impl GrammarCatalog {
    /// Returns the process-wide built-in catalog.
    pub fn builtin() -> &'static GrammarCatalog {
        &BUILTIN
    }

    /// Compiles a catalog from templates, keeping their order.
    pub fn from_templates<S: AsRef<str>>(templates: &[S]) -> Result<Self> {
        let grammars = templates
            .iter()
            .map(|t| LineGrammar::from_template(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { grammars })
    }

    /// Returns the grammars in priority order.
    pub fn grammars(&self) -> &[LineGrammar] {
        &self.grammars
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    /// Picks the first grammar, in catalog order, that matches at least one
    /// of the scanned lines.
    ///
    /// At most `scan_limit` lines are scanned (all lines when `None`).
    pub fn detect<'a, S: AsRef<str>>(
        &'a self,
        lines: &[S],
        scan_limit: Option<usize>,
    ) -> Result<&'a LineGrammar> {
        let scanned = scan_limit.map_or(lines.len(), |limit| limit.min(lines.len()));
        let sample = &lines[..scanned];

        let found = self
            .grammars
            .iter()
            .find(|grammar| sample.iter().any(|line| grammar.is_match(line.as_ref())));

        match found {
            Some(grammar) => {
                debug!(template = grammar.template(), "matched grammar");
                Ok(grammar)
            }
            None => {
                error!(scanned, "no matching grammar found");
                Err(DonationError::no_grammar_matched(scanned))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_one(line: &str) -> &'static LineGrammar {
        GrammarCatalog::builtin()
            .detect(&[line], None)
            .expect("line should match a grammar")
    }

    #[test]
    fn test_builtin_catalog_compiles() {
        let catalog = GrammarCatalog::builtin();
        assert_eq!(catalog.len(), BUILTIN_TEMPLATES.len());
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_expand_template() {
        let expanded = expand_template(r"^%d/%m/%y %name: %chat_message$").unwrap();
        assert!(expanded.contains("(?P<day>"));
        assert!(expanded.contains("(?P<name>[^:]*)"));
        assert!(!expanded.contains('%'));
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = LineGrammar::from_template(r"^%q %name: %chat_message$").unwrap_err();
        assert!(err.to_string().contains("%q"));
    }

    #[test]
    fn test_us_android_line() {
        let grammar = detect_one("1/15/24, 10:30 - Alice: Hello there");
        assert_eq!(grammar.template(), BUILTIN_TEMPLATES[0]);

        let record = grammar.record("1/15/24, 10:30 - Alice: Hello there");
        assert_eq!(record, Record::new("24-1-15", "Alice", "Hello there"));
    }

    #[test]
    fn test_bracketed_line_with_seconds() {
        let line = "[15/01/24, 10:30:45] Bob: Hi";
        let grammar = detect_one(line);
        assert_eq!(grammar.template(), BUILTIN_TEMPLATES[1]);
        assert_eq!(grammar.record(line), Record::new("24-01-15", "Bob", "Hi"));
    }

    #[test]
    fn test_bracketed_ampm_line() {
        let line = "[1/15/24, 10:30:45 AM] Alice: Morning";
        let grammar = detect_one(line);
        assert_eq!(grammar.template(), BUILTIN_TEMPLATES[11]);
        let record = grammar.record(line);
        assert_eq!(record.author, "Alice");
        assert_eq!(record.message, "Morning");
    }

    #[test]
    fn test_dotted_line_needs_literal_dots() {
        let line = "15.01.24, 10:30 - Anna: Hallo";
        let grammar = detect_one(line);
        assert_eq!(grammar.template(), BUILTIN_TEMPLATES[8]);
        assert_eq!(grammar.record(line).date, "24-01-15");

        // dashes are not dots
        assert!(!grammar.is_match("15-01-24, 10:30 - Anna: Hallo"));
    }

    #[test]
    fn test_en_dash_delimiter() {
        let line = "15/01/24, 10:30 – Piet: Hoi";
        let grammar = detect_one(line);
        assert_eq!(grammar.template(), BUILTIN_TEMPLATES[5]);
    }

    #[test]
    fn test_fallback_grammar() {
        let line = "Jan 15 at 10:30 - Alice: odd locale";
        let grammar = detect_one(line);
        assert_eq!(grammar.template(), *BUILTIN_TEMPLATES.last().unwrap());

        let record = grammar.record(line);
        assert_eq!(record.date, "Jan 15 at 10:30--");
        assert_eq!(record.author, "Alice");
        assert_eq!(record.message, "odd locale");
    }

    #[test]
    fn test_specific_grammar_wins_over_fallback_on_later_line() {
        let lines = [
            "Jan 15 at 10:30 - Alice changed the subject: new name",
            "1/15/24, 10:31 - Bob: Hello",
        ];
        let grammar = GrammarCatalog::builtin().detect(&lines, None).unwrap();
        assert_eq!(grammar.template(), BUILTIN_TEMPLATES[0]);
    }

    #[test]
    fn test_no_grammar_matched() {
        let lines = ["just some text", "and more text"];
        let err = GrammarCatalog::builtin().detect(&lines, None).unwrap_err();
        assert!(err.is_no_grammar_matched());
    }

    #[test]
    fn test_scan_limit_caps_detection() {
        let lines = ["no match here", "1/15/24, 10:30 - Alice: Hello"];
        let err = GrammarCatalog::builtin().detect(&lines, Some(1)).unwrap_err();
        assert!(err.is_no_grammar_matched());
        assert!(GrammarCatalog::builtin().detect(&lines, Some(5)).is_ok());
    }

    #[test]
    fn test_non_matching_line_yields_sentinel() {
        let grammar = detect_one("1/15/24, 10:30 - Alice: Hello");
        assert!(grammar.record("not a chat line").is_empty());
    }

    #[test]
    fn test_custom_catalog() {
        let catalog =
            GrammarCatalog::from_templates(&[r"^%Y%m%d %name: %chat_message$"]).unwrap();
        let grammar = catalog.detect(&["20240115 Alice: hi"], None).unwrap();
        assert_eq!(grammar.record("20240115 Alice: hi").date, "2024-01-15");
    }
}
