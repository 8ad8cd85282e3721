//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`Source`] - Platforms selectable on the command line
//! - [`OutputFormat`] - Output format options
//! - [`CliDriver`] - Answers flow prompts from the arguments
//!
//! # Example
//!
//! ```rust
//! use chatdonate::cli::{OutputFormat, Source};
//! use chatdonate::platforms::Platform;
//!
//! let platform: Platform = Source::WhatsApp.into();
//! assert_eq!(platform.key(), "whatsapp-chat");
//!
//! let format: chatdonate::format::OutputFormat = OutputFormat::Jsonl.into();
//! assert_eq!(format.extension(), "jsonl");
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ChatConfig, FlowConfig};
use crate::error::DonationError;
use crate::flow::{Driver, Page, Payload};
use crate::output::to_json;
use crate::platforms::Platform;
use crate::table::Table;

/// Run a data donation flow on a local export and write the reviewed
/// tables that would be donated.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatdonate")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatdonate whatsapp \"WhatsApp Chat with Friends.txt\" --user Alice
    chatdonate wa export_dir/ --user Alice -f csv -o summary.csv
    chatdonate chatgpt chatgpt_export/ --donations-dir donations/
    chatdonate tiktok tiktok_export.zip -f csv
    chatdonate wa chat.txt --user Alice --donate-logs --session-id 42 --donations-dir out/")]
pub struct Args {
    /// Platform of the export
    #[arg(value_enum)]
    pub source: Source,

    /// Path to the export (extracted directory or single file)
    pub input: String,

    /// Path to output file
    #[arg(short, long, default_value = "donation.json")]
    pub output: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Your own name in the chat (becomes Member 1)
    #[arg(short, long, value_name = "NAME")]
    pub user: Option<String>,

    /// Session identifier used in donation keys
    #[arg(long, default_value = "0")]
    pub session_id: String,

    /// Capture the session log and donate it as well
    #[arg(long)]
    pub donate_logs: bool,

    /// Write every donation to <DIR>/<key>.json
    #[arg(long, value_name = "DIR")]
    pub donations_dir: Option<String>,

    /// Scan at most this many lines when detecting the chat format
    #[arg(long, value_name = "LINES")]
    pub scan_limit: Option<usize>,

    /// Minimum number of members for a group chat
    #[arg(long, default_value_t = 3)]
    pub min_group_size: usize,
}

impl Args {
    pub fn flow_config(&self) -> FlowConfig {
        FlowConfig::new(self.session_id.clone()).with_donate_logs(self.donate_logs)
    }

    pub fn chat_config(&self) -> ChatConfig {
        let config = ChatConfig::new().with_min_group_size(self.min_group_size);
        match self.scan_limit {
            Some(limit) => config.with_scan_limit(limit),
            None => config,
        }
    }
}

/// Platforms selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// WhatsApp group chat TXT export
    #[value(name = "whatsapp", alias = "wa")]
    #[serde(rename = "whatsapp", alias = "wa")]
    WhatsApp,

    /// ChatGPT export with conversations.json
    #[value(name = "chatgpt", alias = "openai")]
    #[serde(rename = "chatgpt", alias = "openai")]
    ChatGpt,

    /// TikTok export with plain text activity files
    #[value(name = "tiktok", alias = "tt")]
    #[serde(rename = "tiktok", alias = "tt")]
    TikTok,
}

impl From<Source> for Platform {
    fn from(source: Source) -> Platform {
        match source {
            Source::WhatsApp => Platform::WhatsApp,
            Source::ChatGpt => Platform::ChatGpt,
            Source::TikTok => Platform::TikTok,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Platform::from(*self))
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CSV with semicolon delimiter
    Csv,

    /// JSON array of tables (default, same as the donated payload)
    #[default]
    Json,

    /// JSON Lines - one JSON object per table row
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::format::OutputFormat::from(*self))
    }
}

// Conversion to library format type
impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> crate::format::OutputFormat {
        match format {
            OutputFormat::Csv => crate::format::OutputFormat::Csv,
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Jsonl => crate::format::OutputFormat::Jsonl,
        }
    }
}

/// Answers flow prompts without interaction.
///
/// The file prompt gets the input path, the name selection gets `--user`,
/// retries are declined and reviewed tables are consented to. Every prompt
/// is answered once; asking again is answered with [`Payload::Void`], which
/// ends the flow.
#[derive(Debug, Default)]
pub struct CliDriver {
    input: String,
    user: Option<String>,
    donations_dir: Option<PathBuf>,
    file_given: bool,
    user_given: bool,
    /// Tables shown on the review page.
    pub reviewed: Vec<Table>,
    /// Members offered on the name selection page.
    pub members: Vec<String>,
    /// Keys of the donations made, in order.
    pub donated: Vec<String>,
    /// Files written to the donations directory.
    pub written: Vec<PathBuf>,
    pub retried: bool,
    pub exit: Option<(i32, String)>,
    /// First error hit while writing donations.
    pub error: Option<DonationError>,
}

impl CliDriver {
    pub fn new(args: &Args) -> Self {
        Self {
            input: args.input.clone(),
            user: args.user.clone(),
            donations_dir: args.donations_dir.as_ref().map(PathBuf::from),
            ..Self::default()
        }
    }

    fn write_donation(dir: &Path, key: &str, payload: &str) -> Result<PathBuf, DonationError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{key}.json"));
        fs::write(&path, payload)?;
        Ok(path)
    }
}

impl Driver for CliDriver {
    fn render(&mut self, page: &Page) -> Payload {
        match page {
            Page::FileInput { .. } if !self.file_given => {
                self.file_given = true;
                Payload::String(self.input.clone())
            }
            Page::RetryConfirmation { platform, .. } => {
                warn!(platform = platform.as_str(), "input was not accepted");
                self.retried = true;
                Payload::False
            }
            Page::RadioSelect { options, .. } => {
                self.members = options.clone();
                match &self.user {
                    Some(user) if !self.user_given => {
                        self.user_given = true;
                        Payload::String(user.clone())
                    }
                    _ => Payload::Void,
                }
            }
            Page::Review { tables, .. } => {
                self.reviewed = tables.clone();
                match to_json(tables) {
                    Ok(json) => Payload::Json(json),
                    Err(e) => {
                        self.error.get_or_insert(e);
                        Payload::False
                    }
                }
            }
            _ => Payload::Void,
        }
    }

    fn donate(&mut self, key: &str, payload: &str) {
        self.donated.push(key.to_string());
        let Some(dir) = &self.donations_dir else {
            return;
        };
        match Self::write_donation(dir, key, payload) {
            Ok(path) => {
                info!(path = %path.display(), "donation written");
                self.written.push(path);
            }
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
    }

    fn exit(&mut self, code: i32, info: &str) {
        self.exit = Some((code, info.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Translatable;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["chatdonate", "wa", "chat.txt"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_args_defaults() {
        let args = args(&[]);
        assert_eq!(args.source, Source::WhatsApp);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.output, "donation.json");
        assert_eq!(args.flow_config(), FlowConfig::new("0"));
        assert_eq!(args.chat_config(), ChatConfig::default());
    }

    #[test]
    fn test_args_configs() {
        let args = args(&["--session-id", "7", "--donate-logs", "--scan-limit", "20"]);
        assert_eq!(args.flow_config().log_key(), "7-tracking");
        assert!(args.flow_config().donate_logs);
        assert_eq!(args.chat_config().scan_limit, Some(20));
    }

    #[test]
    fn test_source_full_names_and_aliases() {
        for (name, source) in [
            ("whatsapp", Source::WhatsApp),
            ("wa", Source::WhatsApp),
            ("chatgpt", Source::ChatGpt),
            ("openai", Source::ChatGpt),
            ("tiktok", Source::TikTok),
        ] {
            let args = Args::parse_from(["chatdonate", name, "export"]);
            assert_eq!(args.source, source, "{name}");
        }
        assert!(Args::try_parse_from(["chatdonate", "whats-app", "export"]).is_err());
        assert_eq!(Source::ChatGpt.to_possible_value().unwrap().get_name(), "chatgpt");
        assert_eq!(serde_json::to_string(&Source::TikTok).unwrap(), "\"tiktok\"");
    }

    #[test]
    fn test_source_display_and_conversion() {
        assert_eq!(Source::WhatsApp.to_string(), "Whatsapp Group Chat");
        assert_eq!(Platform::from(Source::ChatGpt), Platform::ChatGpt);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(OutputFormat::Csv.to_string(), "CSV");
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }

    #[test]
    fn test_driver_answers_each_prompt_once() {
        let mut driver = CliDriver::new(&args(&["--user", "Alice"]));
        let file = Page::FileInput {
            header: Translatable::same("f"),
            accept: String::new(),
        };
        let radio = Page::RadioSelect {
            header: Translatable::same("r"),
            description: Translatable::same("d"),
            options: vec!["Alice".into(), "Bob".into()],
        };

        assert_eq!(driver.render(&file), Payload::String("chat.txt".into()));
        assert_eq!(driver.render(&file), Payload::Void);
        assert_eq!(driver.render(&radio), Payload::String("Alice".into()));
        assert_eq!(driver.render(&radio), Payload::Void);
        assert_eq!(driver.members, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_driver_consents_with_tables_json() {
        let mut driver = CliDriver::new(&args(&[]));
        let table = Table::new("t", Translatable::same("T"), ["a"]);
        let review = Page::Review {
            header: Translatable::same("h"),
            key: "0-whatsapp-chat".into(),
            description: Translatable::same("d"),
            tables: vec![table],
        };
        let Payload::Json(json) = driver.render(&review) else {
            panic!("expected a JSON payload");
        };
        assert!(json.contains("\"id\": \"t\""));
        assert_eq!(driver.reviewed.len(), 1);
    }

    #[test]
    fn test_driver_writes_donations() {
        let dir = tempfile::TempDir::new().unwrap();
        let donations = dir.path().join("out");
        let mut driver = CliDriver::new(&args(&["--donations-dir", donations.to_str().unwrap()]));

        driver.donate("0-whatsapp-chat", "[]");
        assert_eq!(driver.donated, vec!["0-whatsapp-chat"]);
        assert_eq!(
            fs::read_to_string(donations.join("0-whatsapp-chat.json")).unwrap(),
            "[]"
        );
        assert!(driver.error.is_none());
    }
}
