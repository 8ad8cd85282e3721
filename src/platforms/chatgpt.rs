//! ChatGPT conversation history donation.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::archive::{Archive, ArchiveOpener, find_entry, read_text};
use crate::config::FlowConfig;
use crate::error::Result;
use crate::flow::{
    DataDonationFlow, DdpCategory, DdpFiletype, ExtractStep, FilePromptTexts, FlowContext,
    KnownFilesValidator, PromptFileStep, ReviewStep, ReviewTexts,
};
use crate::table::{Table, Translatable};

pub const PLATFORM_NAME: &str = "ChatGPT";
pub const PLATFORM_KEY: &str = "chatgpt";
pub const TABLE_ID: &str = "chatgpt_conversations";

pub fn ddp_categories() -> Vec<DdpCategory> {
    vec![DdpCategory::new(
        "json",
        DdpFiletype::Json,
        [
            "chat.html",
            "conversations.json",
            "message_feedback.json",
            "model_comparisons.json",
            "user.json",
        ],
    )]
}

// Internal structures for deserializing conversations.json

#[derive(Debug, Deserialize)]
struct Conversation {
    #[serde(default)]
    title: Option<String>,
    /// Turns keyed by node id.
    #[serde(default)]
    mapping: BTreeMap<String, Node>,
}

#[derive(Debug, Deserialize)]
struct Node {
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    author: Option<Author>,
    content: Option<Content>,
    /// Seconds since the epoch, with fraction.
    create_time: Option<f64>,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Debug, Deserialize)]
struct Author {
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    model_slug: Option<String>,
    #[serde(default)]
    is_visually_hidden_from_conversation: bool,
}

/// One visible turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub conversation: String,
    pub role: String,
    pub message: String,
    pub model: String,
    pub time: String,
}

/// Formats epoch seconds as an ISO 8601 UTC timestamp.
fn epoch_to_iso(epoch: f64) -> Option<String> {
    let secs = epoch.trunc() as i64;
    let nanos = (epoch.fract() * 1e9) as u32;
    DateTime::from_timestamp(secs, nanos).map(|t| t.format("%Y-%m-%dT%H:%M:%S%:z").to_string())
}

/// Joins the text parts of a message. Non-text parts such as images are skipped.
fn extract_text(parts: &[Value]) -> String {
    parts.iter().filter_map(Value::as_str).collect()
}

/// Parses `conversations.json` into visible turns, ordered by time.
///
/// Hidden turns and turns without a role are left out.
pub fn parse_conversations(json: &str) -> Result<Vec<Turn>> {
    let conversations: Vec<Conversation> = serde_json::from_str(json)?;

    let mut turns: Vec<Turn> = conversations
        .iter()
        .flat_map(|conversation| {
            let title = conversation.title.clone().unwrap_or_default();
            conversation.mapping.values().filter_map(move |node| {
                let message = node.message.as_ref()?;
                if message.metadata.is_visually_hidden_from_conversation {
                    return None;
                }
                let role = message.author.as_ref()?.role.clone()?;
                if role.is_empty() {
                    return None;
                }

                Some(Turn {
                    conversation: title.clone(),
                    role,
                    message: message
                        .content
                        .as_ref()
                        .map(|c| extract_text(&c.parts))
                        .unwrap_or_default(),
                    model: message.metadata.model_slug.clone().unwrap_or_default(),
                    time: message
                        .create_time
                        .and_then(epoch_to_iso)
                        .unwrap_or_default(),
                })
            })
        })
        .collect();

    turns.sort_by(|a, b| a.time.cmp(&b.time));
    Ok(turns)
}

fn conversations_table(turns: Vec<Turn>) -> Table {
    let mut table = Table::new(
        TABLE_ID,
        Translatable::en_nl("Your conversations with ChatGPT", "Uw gesprekken met ChatGPT"),
        ["conversation title", "role", "message", "model", "time"],
    )
    .with_description(Translatable::same(
        "In this table you find your conversations with ChatGPT sorted by time.",
    ));
    for turn in turns {
        table.push_row([turn.conversation, turn.role, turn.message, turn.model, turn.time]);
    }
    table
}

/// Extracts the review tables from a ChatGPT package.
///
/// A package whose conversations cannot be read yields no table.
pub fn extract(archive: &dyn Archive) -> Vec<Table> {
    let turns = find_entry(archive, &["conversations.json"])
        .and_then(|entry| read_text(archive, &entry))
        .and_then(|json| parse_conversations(&json));

    match turns {
        Ok(turns) if !turns.is_empty() => {
            info!(turns = turns.len(), "extracted conversations");
            vec![conversations_table(turns)]
        }
        Ok(_) => Vec::new(),
        Err(e) => {
            error!(error = e.kind(), "data extraction error");
            Vec::new()
        }
    }
}

/// Builds the complete ChatGPT flow.
pub fn create_flow(config: FlowConfig, opener: impl ArchiveOpener + 'static) -> DataDonationFlow {
    let ctx = FlowContext::new(PLATFORM_NAME, PLATFORM_KEY, config, opener);

    DataDonationFlow::new(ctx)
        .add_step(PromptFileStep::new(
            FilePromptTexts {
                submit_file_header: Translatable::en_nl(
                    "Select your ChatGPT file",
                    "Selecteer uw ChatGPT bestand",
                ),
                retry_header: Translatable::en_nl("Try again", "Probeer opnieuw"),
            },
            ddp_categories(),
            Box::new(KnownFilesValidator),
        ))
        .add_step(ExtractStep::new(extract))
        .add_step(ReviewStep::new(ReviewTexts {
            review_data_header: Translatable::en_nl("Your ChatGPT data", "Uw ChatGPT gegevens"),
            review_data_description: Translatable::same(
                "Below you will find a currated selection of ChatGPT data. In this case only the conversations you had with ChatGPT are shown on screen.",
            ),
        }))
        .with_exit()
}
