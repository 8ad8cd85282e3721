//! Commands sent to the presentation layer and the responses coming back.

use serde::{Deserialize, Serialize};

use crate::table::{Table, Translatable};

/// A participant response, tagged with its kind.
///
/// Serializes as `{"__type__": "PayloadString", "value": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__type__", content = "value")]
pub enum Payload {
    #[serde(rename = "PayloadString")]
    String(String),
    #[serde(rename = "PayloadTrue")]
    True,
    #[serde(rename = "PayloadFalse")]
    False,
    /// A JSON document encoded as a string.
    #[serde(rename = "PayloadJSON")]
    Json(String),
    /// No answer, e.g. the participant skipped the prompt.
    #[serde(rename = "PayloadVoid")]
    Void,
}

impl Payload {
    /// Returns the wire tag of this payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::String(_) => "PayloadString",
            Payload::True => "PayloadTrue",
            Payload::False => "PayloadFalse",
            Payload::Json(_) => "PayloadJSON",
            Payload::Void => "PayloadVoid",
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Payload::True)
    }

    /// Returns the text of a string payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A page the presentation layer renders before answering with a [`Payload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    /// Ask for a file; answered with a string payload holding its location.
    FileInput { header: Translatable, accept: String },
    /// Ask whether to try again; answered with true or false.
    RetryConfirmation { header: Translatable, platform: String },
    /// Ask to pick one option; answered with the option as a string.
    RadioSelect {
        header: Translatable,
        description: Translatable,
        options: Vec<String>,
    },
    /// Show tables for consent; answered with a JSON payload or false.
    Review {
        header: Translatable,
        key: String,
        description: Translatable,
        tables: Vec<Table>,
    },
    /// Final page.
    End,
}

/// One effect requested by a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__type__")]
pub enum Command {
    #[serde(rename = "CommandUIRender")]
    Render { page: Page },
    /// Submit `payload` under `key`. The response is only an acknowledgement.
    #[serde(rename = "CommandSystemDonate")]
    Donate { key: String, payload: String },
    #[serde(rename = "CommandSystemExit")]
    Exit { code: i32, info: String },
}

impl Command {
    pub fn render(page: Page) -> Self {
        Command::Render { page }
    }

    pub fn donate(key: impl Into<String>, payload: impl Into<String>) -> Self {
        Command::Donate {
            key: key.into(),
            payload: payload.into(),
        }
    }

    pub fn exit(code: i32, info: impl Into<String>) -> Self {
        Command::Exit {
            code,
            info: info.into(),
        }
    }

    /// Returns the page of a render command.
    pub fn page(&self) -> Option<&Page> {
        match self {
            Command::Render { page } => Some(page),
            _ => None,
        }
    }
}
