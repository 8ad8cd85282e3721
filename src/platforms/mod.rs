//! Platform-specific donation flows.

pub mod chatgpt;
pub mod tiktok;
pub mod whatsapp;

use serde::{Deserialize, Serialize};

use crate::archive::ArchiveOpener;
use crate::config::{ChatConfig, FlowConfig};
use crate::flow::DataDonationFlow;

/// Platforms with a ready-made donation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// WhatsApp group chat text export
    #[serde(alias = "wa")]
    WhatsApp,
    /// ChatGPT data export (`conversations.json`)
    #[serde(alias = "openai")]
    ChatGpt,
    /// TikTok text export, one table per activity file
    #[serde(alias = "tt")]
    TikTok,
}

impl Platform {
    /// Returns the display name.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::WhatsApp => whatsapp::PLATFORM_NAME,
            Platform::ChatGpt => chatgpt::PLATFORM_NAME,
            Platform::TikTok => tiktok::PLATFORM_NAME,
        }
    }

    /// Returns the donation key suffix.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::WhatsApp => whatsapp::PLATFORM_KEY,
            Platform::ChatGpt => chatgpt::PLATFORM_KEY,
            Platform::TikTok => tiktok::PLATFORM_KEY,
        }
    }

    /// Returns all supported platform names.
    pub fn all_names() -> &'static [&'static str] {
        &["whatsapp", "chatgpt", "tiktok"]
    }

    pub fn all() -> &'static [Platform] {
        &[Platform::WhatsApp, Platform::ChatGpt, Platform::TikTok]
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whatsapp" | "wa" => Ok(Platform::WhatsApp),
            "chatgpt" | "openai" => Ok(Platform::ChatGpt),
            "tiktok" | "tt" => Ok(Platform::TikTok),
            _ => Err(format!(
                "Unknown platform: '{}'. Expected one of: {}",
                s,
                Platform::all_names().join(", ")
            )),
        }
    }
}

/// Creates the donation flow of a platform.
///
/// # Example
///
/// ```rust
/// use chatdonate::archive::FsOpener;
/// use chatdonate::config::{ChatConfig, FlowConfig};
/// use chatdonate::platforms::{Platform, create_flow};
///
/// let flow = create_flow(Platform::WhatsApp, FlowConfig::new("1"), ChatConfig::default(), FsOpener);
/// assert_eq!(flow.context().donation_key(), "1-whatsapp-chat");
/// ```
pub fn create_flow(
    platform: Platform,
    config: FlowConfig,
    chat: ChatConfig,
    opener: impl ArchiveOpener + 'static,
) -> DataDonationFlow {
    match platform {
        Platform::WhatsApp => whatsapp::create_flow(config, chat, opener),
        Platform::ChatGpt => chatgpt::create_flow(config, opener),
        Platform::TikTok => tiktok::create_flow(config, opener),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_platform_from_str() {
        assert_eq!(Platform::from_str("whatsapp").unwrap(), Platform::WhatsApp);
        assert_eq!(Platform::from_str("WA").unwrap(), Platform::WhatsApp);
        assert_eq!(Platform::from_str("openai").unwrap(), Platform::ChatGpt);
        assert_eq!(Platform::from_str("TikTok").unwrap(), Platform::TikTok);
        assert_eq!(Platform::from_str("tt").unwrap(), Platform::TikTok);
        assert!(Platform::from_str("telegram").is_err());
    }

    #[test]
    fn test_platform_keys() {
        assert_eq!(Platform::WhatsApp.key(), "whatsapp-chat");
        assert_eq!(Platform::ChatGpt.to_string(), "ChatGPT");
        assert_eq!(Platform::TikTok.key(), "tiktok");
        assert_eq!(Platform::all().len(), Platform::all_names().len());
    }

    #[test]
    fn test_platform_serde() {
        let json = serde_json::to_string(&Platform::ChatGpt).unwrap();
        assert_eq!(json, "\"chatgpt\"");
        let parsed: Platform = serde_json::from_str("\"whatsapp\"").unwrap();
        assert_eq!(parsed, Platform::WhatsApp);
    }
}
