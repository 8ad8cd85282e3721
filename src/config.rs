//! Configuration types for chat parsing and donation flows.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! - [`ChatConfig`] - transcript decoding, grammar detection and the group gate
//! - [`FlowConfig`] - session identity and log donation
//!
//! # Example
//!
//! ```rust
//! use chatdonate::config::{ChatConfig, FlowConfig};
//!
//! let chat = ChatConfig::new().with_min_group_size(4);
//! let flow = FlowConfig::new("session-17").with_donate_logs(true);
//!
//! assert_eq!(chat.min_group_size, 4);
//! assert_eq!(flow.log_key(), "session-17-tracking");
//! ```

use serde::{Deserialize, Serialize};

/// Configuration for chat transcript parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of leading lines dropped after decoding (default: 1).
    ///
    /// Exports start with an encryption notice that is not a message.
    pub skip_leading_lines: usize,

    /// Maximum number of lines scanned while detecting the grammar
    /// (default: `None`, the whole transcript).
    pub scan_limit: Option<usize>,

    /// Minimum number of genuine participants for a group chat (default: 3).
    pub min_group_size: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            skip_leading_lines: 1,
            scan_limit: None,
            min_group_size: 3,
        }
    }
}

impl ChatConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many leading lines are dropped.
    #[must_use]
    pub fn with_skip_leading_lines(mut self, count: usize) -> Self {
        self.skip_leading_lines = count;
        self
    }

    /// Caps the number of lines scanned during grammar detection.
    #[must_use]
    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = Some(limit);
        self
    }

    /// Sets the minimum group size.
    #[must_use]
    pub fn with_min_group_size(mut self, size: usize) -> Self {
        self.min_group_size = size;
        self
    }
}

/// Configuration for a donation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Session identifier, used as prefix of every donation key.
    pub session_id: String,

    /// Capture the session's log lines and donate them as a side artifact
    /// (default: false).
    pub donate_logs: bool,

    /// Suffix of the log donation key (default: `tracking`).
    pub log_key_suffix: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            session_id: "0".to_string(),
            donate_logs: false,
            log_key_suffix: "tracking".to_string(),
        }
    }
}

impl FlowConfig {
    /// Creates a configuration for the given session.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    /// Enables or disables log donation.
    #[must_use]
    pub fn with_donate_logs(mut self, enabled: bool) -> Self {
        self.donate_logs = enabled;
        self
    }

    /// Sets the log donation key suffix.
    #[must_use]
    pub fn with_log_key_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.log_key_suffix = suffix.into();
        self
    }

    /// Returns a session-scoped donation key: `<session_id>-<suffix>`.
    pub fn key(&self, suffix: &str) -> String {
        format!("{}-{}", self.session_id, suffix)
    }

    /// Returns the key under which captured logs are donated.
    pub fn log_key(&self) -> String {
        self.key(&self.log_key_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_config_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.skip_leading_lines, 1);
        assert_eq!(config.scan_limit, None);
        assert_eq!(config.min_group_size, 3);
    }

    #[test]
    fn test_chat_config_builder() {
        let config = ChatConfig::new()
            .with_skip_leading_lines(0)
            .with_scan_limit(50)
            .with_min_group_size(2);
        assert_eq!(config.skip_leading_lines, 0);
        assert_eq!(config.scan_limit, Some(50));
        assert_eq!(config.min_group_size, 2);
    }

    #[test]
    fn test_flow_config_keys() {
        let config = FlowConfig::new("42");
        assert!(!config.donate_logs);
        assert_eq!(config.key("whatsapp-chat"), "42-whatsapp-chat");
        assert_eq!(config.log_key(), "42-tracking");

        let config = config.with_log_key_suffix("logs");
        assert_eq!(config.log_key(), "42-logs");
    }

    #[test]
    fn test_config_serde() {
        let config = ChatConfig::new().with_scan_limit(10);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ChatConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
