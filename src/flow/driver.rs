//! Presentation-side drivers.

use std::collections::VecDeque;

use tracing::debug;

use super::command::{Page, Payload};

/// Executes commands on behalf of a flow.
pub trait Driver {
    /// Shows a page and returns the participant's answer.
    fn render(&mut self, page: &Page) -> Payload;

    fn donate(&mut self, key: &str, payload: &str);

    fn exit(&mut self, code: i32, info: &str);
}

/// Answers pages from a fixed list of responses and records everything.
///
/// When the responses run out, every further page is answered with
/// [`Payload::Void`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedDriver {
    responses: VecDeque<Payload>,
    /// Pages in the order they were rendered.
    pub pages: Vec<Page>,
    /// `(key, payload)` pairs in the order they were donated.
    pub donations: Vec<(String, String)>,
    pub exit: Option<(i32, String)>,
}

impl ScriptedDriver {
    pub fn new(responses: impl IntoIterator<Item = Payload>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Returns the donations made under `key`.
    pub fn donations_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.donations
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, p)| p.as_str())
    }

    /// Number of responses not consumed yet.
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl Driver for ScriptedDriver {
    fn render(&mut self, page: &Page) -> Payload {
        self.pages.push(page.clone());
        let response = self.responses.pop_front().unwrap_or(Payload::Void);
        debug!(kind = response.kind(), "scripted response");
        response
    }

    fn donate(&mut self, key: &str, payload: &str) {
        self.donations.push((key.to_string(), payload.to_string()));
    }

    fn exit(&mut self, code: i32, info: &str) {
        self.exit = Some((code, info.to_string()));
    }
}
