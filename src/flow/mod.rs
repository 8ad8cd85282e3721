//! Step-based donation flow.
//!
//! A [`DataDonationFlow`] is an interpreter over a list of [`Step`]s. It is
//! driven from outside: [`DataDonationFlow::start`] returns the first
//! [`Command`], and every response goes back through
//! [`DataDonationFlow::resume`] until the flow returns `None`.
//!
//! ```text
//! PromptFile ──invalid──▶ Retry ──true──▶ PromptFile
//!     │                     └──other──▶ (no data)
//!     ▼
//!  Extract ──▶ Review ──▶ Exit
//! ```
//!
//! Responses to donate and exit commands are acknowledgements; steps that
//! emit them ignore the value they get back.
//!
//! # Example
//!
//! ```rust
//! use chatdonate::archive::MemoryOpener;
//! use chatdonate::config::FlowConfig;
//! use chatdonate::flow::{DataDonationFlow, FlowContext, Payload, ScriptedDriver};
//!
//! let ctx = FlowContext::new("Demo", "demo", FlowConfig::new("7"), MemoryOpener::new());
//! let mut flow = DataDonationFlow::new(ctx).with_exit();
//!
//! let mut driver = ScriptedDriver::new(Vec::<Payload>::new());
//! flow.run_with(&mut driver);
//!
//! assert!(flow.is_finished());
//! assert_eq!(driver.exit, Some((0, "Success".to_string())));
//! ```

pub mod command;
pub mod driver;
pub mod logsink;
pub mod steps;
pub mod validate;

use std::collections::VecDeque;

use tracing::{Dispatch, debug, info, warn};

pub use command::{Command, Page, Payload};
pub use driver::{Driver, ScriptedDriver};
pub use logsink::LogSink;
pub use steps::{
    ExitStep, ExtractStep, Extractor, FilePromptTexts, FlowState, PromptFileStep, ReviewStep,
    ReviewTexts, Step, TableExtractor, TableExtractors, Transition,
};
pub use validate::{
    DdpCategory, DdpFiletype, KnownFilesValidator, Language, ValidationStatus, Validator,
};

use crate::archive::ArchiveOpener;
use crate::config::FlowConfig;

/// Everything a step may need besides the carried state.
pub struct FlowContext {
    /// Display name of the platform.
    pub platform: String,
    /// Suffix of the donation key, e.g. `whatsapp-chat`.
    pub platform_key: String,
    pub config: FlowConfig,
    pub opener: Box<dyn ArchiveOpener>,
}

impl FlowContext {
    pub fn new(
        platform: impl Into<String>,
        platform_key: impl Into<String>,
        config: FlowConfig,
        opener: impl ArchiveOpener + 'static,
    ) -> Self {
        Self {
            platform: platform.into(),
            platform_key: platform_key.into(),
            config,
            opener: Box::new(opener),
        }
    }

    /// Key under which reviewed data is donated.
    pub fn donation_key(&self) -> String {
        self.config.key(&self.platform_key)
    }
}

/// A resumable sequence of steps.
pub struct DataDonationFlow {
    ctx: FlowContext,
    steps: Vec<Box<dyn Step>>,
    current: usize,
    state: FlowState,
    /// Commands emitted by the flow itself; their responses are discarded.
    pending: VecDeque<Command>,
    awaiting_ack: bool,
    sink: Option<(LogSink, Dispatch)>,
    started: bool,
    finished: bool,
}

impl DataDonationFlow {
    pub fn new(ctx: FlowContext) -> Self {
        let sink = ctx.config.donate_logs.then(|| {
            let sink = LogSink::new();
            let outer = tracing::dispatcher::get_default(Dispatch::clone);
            let dispatch = sink.dispatch_with(outer);
            (sink, dispatch)
        });
        Self {
            ctx,
            steps: Vec::new(),
            current: 0,
            state: FlowState::Empty,
            pending: VecDeque::new(),
            awaiting_ack: false,
            sink,
            started: false,
            finished: false,
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn add_step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Appends the exit step.
    #[must_use]
    pub fn with_exit(self) -> Self {
        self.add_step(ExitStep::new())
    }

    pub fn context(&self) -> &FlowContext {
        &self.ctx
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Returns the captured log lines when log donation is enabled.
    pub fn logs(&self) -> Option<Vec<String>> {
        self.sink.as_ref().map(|(sink, _)| sink.lines())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Starts the flow and returns its first command.
    pub fn start(&mut self) -> Option<Command> {
        if self.started {
            warn!(platform = self.ctx.platform.as_str(), "flow already started");
            return None;
        }
        self.started = true;
        self.with_sink(|flow| {
            info!(platform = flow.ctx.platform.as_str(), "starting data donation flow");
            flow.queue_log_donation();
            flow.advance(None)
        })
    }

    /// Delivers the response to the last command and returns the next one.
    ///
    /// Returns `None` once the flow has finished.
    pub fn resume(&mut self, response: Payload) -> Option<Command> {
        if !self.started || self.finished {
            return None;
        }
        self.with_sink(|flow| flow.advance(Some(response)))
    }

    /// Runs the flow to completion against a driver.
    pub fn run_with(&mut self, driver: &mut dyn Driver) {
        let mut next = self.start();
        while let Some(command) = next {
            let response = match &command {
                Command::Render { page } => driver.render(page),
                Command::Donate { key, payload } => {
                    driver.donate(key, payload);
                    Payload::Void
                }
                Command::Exit { code, info } => {
                    driver.exit(*code, info);
                    Payload::Void
                }
            };
            next = self.resume(response);
        }
    }

    fn with_sink<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        match self.sink.as_ref().map(|(_, dispatch)| dispatch.clone()) {
            Some(dispatch) => tracing::dispatcher::with_default(&dispatch, || f(self)),
            None => f(self),
        }
    }

    fn queue_log_donation(&mut self) {
        let Some((sink, _)) = &self.sink else {
            return;
        };
        match serde_json::to_string(&sink.lines()) {
            Ok(payload) => self
                .pending
                .push_back(Command::donate(self.ctx.config.log_key(), payload)),
            Err(e) => warn!(error = crate::error::DonationError::from(e).kind(), "could not serialize captured logs"),
        }
    }

    /// Runs steps until one suspends or the flow ends.
    ///
    /// `response` goes to the step that is currently suspended. It is dropped
    /// when the last command came from the flow's own queue.
    fn advance(&mut self, mut response: Option<Payload>) -> Option<Command> {
        if std::mem::take(&mut self.awaiting_ack) {
            response = None;
        }

        loop {
            if let Some(command) = self.pending.pop_front() {
                self.awaiting_ack = true;
                return Some(command);
            }

            let Some(step) = self.steps.get_mut(self.current) else {
                info!(platform = self.ctx.platform.as_str(), "flow completed");
                self.finished = true;
                return None;
            };

            match step.resume(&self.ctx, &mut self.state, response.take()) {
                Transition::Suspend(command) => return Some(command),
                Transition::Complete => {
                    debug!(step = step.name(), state = ?self.state, "step completed");
                    self.current += 1;
                    self.queue_log_donation();
                }
                Transition::Rewind => {
                    debug!(step = step.name(), "step rewinds");
                    self.current = self.current.saturating_sub(1);
                    self.state = FlowState::Empty;
                }
            }
        }
    }
}
