//! Resumable flow steps.
//!
//! A step is a small state machine. The flow calls [`Step::resume`] with
//! `None` when it enters the step and with the participant's response after
//! every command the step suspended on. The step answers with a
//! [`Transition`]: suspend on another command, complete, or rewind to the
//! previous step.

use std::fmt;

use tracing::{info, warn};

use super::FlowContext;
use super::command::{Command, Page, Payload};
use super::validate::{DdpCategory, ValidationStatus, Validator};
use crate::archive::Archive;
use crate::error::DonationError;
use crate::table::{Table, Translatable};

/// Value carried from one step to the next.
#[derive(Default)]
pub enum FlowState {
    /// Nothing to work with, e.g. the participant abandoned the upload.
    #[default]
    Empty,
    /// A validated data package.
    Archive(Box<dyn Archive>),
    /// Extracted tables awaiting review.
    Tables(Vec<Table>),
}

impl fmt::Debug for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::Empty => write!(f, "Empty"),
            FlowState::Archive(_) => write!(f, "Archive"),
            FlowState::Tables(tables) => write!(f, "Tables({})", tables.len()),
        }
    }
}

impl FlowState {
    pub fn is_empty(&self) -> bool {
        matches!(self, FlowState::Empty)
    }

    pub fn archive(&self) -> Option<&dyn Archive> {
        match self {
            FlowState::Archive(archive) => Some(archive.as_ref()),
            _ => None,
        }
    }

    pub fn tables(&self) -> Option<&[Table]> {
        match self {
            FlowState::Tables(tables) => Some(tables),
            _ => None,
        }
    }
}

/// What a step wants the flow to do next.
#[derive(Debug)]
pub enum Transition {
    /// Emit the command and call the step again with the response.
    Suspend(Command),
    /// Move on to the next step.
    Complete,
    /// Go back to the previous step with an empty state.
    Rewind,
}

/// One resumable unit of a donation flow.
pub trait Step {
    fn name(&self) -> &str;

    /// Advances the step. `response` is `None` on entry.
    fn resume(
        &mut self,
        ctx: &FlowContext,
        state: &mut FlowState,
        response: Option<Payload>,
    ) -> Transition;
}

/// Renders the retry confirmation page.
pub fn retry_prompt(ctx: &FlowContext, header: &Translatable) -> Transition {
    Transition::Suspend(Command::render(Page::RetryConfirmation {
        header: header.clone(),
        platform: ctx.platform.clone(),
    }))
}

// ============================================================================
// File prompt and validation
// ============================================================================

/// Headers shown by the file prompt.
#[derive(Debug, Clone)]
pub struct FilePromptTexts {
    pub submit_file_header: Translatable,
    pub retry_header: Translatable,
}

impl Default for FilePromptTexts {
    fn default() -> Self {
        Self {
            submit_file_header: Translatable::en_nl("Select your file", "Selecteer uw bestand"),
            retry_header: Translatable::en_nl("Try again", "Probeer opnieuw"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptPhase {
    AwaitFile,
    AwaitRetry,
}

/// Asks for a package and validates it, offering a retry on failure.
///
/// On success the archive is carried forward. Declining the retry or
/// skipping the prompt leaves the state empty.
pub struct PromptFileStep {
    texts: FilePromptTexts,
    accept: String,
    categories: Vec<DdpCategory>,
    validator: Box<dyn Validator>,
    phase: PromptPhase,
}

impl PromptFileStep {
    pub fn new(
        texts: FilePromptTexts,
        categories: Vec<DdpCategory>,
        validator: Box<dyn Validator>,
    ) -> Self {
        Self {
            texts,
            accept: "application/zip".to_string(),
            categories,
            validator,
            phase: PromptPhase::AwaitFile,
        }
    }

    /// Sets the accepted MIME types of the file input.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    fn file_prompt(&mut self) -> Transition {
        self.phase = PromptPhase::AwaitFile;
        Transition::Suspend(Command::render(Page::FileInput {
            header: self.texts.submit_file_header.clone(),
            accept: self.accept.clone(),
        }))
    }

    fn check(&self, ctx: &FlowContext, location: &str) -> Result<Box<dyn Archive>, ValidationStatus> {
        if !ctx.opener.is_archive(location) {
            return Err(ValidationStatus::Unreadable);
        }
        let archive = ctx.opener.open(location).map_err(|e| {
            warn!(error = e.kind(), "could not open package");
            ValidationStatus::Unreadable
        })?;
        match self.validator.validate(&self.categories, archive.as_ref()) {
            ValidationStatus::Valid => Ok(archive),
            status => Err(status),
        }
    }
}

impl Step for PromptFileStep {
    fn name(&self) -> &str {
        "prompt file"
    }

    fn resume(
        &mut self,
        ctx: &FlowContext,
        state: &mut FlowState,
        response: Option<Payload>,
    ) -> Transition {
        let Some(response) = response else {
            info!(platform = ctx.platform.as_str(), "prompt for file");
            *state = FlowState::Empty;
            return self.file_prompt();
        };

        match (self.phase, response) {
            (PromptPhase::AwaitFile, Payload::String(location)) => {
                match self.check(ctx, &location) {
                    Ok(archive) => {
                        info!(platform = ctx.platform.as_str(), "validation of package was successful");
                        *state = FlowState::Archive(archive);
                        Transition::Complete
                    }
                    Err(status) => {
                        info!(code = status.code(), "package did not pass validation, prompt retry");
                        self.phase = PromptPhase::AwaitRetry;
                        retry_prompt(ctx, &self.texts.retry_header)
                    }
                }
            }
            (PromptPhase::AwaitFile, other) => {
                info!(kind = other.kind(), "skipped at file selection");
                Transition::Complete
            }
            (PromptPhase::AwaitRetry, Payload::True) => self.file_prompt(),
            (PromptPhase::AwaitRetry, _) => {
                info!("skipped during retry flow");
                Transition::Complete
            }
        }
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Turns a validated package into review tables.
///
/// Extractors swallow their own per-table errors and simply leave the
/// failing table out.
pub trait Extractor {
    fn extract(&self, archive: &dyn Archive) -> Vec<Table>;
}

impl<F> Extractor for F
where
    F: Fn(&dyn Archive) -> Vec<Table>,
{
    fn extract(&self, archive: &dyn Archive) -> Vec<Table> {
        self(archive)
    }
}

/// Extraction of one table from a package.
///
/// `Ok(None)` means the package holds no data for this table.
pub trait TableExtractor {
    /// Id of the extracted table.
    fn id(&self) -> &str;

    fn extract(&self, archive: &dyn Archive) -> Result<Option<Table>, DonationError>;
}

/// Runs independent [`TableExtractor`]s on one package.
///
/// A failing extractor is logged and its table left out; the others are
/// unaffected. Tables keep the order of the extractors.
#[derive(Default)]
pub struct TableExtractors {
    parts: Vec<Box<dyn TableExtractor>>,
}

impl TableExtractors {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, part: impl TableExtractor + 'static) -> Self {
        self.parts.push(Box::new(part));
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Extractor for TableExtractors {
    fn extract(&self, archive: &dyn Archive) -> Vec<Table> {
        self.parts
            .iter()
            .filter_map(|part| match part.extract(archive) {
                Ok(Some(table)) if !table.is_empty() => Some(table),
                Ok(_) => {
                    info!(table = part.id(), "no data for table");
                    None
                }
                Err(e) => {
                    warn!(table = part.id(), error = e.kind(), "table extraction failed, omitting it");
                    None
                }
            })
            .collect()
    }
}

/// Runs an [`Extractor`] on the carried archive.
pub struct ExtractStep {
    extractor: Box<dyn Extractor>,
}

impl ExtractStep {
    pub fn new(extractor: impl Extractor + 'static) -> Self {
        Self {
            extractor: Box::new(extractor),
        }
    }
}

impl Step for ExtractStep {
    fn name(&self) -> &str {
        "extract"
    }

    fn resume(
        &mut self,
        ctx: &FlowContext,
        state: &mut FlowState,
        _response: Option<Payload>,
    ) -> Transition {
        let Some(archive) = state.archive() else {
            info!(platform = ctx.platform.as_str(), "no package to extract from");
            return Transition::Complete;
        };

        let tables = self.extractor.extract(archive);
        if tables.is_empty() {
            info!(platform = ctx.platform.as_str(), "no data got extracted");
            *state = FlowState::Empty;
        } else {
            info!(tables = tables.len(), "extracted tables");
            *state = FlowState::Tables(tables);
        }
        Transition::Complete
    }
}

// ============================================================================
// Review and consent
// ============================================================================

#[derive(Debug, Clone)]
pub struct ReviewTexts {
    pub review_data_header: Translatable,
    pub review_data_description: Translatable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewPhase {
    AwaitConsent,
    AwaitAck,
}

/// Payload donated when the participant declines.
pub const DECLINED: &str = r#"{"status":"data_submission declined"}"#;

/// Shows the carried tables for review and donates on consent.
///
/// A JSON consent payload is donated verbatim under
/// `<session id>-<platform key>`. A decline donates [`DECLINED`] under the
/// same key. Anything else donates nothing.
pub struct ReviewStep {
    texts: ReviewTexts,
    phase: ReviewPhase,
}

impl ReviewStep {
    pub fn new(texts: ReviewTexts) -> Self {
        Self {
            texts,
            phase: ReviewPhase::AwaitConsent,
        }
    }
}

impl Step for ReviewStep {
    fn name(&self) -> &str {
        "review"
    }

    fn resume(
        &mut self,
        ctx: &FlowContext,
        state: &mut FlowState,
        response: Option<Payload>,
    ) -> Transition {
        let key = ctx.donation_key();

        let Some(response) = response else {
            let Some(tables) = state.tables().filter(|t| !t.is_empty()) else {
                info!(platform = ctx.platform.as_str(), "nothing to review");
                return Transition::Complete;
            };
            info!(platform = ctx.platform.as_str(), "ask participant to review data");
            self.phase = ReviewPhase::AwaitConsent;
            return Transition::Suspend(Command::render(Page::Review {
                header: self.texts.review_data_header.clone(),
                key,
                description: self.texts.review_data_description.clone(),
                tables: tables.to_vec(),
            }));
        };

        match (self.phase, response) {
            (ReviewPhase::AwaitConsent, Payload::Json(data)) => {
                info!(key = key.as_str(), "donate consent data");
                self.phase = ReviewPhase::AwaitAck;
                Transition::Suspend(Command::donate(key, data))
            }
            (ReviewPhase::AwaitConsent, Payload::False) => {
                info!(key = key.as_str(), "data submission declined");
                self.phase = ReviewPhase::AwaitAck;
                Transition::Suspend(Command::donate(key, DECLINED))
            }
            (ReviewPhase::AwaitConsent, other) => {
                warn!(kind = other.kind(), "unexpected review response");
                Transition::Complete
            }
            (ReviewPhase::AwaitAck, _) => Transition::Complete,
        }
    }
}

// ============================================================================
// Exit
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitPhase {
    Exited,
    Ended,
}

/// Signals success and renders the end page. Always runs last.
#[derive(Debug)]
pub struct ExitStep {
    phase: ExitPhase,
}

impl ExitStep {
    pub fn new() -> Self {
        Self {
            phase: ExitPhase::Exited,
        }
    }
}

impl Default for ExitStep {
    fn default() -> Self {
        Self::new()
    }
}

impl Step for ExitStep {
    fn name(&self) -> &str {
        "exit"
    }

    fn resume(
        &mut self,
        _ctx: &FlowContext,
        _state: &mut FlowState,
        response: Option<Payload>,
    ) -> Transition {
        match (response, self.phase) {
            (None, _) => {
                self.phase = ExitPhase::Exited;
                Transition::Suspend(Command::exit(0, "Success"))
            }
            (Some(_), ExitPhase::Exited) => {
                self.phase = ExitPhase::Ended;
                Transition::Suspend(Command::render(Page::End))
            }
            (Some(_), ExitPhase::Ended) => Transition::Complete,
        }
    }
}
