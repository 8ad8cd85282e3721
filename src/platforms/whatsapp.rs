//! WhatsApp group chat donation.
//!
//! The participant uploads a chat export, picks their own name from the list
//! of members, and reviews one summary table per member in which every name
//! is replaced by `Member <n>`.

use tracing::{info, warn};

use crate::archive::{Archive, ArchiveOpener, find_entry};
use crate::chat::{AnonymizationMapping, ChatParser, ParticipantSet, project};
use crate::config::{ChatConfig, FlowConfig};
use crate::error::Result;
use crate::flow::steps::retry_prompt;
use crate::flow::{
    Command, DataDonationFlow, DdpCategory, DdpFiletype, FilePromptTexts, FlowContext, FlowState,
    KnownFilesValidator, Page, Payload, PromptFileStep, ReviewStep, ReviewTexts, Step, Transition,
};
use crate::record::{Record, remove_empty};
use crate::table::{Table, Translatable};

pub const PLATFORM_NAME: &str = "Whatsapp Group Chat";
pub const PLATFORM_KEY: &str = "whatsapp-chat";

/// Entry name patterns of a chat export.
pub const CHAT_FILES: &[&str] = &["_chat.txt", "WhatsApp Chat*.txt", "*.txt"];

pub fn ddp_categories() -> Vec<DdpCategory> {
    vec![DdpCategory::new("txt", DdpFiletype::Txt, CHAT_FILES.iter().copied())]
}

/// Participant-facing texts.
#[derive(Debug, Clone)]
pub struct Texts {
    pub submit_file_header: Translatable,
    pub retry_header: Translatable,
    pub radio_header: Translatable,
    pub radio_description: Translatable,
    pub review_data_header: Translatable,
    pub review_data_description: Translatable,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            submit_file_header: Translatable::en_nl(
                "Select your Whatsapp Group Chat file",
                "Selecteer uw Whatsapp Group Chat bestand",
            ),
            retry_header: Translatable::en_nl("Try again", "Probeer opnieuw"),
            radio_header: Translatable::same("Submit Whatsapp groupchat"),
            radio_description: Translatable::en_nl(
                "Please select your username",
                "Selecteer uw gebruikersnaam",
            ),
            review_data_header: Translatable::en_nl(
                "Your Whatsapp Group Chat data",
                "Uw Whatsapp Group Chat gegevens",
            ),
            review_data_description: Translatable::same(
                "Below you will find a currated selection of Whatsapp Group Chat data.",
            ),
        }
    }
}

/// Reads the chat export of a package and keeps the records of real members.
///
/// Parse failures are logged and yield no records.
pub fn load_chat(archive: &dyn Archive, parser: &ChatParser) -> Result<(Vec<Record>, ParticipantSet)> {
    let entry = find_entry(archive, CHAT_FILES)?;
    let bytes = archive.read_entry(&entry)?;

    let records = remove_empty(parser.parse_or_empty(bytes));
    let participants = ParticipantSet::classify(&records);
    let records = participants.keep_real(records);
    info!(
        records = records.len(),
        members = participants.real.len(),
        "loaded chat"
    );
    Ok((records, participants))
}

/// Anonymizes the chat with `uploader` as `Member 1` and builds the tables.
pub fn summary_tables(
    records: Vec<Record>,
    participants: &ParticipantSet,
    uploader: &str,
) -> Result<Vec<Table>> {
    let mapping = AnonymizationMapping::new(&participants.real, uploader)?;
    Ok(project(records, &mapping))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupChatPhase {
    AwaitRetry,
    AwaitSelection,
}

/// Parses the uploaded chat, asks who the participant is and builds the
/// anonymized summaries.
///
/// An unusable chat (no messages, or fewer members than the configured
/// group size) leads to the retry prompt; confirming it rewinds to the file
/// prompt. Skipping the name selection abandons the donation.
pub struct GroupChatStep {
    texts: Texts,
    parser: ChatParser,
    phase: GroupChatPhase,
    records: Vec<Record>,
    participants: ParticipantSet,
}

impl GroupChatStep {
    pub fn new(texts: Texts, config: ChatConfig) -> Self {
        Self {
            texts,
            parser: ChatParser::with_config(config),
            phase: GroupChatPhase::AwaitSelection,
            records: Vec::new(),
            participants: ParticipantSet::default(),
        }
    }

    fn retry(&mut self, ctx: &FlowContext) -> Transition {
        self.phase = GroupChatPhase::AwaitRetry;
        retry_prompt(ctx, &self.texts.retry_header)
    }

    fn radio_prompt(&mut self) -> Transition {
        self.phase = GroupChatPhase::AwaitSelection;
        Transition::Suspend(Command::render(Page::RadioSelect {
            header: self.texts.radio_header.clone(),
            description: self.texts.radio_description.clone(),
            options: self.participants.real.clone(),
        }))
    }

    fn enter(&mut self, ctx: &FlowContext, state: &mut FlowState) -> Transition {
        let Some(archive) = state.archive() else {
            info!("no chat to parse");
            return Transition::Complete;
        };

        match load_chat(archive, &self.parser) {
            Ok((records, participants)) if records.is_empty() => {
                info!(spurious = participants.spurious.len(), "empty chat, prompt retry");
                self.retry(ctx)
            }
            Ok((records, participants)) => {
                if !participants.is_group_chat(self.parser.config().min_group_size) {
                    info!(members = participants.real.len(), "no group chat, prompt retry");
                    return self.retry(ctx);
                }
                self.records = records;
                self.participants = participants;
                self.radio_prompt()
            }
            Err(e) => {
                warn!(error = e.kind(), "could not read chat, prompt retry");
                self.retry(ctx)
            }
        }
    }
}

impl Step for GroupChatStep {
    fn name(&self) -> &str {
        "group chat"
    }

    fn resume(
        &mut self,
        ctx: &FlowContext,
        state: &mut FlowState,
        response: Option<Payload>,
    ) -> Transition {
        let Some(response) = response else {
            return self.enter(ctx, state);
        };

        match (self.phase, response) {
            (GroupChatPhase::AwaitRetry, Payload::True) => Transition::Rewind,
            (GroupChatPhase::AwaitRetry, _) => {
                info!("skipped during retry flow");
                *state = FlowState::Empty;
                Transition::Complete
            }
            (GroupChatPhase::AwaitSelection, Payload::String(name)) => {
                if !self.participants.is_real(&name) {
                    warn!("selected name is not a member, asking again");
                    return self.radio_prompt();
                }
                let records = std::mem::take(&mut self.records);
                match summary_tables(records, &self.participants, &name) {
                    Ok(tables) if !tables.is_empty() => *state = FlowState::Tables(tables),
                    Ok(_) => *state = FlowState::Empty,
                    Err(e) => {
                        warn!(error = e.kind(), "could not build summaries");
                        *state = FlowState::Empty;
                    }
                }
                Transition::Complete
            }
            (GroupChatPhase::AwaitSelection, other) => {
                info!(kind = other.kind(), "skipped at name selection");
                *state = FlowState::Empty;
                Transition::Complete
            }
        }
    }
}

/// Builds the complete WhatsApp group chat flow.
pub fn create_flow(
    config: FlowConfig,
    chat: ChatConfig,
    opener: impl ArchiveOpener + 'static,
) -> DataDonationFlow {
    let texts = Texts::default();
    let ctx = FlowContext::new(PLATFORM_NAME, PLATFORM_KEY, config, opener);

    DataDonationFlow::new(ctx)
        .add_step(PromptFileStep::new(
            FilePromptTexts {
                submit_file_header: texts.submit_file_header.clone(),
                retry_header: texts.retry_header.clone(),
            },
            ddp_categories(),
            Box::new(KnownFilesValidator),
        ))
        .add_step(GroupChatStep::new(texts.clone(), chat))
        .add_step(ReviewStep::new(ReviewTexts {
            review_data_header: texts.review_data_header.clone(),
            review_data_description: texts.review_data_description.clone(),
        }))
        .with_exit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{MemoryArchive, MemoryOpener};
    use crate::flow::ScriptedDriver;

    const CHAT: &str = "\
Messages and calls are end-to-end encrypted.
1/2/21, 10:00 - Ann: hi all
1/2/21, 10:01 - Bob: hello
how are you
1/2/21, 10:02 - Ann added Dan: to the group
1/2/21, 10:03 - Cy: fine
1/3/21, 09:00 - Bob: good";

    fn archive(text: &str) -> MemoryArchive {
        MemoryArchive::new().with_entry("WhatsApp Chat with Friends.txt", text.as_bytes().to_vec())
    }

    fn flow(opener: MemoryOpener) -> DataDonationFlow {
        create_flow(FlowConfig::new("1"), ChatConfig::default(), opener)
    }

    #[test]
    fn test_load_chat_drops_notifications() {
        let (records, participants) = load_chat(&archive(CHAT), &ChatParser::new()).unwrap();
        assert_eq!(participants.real, vec!["Ann", "Bob", "Cy"]);
        assert_eq!(participants.spurious, vec!["Ann added Dan"]);
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].message, "hello how are you");
    }

    #[test]
    fn test_load_chat_without_txt() {
        let archive = MemoryArchive::new().with_entry("photo.jpg", vec![]);
        let err = load_chat(&archive, &ChatParser::new()).unwrap_err();
        assert!(err.is_no_file_found());
    }

    #[test]
    fn test_full_flow_builds_member_tables() {
        let mut flow = flow(MemoryOpener::new().with_archive("upload", archive(CHAT)));
        let mut driver = ScriptedDriver::new([
            Payload::String("upload".into()),
            Payload::String("Bob".into()),
            Payload::Json("{}".into()),
        ]);
        flow.run_with(&mut driver);

        let tables = driver
            .pages
            .iter()
            .find_map(|p| match p {
                Page::Review { tables, key, .. } => Some((key.clone(), tables.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(tables.0, "1-whatsapp-chat");
        assert_eq!(tables.1.len(), 3);
        assert_eq!(tables.1[0].title.text("en"), Some("This is you (Member 1)"));
        assert_eq!(tables.1[0].cell(1, "Value"), Some("2"));
        assert_eq!(driver.donations_for("1-whatsapp-chat").collect::<Vec<_>>(), vec!["{}"]);
    }

    #[test]
    fn test_two_members_is_not_a_group() {
        let chat = "header\n1/2/21, 10:00 - Ann: hi\n1/2/21, 10:01 - Bob: hello";
        let mut flow = flow(MemoryOpener::new().with_archive("upload", archive(chat)));
        let mut driver = ScriptedDriver::new([
            Payload::String("upload".into()),
            Payload::True,
            Payload::String("upload".into()),
            Payload::False,
        ]);
        flow.run_with(&mut driver);

        let file_prompts = driver.pages.iter().filter(|p| matches!(p, Page::FileInput { .. })).count();
        let retries = driver
            .pages
            .iter()
            .filter(|p| matches!(p, Page::RetryConfirmation { .. }))
            .count();
        assert_eq!(file_prompts, 2);
        assert_eq!(retries, 2);
        assert!(!driver.pages.iter().any(|p| matches!(p, Page::Review { .. })));
    }

    #[test]
    fn test_unknown_name_asks_again() {
        let mut flow = flow(MemoryOpener::new().with_archive("upload", archive(CHAT)));
        let mut driver = ScriptedDriver::new([
            Payload::String("upload".into()),
            Payload::String("Mallory".into()),
            Payload::Void,
        ]);
        flow.run_with(&mut driver);

        let radios = driver
            .pages
            .iter()
            .filter(|p| matches!(p, Page::RadioSelect { .. }))
            .count();
        assert_eq!(radios, 2);
        assert!(!driver.pages.iter().any(|p| matches!(p, Page::Review { .. })));
        assert_eq!(driver.exit, Some((0, "Success".to_string())));
    }

    #[test]
    fn test_unparseable_chat_prompts_retry() {
        let mut flow = flow(MemoryOpener::new().with_archive("upload", archive("just\nsome\nnotes")));
        let mut driver = ScriptedDriver::new([Payload::String("upload".into()), Payload::False]);
        flow.run_with(&mut driver);

        assert!(driver.pages.iter().any(|p| matches!(p, Page::RetryConfirmation { .. })));
        assert!(driver.donations.is_empty());
    }
}
