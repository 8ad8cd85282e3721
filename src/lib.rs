//! # Chatdonate
//!
//! A Rust library for participant-driven data donation: a participant
//! uploads a personal data export, the library extracts a small reviewable
//! selection from it, and only what the participant consents to is donated.
//!
//! ## Overview
//!
//! Chatdonate ships donation flows for:
//! - **WhatsApp** — group chat text exports, turned into anonymized
//!   per-member statistics
//! - **ChatGPT** — `conversations.json` exports, turned into a table of
//!   conversation turns
//! - **TikTok** — plain text activity exports, one table per activity file
//!
//! Packages may be uploaded as ZIP files, unpacked directories or a single
//! chat file.
//!
//! The hard part is the WhatsApp transcript: free-form text in dozens of
//! locale-dependent line formats, with multi-line messages and system
//! notifications that look like messages. The [`chat`] module recovers
//! structured [`Record`]s from it without ever failing the whole flow on a
//! bad line.
//!
//! ## Quick Start
//!
//! ```rust
//! use chatdonate::prelude::*;
//!
//! let export = "\
//! Messages and calls are end-to-end encrypted.
//! [15/01/2024, 10:30:00] Alice: Good morning
//! [15/01/2024, 10:31:12] Bob: Morning!
//! Coffee?
//! [15/01/2024, 10:32:40] Carol: Yes please";
//!
//! let records = remove_empty(ChatParser::new().parse_bytes(export.as_bytes().to_vec())?);
//! assert_eq!(records[1].message, "Morning! Coffee?");
//!
//! let members = ParticipantSet::classify(&records);
//! let mapping = AnonymizationMapping::new(&members.real, "Alice")?;
//! let tables = project(records, &mapping);
//!
//! let json = to_json(&tables)?;
//! assert!(json.contains("This is you (Member 1)"));
//! assert!(!json.contains("Alice"));
//! # Ok::<(), DonationError>(())
//! ```
//!
//! ## Running a Flow
//!
//! Flows are resumable state machines. A driver answers the pages they
//! render:
//!
//! ```rust
//! use chatdonate::prelude::*;
//!
//! let chat = "header\n1/2/21, 10:00 - Ann: hi\n1/2/21, 10:01 - Bob: yo\n1/2/21, 10:02 - Cy: hey";
//! let opener = MemoryOpener::new()
//!     .with_archive("upload", MemoryArchive::new().with_entry("_chat.txt", chat.as_bytes().to_vec()));
//!
//! let mut flow = create_flow(Platform::WhatsApp, FlowConfig::new("1"), ChatConfig::default(), opener);
//! let mut driver = ScriptedDriver::new([
//!     Payload::String("upload".into()),
//!     Payload::String("Cy".into()),
//!     Payload::Json("{}".into()),
//! ]);
//! flow.run_with(&mut driver);
//!
//! assert_eq!(driver.donations, vec![("1-whatsapp-chat".to_string(), "{}".to_string())]);
//! ```
//!
//! ## Module Structure
//!
//! - [`chat`] — Transcript engine
//!   - [`RawTranscript`](chat::RawTranscript), [`GrammarCatalog`](chat::GrammarCatalog), [`ChatParser`](chat::ChatParser)
//!   - [`ParticipantSet`](chat::ParticipantSet), [`AnonymizationMapping`](chat::AnonymizationMapping), [`project`](chat::project)
//! - [`flow`] — Step-based donation flow
//!   - [`DataDonationFlow`](flow::DataDonationFlow), [`Step`](flow::Step), [`Command`](flow::Command), [`Payload`](flow::Payload)
//!   - [`LogSink`](flow::LogSink) — per-session log capture
//! - [`platforms`] — Ready-made WhatsApp, ChatGPT and TikTok flows
//! - [`archive`] — Access to uploaded packages (ZIP, directory, single file)
//! - [`table`] — Reviewable tables
//! - [`output`] / [`format`] — CSV, JSON and JSONL writers
//! - [`config`] — [`ChatConfig`](config::ChatConfig), [`FlowConfig`](config::FlowConfig)
//! - [`error`] — Unified error types ([`DonationError`], [`Result`])
//! - [`prelude`] — Convenient re-exports

pub mod archive;
pub mod chat;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod format;
pub mod output;
pub mod platforms;
pub mod record;
pub mod table;

// Re-export the main types at the crate root for convenience
pub use error::{DonationError, Result};
pub use record::Record;

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use chatdonate::prelude::*;
/// ```
pub mod prelude {
    // Core record type
    pub use crate::Record;
    pub use crate::record::{DateOrder, remove_empty};

    // Error types
    pub use crate::error::{DonationError, Result};

    // Configuration
    pub use crate::config::{ChatConfig, FlowConfig};

    // Transcript engine
    pub use crate::chat::{
        AnonymizationMapping, ChatParser, GrammarCatalog, LineGrammar, ParticipantSet,
        RawTranscript, SummaryRow, project, summarize, summarize_in,
    };

    // Archives
    pub use crate::archive::{
        Archive, ArchiveOpener, DirectoryArchive, FsOpener, MemoryArchive, MemoryOpener,
        ZipArchive,
    };

    // Flow
    pub use crate::flow::{
        Command, DataDonationFlow, Driver, FlowContext, LogSink, Page, Payload, ScriptedDriver,
        Step, TableExtractor, TableExtractors, Transition,
    };

    // Platforms
    pub use crate::platforms::{Platform, create_flow};

    // Tables and output
    pub use crate::format::{OutputFormat, to_format_string, write_to_format};
    #[cfg(feature = "csv-output")]
    pub use crate::output::{to_csv, write_csv};
    pub use crate::output::{to_json, to_jsonl, write_json, write_jsonl};
    pub use crate::table::{Table, Translatable};
}
