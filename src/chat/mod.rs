//! Chat transcript engine.
//!
//! Turns the plain text export of a group chat into anonymized per-member
//! summaries:
//!
//! 1. [`RawTranscript`] decodes and cleans the exported lines
//! 2. [`GrammarCatalog`] picks the [`LineGrammar`] that explains the lines
//! 3. [`ChatParser`] rebuilds multi-line messages into [`Record`](crate::Record)s
//! 4. [`ParticipantSet`] separates real members from notification artifacts
//! 5. [`AnonymizationMapping`] and [`project`] replace names with `Member <n>`
//!    and build the review tables
//!
//! # Example
//!
//! ```rust
//! use chatdonate::chat::{AnonymizationMapping, ChatParser, ParticipantSet, project};
//! use chatdonate::record::remove_empty;
//!
//! let export = "\
//! Messages are end-to-end encrypted.
//! 1/2/21, 10:00 - Ann: hi all
//! 1/2/21, 10:01 - Bob: hello
//! 1/2/21, 10:02 - Cy: hey
//! there";
//! let records = remove_empty(ChatParser::new().parse_bytes(export.as_bytes().to_vec())?);
//! let participants = ParticipantSet::classify(&records);
//! assert!(participants.is_group_chat(3));
//!
//! let mapping = AnonymizationMapping::new(&participants.real, "Bob")?;
//! let tables = project(participants.keep_real(records), &mapping);
//! assert_eq!(tables.len(), 3);
//! assert_eq!(tables[0].id, "table_id_Member_1");
//! # Ok::<(), chatdonate::DonationError>(())
//! ```

pub mod anonymize;
pub mod grammar;
pub mod participants;
pub mod reconstruct;
pub mod summary;
pub mod transcript;

pub use anonymize::{AnonymizationMapping, pseudonym};
pub use grammar::{BUILTIN_TEMPLATES, GrammarCatalog, LineGrammar, expand_template};
pub use participants::{ParticipantSet, distinct_authors};
pub use reconstruct::{ChatParser, reconstruct};
pub use summary::{SummaryRow, project, summarize, summarize_in};
pub use transcript::{RawTranscript, clean_line};
