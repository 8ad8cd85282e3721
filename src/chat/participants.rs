//! Participant classification.
//!
//! The author group of a line grammar is "everything up to the first colon",
//! so system notifications that happen to contain a colon are read as
//! messages. `Alice changed the subject to "plans: summer"` becomes a message
//! by `Alice changed the subject to "plans`. Recognising every notification in
//! every language is not feasible, so the classifier uses a heuristic: an
//! author name that starts with another author's name followed by a space is
//! a notification artifact.
//!
//! This is best effort. A genuine participant whose name extends another
//! participant's name by a word (`Ann` and `Ann Marie`) is classified as
//! spurious too.

use tracing::debug;

use crate::Record;

/// Distinct authors of a transcript, split into genuine and spurious names.
///
/// Both lists keep the order in which the names first appear in the records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantSet {
    /// Genuine chat participants.
    pub real: Vec<String>,
    /// Artifacts of system lines read as `author: message`.
    pub spurious: Vec<String>,
}

impl ParticipantSet {
    /// Classifies the distinct authors of `records`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatdonate::Record;
    /// use chatdonate::chat::ParticipantSet;
    ///
    /// let records = vec![
    ///     Record::new("", "John", "hi"),
    ///     Record::new("", "John added Alice to the group", " welcome"),
    /// ];
    /// let set = ParticipantSet::classify(&records);
    /// assert_eq!(set.real, vec!["John"]);
    /// assert_eq!(set.spurious, vec!["John added Alice to the group"]);
    /// ```
    pub fn classify(records: &[Record]) -> Self {
        let authors = distinct_authors(records);

        let (spurious, real): (Vec<String>, Vec<String>) = authors
            .iter()
            .cloned()
            .partition(|candidate| is_spurious(candidate, &authors));

        debug!(real = real.len(), spurious = spurious.len(), "classified participants");
        Self { real, spurious }
    }

    /// Returns `true` if `name` is a genuine participant.
    pub fn is_real(&self, name: &str) -> bool {
        self.real.iter().any(|r| r == name)
    }

    /// Returns `true` if there are at least `min_size` genuine participants.
    pub fn is_group_chat(&self, min_size: usize) -> bool {
        self.real.len() >= min_size
    }

    /// Keeps only records written by genuine participants, in order.
    pub fn keep_real(&self, records: Vec<Record>) -> Vec<Record> {
        records
            .into_iter()
            .filter(|r| self.is_real(&r.author))
            .collect()
    }
}

/// Returns the distinct author names in first-seen order.
pub fn distinct_authors(records: &[Record]) -> Vec<String> {
    let mut authors: Vec<String> = Vec::new();
    for record in records {
        if !authors.contains(&record.author) {
            authors.push(record.author.clone());
        }
    }
    authors
}

/// `candidate` is spurious if some other author followed by a space is a prefix of it.
fn is_spurious(candidate: &str, authors: &[String]) -> bool {
    authors.iter().any(|root| {
        root != candidate
            && candidate
                .strip_prefix(root.as_str())
                .is_some_and(|rest| rest.starts_with(' '))
    })
}
