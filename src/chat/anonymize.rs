//! Pseudonymization of chat participants.
//!
//! The uploading participant is always `Member 1`. Everybody else is numbered
//! from `Member 2` in the order given to [`AnonymizationMapping::new`], which
//! for a classified transcript is the order in which they first wrote.

use std::collections::HashMap;

use tracing::debug;

use crate::Record;
use crate::error::{DonationError, Result};

/// Returns the pseudonym for a 1-based member number.
pub fn pseudonym(number: usize) -> String {
    format!("Member {number}")
}

/// Bijection from participant names to `Member <n>` pseudonyms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymizationMapping {
    /// `(name, pseudonym)` pairs in pseudonym order.
    pairs: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl AnonymizationMapping {
    /// Builds the mapping for `participants` with `uploader` as `Member 1`.
    ///
    /// Duplicate names in `participants` are ignored. Fails if the uploader
    /// is not one of the participants.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatdonate::chat::AnonymizationMapping;
    ///
    /// let names = ["Carol", "Alice", "Bob"].map(String::from);
    /// let mapping = AnonymizationMapping::new(&names, "Alice")?;
    ///
    /// assert_eq!(mapping.pseudonym_of("Alice"), Some("Member 1"));
    /// assert_eq!(mapping.pseudonym_of("Carol"), Some("Member 2"));
    /// assert_eq!(mapping.pseudonym_of("Bob"), Some("Member 3"));
    /// # Ok::<(), chatdonate::DonationError>(())
    /// ```
    pub fn new(participants: &[String], uploader: &str) -> Result<Self> {
        if !participants.iter().any(|p| p == uploader) {
            return Err(DonationError::unknown_participant(uploader));
        }

        let uploader = uploader.to_string();
        let others = participants.iter().filter(|p| **p != uploader);
        let mut mapping = Self {
            pairs: Vec::with_capacity(participants.len()),
            index: HashMap::with_capacity(participants.len()),
        };
        for name in std::iter::once(&uploader).chain(others) {
            if !mapping.index.contains_key(name) {
                mapping.index.insert(name.clone(), mapping.pairs.len());
                mapping
                    .pairs
                    .push((name.clone(), pseudonym(mapping.pairs.len() + 1)));
            }
        }

        debug!(members = mapping.len(), "built anonymization mapping");
        Ok(mapping)
    }

    /// Returns the pseudonym of a participant.
    pub fn pseudonym_of(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.pairs[i].1.as_str())
    }

    /// Returns all pseudonyms, `Member 1` first.
    pub fn pseudonyms(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(_, p)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Replaces every known author by its pseudonym.
    ///
    /// Record count, order and the other fields are unchanged. Each author
    /// is looked up once by its original name, so pseudonyms never chain
    /// within one call. Authors that are not in the mapping are left as they
    /// are, so applying the mapping to already anonymized records is a no-op
    /// unless a real participant is literally named `Member <n>`.
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        records
            .into_iter()
            .map(|mut record| {
                if let Some(alias) = self.pseudonym_of(&record.author) {
                    record.author = alias.to_string();
                }
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_uploader_is_member_one() {
        let mapping = AnonymizationMapping::new(&names(&["A", "B", "C"]), "C").unwrap();
        assert_eq!(mapping.pseudonym_of("C"), Some("Member 1"));
        assert_eq!(mapping.pseudonym_of("A"), Some("Member 2"));
        assert_eq!(mapping.pseudonym_of("B"), Some("Member 3"));
        assert_eq!(
            mapping.pseudonyms().collect::<Vec<_>>(),
            vec!["Member 1", "Member 2", "Member 3"]
        );
    }

    #[test]
    fn test_unknown_uploader_is_rejected() {
        let err = AnonymizationMapping::new(&names(&["A", "B"]), "Z").unwrap_err();
        assert!(err.to_string().contains('Z'));
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let mapping = AnonymizationMapping::new(&names(&["A", "B", "A"]), "B").unwrap();
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_apply_rewrites_authors_only() {
        let mapping = AnonymizationMapping::new(&names(&["Alice", "Bob"]), "Bob").unwrap();
        let records = vec![
            Record::new("21-1-1", "Alice", "hi Bob"),
            Record::new("21-1-2", "Bob", "hi"),
        ];
        let anonymized = mapping.apply(records);
        assert_eq!(anonymized[0], Record::new("21-1-1", "Member 2", "hi Bob"));
        assert_eq!(anonymized[1], Record::new("21-1-2", "Member 1", "hi"));
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let mapping = AnonymizationMapping::new(&names(&["Alice", "Bob", "Cy"]), "Cy").unwrap();
        let records = vec![
            Record::new("1", "Alice", "a"),
            Record::new("2", "Cy", "b"),
            Record::new("3", "Bob", "c"),
        ];
        let once = mapping.apply(records);
        let twice = mapping.apply(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_participant_named_like_a_pseudonym() {
        let mapping = AnonymizationMapping::new(&names(&["Alice", "Member 1"]), "Alice").unwrap();
        let records = vec![
            Record::new("1", "Member 1", "a"),
            Record::new("2", "Alice", "b"),
        ];

        let once = mapping.apply(records);
        let authors: Vec<&str> = once.iter().map(|r| r.author.as_str()).collect();
        assert_eq!(authors, vec!["Member 2", "Member 1"]);

        let twice = mapping.apply(once.clone());
        assert_ne!(once, twice);
    }
}
