//! Per-member summary statistics and their review tables.

use tracing::{debug, warn};

use super::anonymize::{AnonymizationMapping, pseudonym};
use crate::Record;
use crate::record::DateOrder;
use crate::table::{Table, Translatable};

const UPLOADER_DESCRIPTION_EN: &str = "In this table you'll see anonymized data of each member in the Whatsapp group chat, including the total number of messages you've sent, the dates of your first and last messages, who responds to you the most, who you respond to the most, and the total number of words you've used.";
const UPLOADER_DESCRIPTION_NL: &str = "In deze tabel zie je geanonimiseerde gegevens van elk lid in de Whatsapp-groepschat, waaronder het totale aantal berichten dat je hebt verstuurd, de data van je eerste en laatste bericht, wie het meest op jou reageert, op wie jij het meest reageert, en het totale aantal woorden dat je hebt gebruikt.";

/// Aggregate statistics for one member of a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub pseudonym: String,
    pub message_count: usize,
    pub first_date: String,
    pub last_date: String,
    /// Most frequent author of the record right after one of this member's.
    pub most_responded_by: Option<String>,
    /// Most frequent author of the record right before one of this member's.
    pub most_responded_to: Option<String>,
    pub word_count: usize,
}

/// Computes the summary of `author` over `records` in transcript order.
///
/// Neighbours written by `author` themselves are not counted as responses.
/// Returns `None` if `author` wrote nothing.
///
/// # Example
///
/// ```rust
/// use chatdonate::Record;
/// use chatdonate::chat::summarize;
///
/// let records = vec![
///     Record::new("21-1-1", "Member 2", "hi"),
///     Record::new("21-1-2", "Member 1", "hello there"),
///     Record::new("21-1-3", "Member 3", "hey"),
/// ];
/// let row = summarize(&records, "Member 1").unwrap();
/// assert_eq!(row.word_count, 2);
/// assert_eq!(row.most_responded_by.as_deref(), Some("Member 3"));
/// assert_eq!(row.most_responded_to.as_deref(), Some("Member 2"));
/// ```
pub fn summarize(records: &[Record], author: &str) -> Option<SummaryRow> {
    summarize_in(records, author, DateOrder::detect(records))
}

/// Like [`summarize`], with the date order of the transcript already known.
pub fn summarize_in(records: &[Record], author: &str, order: DateOrder) -> Option<SummaryRow> {
    let mut message_count = 0;
    let mut word_count = 0;
    let mut dates: Vec<String> = Vec::new();
    let mut responded_by: Vec<&str> = Vec::new();
    let mut responded_to: Vec<&str> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        if record.author != author {
            continue;
        }
        message_count += 1;
        word_count += record.word_count();
        dates.push(order.key(record));

        if let Some(next) = records.get(i + 1).filter(|n| n.author != author) {
            responded_by.push(&next.author);
        }
        if let Some(prev) = i
            .checked_sub(1)
            .map(|p| &records[p])
            .filter(|p| p.author != author)
        {
            responded_to.push(&prev.author);
        }
    }

    if message_count == 0 {
        return None;
    }

    Some(SummaryRow {
        pseudonym: author.to_string(),
        message_count,
        first_date: dates.iter().min().cloned().unwrap_or_default(),
        last_date: dates.iter().max().cloned().unwrap_or_default(),
        most_responded_by: mode(&responded_by),
        most_responded_to: mode(&responded_to),
        word_count,
    })
}

/// Most frequent value; ties go to the value seen first.
fn mode(values: &[&str]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, n) in counts {
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((value, n));
        }
    }
    best.map(|(v, _)| v.to_string())
}

impl SummaryRow {
    /// Returns the review table id for this member, e.g. `table_id_Member_1`.
    pub fn table_id(&self) -> String {
        format!("table_id_{}", self.pseudonym.replace(' ', "_"))
    }

    /// Returns `true` if this is the summary of the uploading participant.
    pub fn is_uploader(&self) -> bool {
        self.pseudonym == pseudonym(1)
    }

    /// Renders the summary as a two-column `Description`/`Value` table.
    pub fn to_table(&self) -> Table {
        let title = if self.is_uploader() {
            Translatable::same(format!("This is you ({})", self.pseudonym))
        } else {
            Translatable::same(self.pseudonym.clone())
        };

        let mut table = Table::new(self.table_id(), title, ["Description", "Value"]);
        table.push_row(["Number of words".to_string(), self.word_count.to_string()]);
        table.push_row([
            "Number of messages".to_string(),
            self.message_count.to_string(),
        ]);
        table.push_row(["Date of first message".to_string(), self.first_date.clone()]);
        table.push_row(["Date of last message".to_string(), self.last_date.clone()]);
        table.push_row([
            "Who responds to you the most?".to_string(),
            self.most_responded_by.clone().unwrap_or_default(),
        ]);
        table.push_row([
            "Who do you respond to the most?".to_string(),
            self.most_responded_to.clone().unwrap_or_default(),
        ]);

        if self.is_uploader() {
            table = table.with_description(Translatable::en_nl(
                UPLOADER_DESCRIPTION_EN,
                UPLOADER_DESCRIPTION_NL,
            ));
        }
        table
    }
}

/// Anonymizes `records` and builds one summary table per member.
///
/// Tables come in pseudonym order. Members without records get no table.
pub fn project(records: Vec<Record>, mapping: &AnonymizationMapping) -> Vec<Table> {
    let anonymized = mapping.apply(records);
    let order = DateOrder::detect(&anonymized);
    debug!(?order, "detected date order");

    let tables: Vec<Table> = mapping
        .pseudonyms()
        .filter_map(|member| match summarize_in(&anonymized, member, order) {
            Some(row) => Some(row.to_table()),
            None => {
                warn!(member, "member has no messages, omitting summary table");
                None
            }
        })
        .collect();

    debug!(tables = tables.len(), "projected member summaries");
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(lines: &[(&str, &str, &str)]) -> Vec<Record> {
        lines
            .iter()
            .map(|(d, a, m)| Record::new(*d, *a, *m))
            .collect()
    }

    #[test]
    fn test_counts_and_dates() {
        let records = chat(&[
            ("21-3-2", "A", "one two"),
            ("21-1-15", "B", "x"),
            ("21-1-9", "A", "three"),
        ]);
        let row = summarize(&records, "A").unwrap();
        assert_eq!(row.message_count, 2);
        assert_eq!(row.word_count, 3);
        assert_eq!(row.first_date, "2021-01-09");
        assert_eq!(row.last_date, "2021-03-02");
    }

    #[test]
    fn test_day_first_dates() {
        // 05/01/24 .. 21/01/24 read by a month-first grammar
        let records = chat(&[
            ("24-05-01", "A", "a"),
            ("24-12-01", "B", "b"),
            ("24-21-01", "A", "c"),
        ]);
        let row = summarize(&records, "A").unwrap();
        assert_eq!(row.first_date, "2024-01-05");
        assert_eq!(row.last_date, "2024-01-21");
    }

    #[test]
    fn test_unparseable_dates_compare_raw() {
        let records = chat(&[("24-1-9", "A", "a"), ("[x--", "A", "b"), ("24-1-10", "A", "c")]);
        let row = summarize(&records, "A").unwrap();
        assert_eq!(row.first_date, "24-1-10");
        assert_eq!(row.last_date, "[x--");
    }

    #[test]
    fn test_self_replies_are_ignored() {
        let records = chat(&[
            ("21-1-1", "A", "a"),
            ("21-1-1", "A", "b"),
            ("21-1-1", "B", "c"),
            ("21-1-1", "A", "d"),
        ]);
        let row = summarize(&records, "A").unwrap();
        assert_eq!(row.most_responded_by.as_deref(), Some("B"));
        assert_eq!(row.most_responded_to.as_deref(), Some("B"));
    }

    #[test]
    fn test_lonely_author_has_no_respondents() {
        let records = chat(&[("21-1-1", "A", "a"), ("21-1-2", "A", "b")]);
        let row = summarize(&records, "A").unwrap();
        assert_eq!(row.most_responded_by, None);
        assert_eq!(row.most_responded_to, None);
    }

    #[test]
    fn test_mode_ties_go_to_first_seen() {
        assert_eq!(mode(&["C", "B", "B", "C"]).as_deref(), Some("C"));
        assert_eq!(mode(&["C", "B", "B"]).as_deref(), Some("B"));
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn test_absent_author() {
        let records = chat(&[("21-1-1", "A", "a")]);
        assert!(summarize(&records, "Z").is_none());
    }

    #[test]
    fn test_uploader_table_has_description() {
        let records = chat(&[("21-1-1", "Member 1", "a"), ("21-1-2", "Member 2", "b")]);
        let table = summarize(&records, "Member 1").unwrap().to_table();
        assert_eq!(table.id, "table_id_Member_1");
        assert_eq!(table.title.text("en"), Some("This is you (Member 1)"));
        assert!(table.description.is_some());
        assert_eq!(table.cell(1, "Value"), Some("1"));
        assert_eq!(table.cell(4, "Description"), Some("Who responds to you the most?"));
        assert_eq!(table.cell(4, "Value"), Some("Member 2"));

        let other = summarize(&records, "Member 2").unwrap().to_table();
        assert_eq!(other.title.text("nl"), Some("Member 2"));
        assert!(other.description.is_none());
    }

    #[test]
    fn test_project_one_table_per_member() {
        let names: Vec<String> = ["Ann", "Bob", "Cy"].iter().map(|s| s.to_string()).collect();
        let mapping = AnonymizationMapping::new(&names, "Bob").unwrap();
        let records = chat(&[
            ("21-1-1", "Ann", "hi"),
            ("21-1-1", "Bob", "hey"),
            ("21-1-1", "Cy", "yo"),
            ("21-1-2", "Bob", "bye all"),
        ]);
        let tables = project(records, &mapping);
        let ids: Vec<&str> = tables.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["table_id_Member_1", "table_id_Member_2", "table_id_Member_3"]);
        assert_eq!(tables[0].cell(1, "Value"), Some("2"));
        assert!(
            tables
                .iter()
                .flat_map(|t| t.rows.iter().flatten())
                .all(|cell| !["Ann", "Bob", "Cy"].contains(&cell.as_str()))
        );
    }

    #[test]
    fn test_project_skips_silent_members() {
        let names: Vec<String> = ["Ann", "Bob", "Cy"].iter().map(|s| s.to_string()).collect();
        let mapping = AnonymizationMapping::new(&names, "Ann").unwrap();
        let records = chat(&[("21-1-1", "Ann", "hi"), ("21-1-1", "Bob", "hey")]);
        assert_eq!(project(records, &mapping).len(), 2);
    }
}
