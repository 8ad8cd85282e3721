//! TikTok activity donation.
//!
//! A TikTok export is a set of plain text files in which every item is a
//! block of `Key: value` lines. Each file becomes its own review table; a
//! file that is missing or unreadable only loses its own table.

use regex::Regex;

use crate::archive::{Archive, ArchiveOpener, find_entry, read_text};
use crate::config::FlowConfig;
use crate::error::{DonationError, Result};
use crate::flow::{
    DataDonationFlow, DdpCategory, DdpFiletype, ExtractStep, Extractor, FilePromptTexts,
    FlowContext, KnownFilesValidator, PromptFileStep, ReviewStep, ReviewTexts, TableExtractor,
    TableExtractors,
};
use crate::table::{Table, Translatable};

pub const PLATFORM_NAME: &str = "TikTok";
pub const PLATFORM_KEY: &str = "tiktok";

/// Files of an English TikTok text export.
pub const KNOWN_FILES: &[&str] = &[
    "Transaction History.txt",
    "Most Recent Location Data.txt",
    "Comments.txt",
    "Purchases.txt",
    "Share History.txt",
    "Favorite Sounds.txt",
    "Searches.txt",
    "Login History.txt",
    "Favorite Videos.txt",
    "Favorite HashTags.txt",
    "Hashtag.txt",
    "Location Reviews.txt",
    "Favorite Effects.txt",
    "Following.txt",
    "Status.txt",
    "Browsing History.txt",
    "Like List.txt",
    "Follower.txt",
    "Watch Live settings.txt",
    "Go Live settings.txt",
    "Go Live History.txt",
    "Watch Live History.txt",
    "Profile Info.txt",
    "Autofill.txt",
    "Post.txt",
    "Block List.txt",
    "Settings.txt",
    "Customer support history.txt",
    "Communication with shops.txt",
    "Current Payment Information.txt",
    "Returns and Refunds History.txt",
    "Product Reviews.txt",
    "Order History.txt",
    "Vouchers.txt",
    "Saved Address Information.txt",
    "Order dispute history.txt",
    "Product Browsing History.txt",
    "Shopping Cart List.txt",
    "Direct Messages.txt",
    "Off TikTok Activity.txt",
    "Ad Interests.txt",
];

pub fn ddp_categories() -> Vec<DdpCategory> {
    vec![DdpCategory::new("txt_en", DdpFiletype::Txt, KNOWN_FILES.iter().copied())]
}

/// Reads one export file with Windows line endings normalized.
fn read_file(archive: &dyn Archive, file: &str) -> Result<String> {
    let entry = find_entry(archive, &[file])?;
    Ok(read_text(archive, &entry)?.replace("\r\n", "\n"))
}

/// A file whose blocks become table rows.
#[derive(Debug, Clone)]
pub struct BlockTable {
    pub id: &'static str,
    pub file: &'static str,
    pub title: Translatable,
    pub description: Translatable,
    pub columns: &'static [&'static str],
    /// Multi-line pattern with one capture group per column.
    pub pattern: &'static str,
}

impl TableExtractor for BlockTable {
    fn id(&self) -> &str {
        self.id
    }

    fn extract(&self, archive: &dyn Archive) -> Result<Option<Table>> {
        let text = read_file(archive, self.file)?;
        let pattern = Regex::new(self.pattern)
            .map_err(|e| DonationError::invalid_format("TikTok block", e.to_string()))?;

        let mut table = Table::new(self.id, self.title.clone(), self.columns.iter().copied())
            .with_description(self.description.clone());
        for caps in pattern.captures_iter(&text) {
            table.push_row(
                caps.iter()
                    .skip(1)
                    .map(|m| m.map_or("", |m| m.as_str().trim())),
            );
        }
        Ok((!table.is_empty()).then_some(table))
    }
}

/// Interests picked when the account was created, one per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterestsTable;

impl TableExtractor for InterestsTable {
    fn id(&self) -> &str {
        "tiktok_settings"
    }

    fn extract(&self, archive: &dyn Archive) -> Result<Option<Table>> {
        let text = read_file(archive, "Settings.txt")?;
        let Some(interests) = text.lines().find_map(|l| l.strip_prefix("Interests: ")) else {
            return Ok(None);
        };

        let mut table = Table::new(
            self.id(),
            Translatable::en_nl("Interests on TikTok", "Interesses op TikTok"),
            ["Interesses"],
        )
        .with_description(Translatable::en_nl(
            "Below you will find the interests you selected when creating your TikTok account",
            "Hieronder vind je de interesses die je hebt aangevinkt bij het aanmaken van je TikTok account",
        ));
        for interest in interests.split('|').map(str::trim).filter(|i| !i.is_empty()) {
            table.push_row([interest]);
        }
        Ok(Some(table))
    }
}

fn date_and_link(id: &'static str, file: &'static str, columns: &'static [&'static str]) -> BlockTable {
    BlockTable {
        id,
        file,
        title: Translatable::new(),
        description: Translatable::new(),
        columns,
        pattern: r"(?m)^Date: (.*?)\nLink: (.*?)$",
    }
}

/// The tables extracted from a TikTok export, in review order.
pub fn extractors() -> TableExtractors {
    TableExtractors::new()
        .with(BlockTable {
            title: Translatable::en_nl("Watch history", "Kijkgeschiedenis"),
            description: Translatable::en_nl(
                "The table below indicates exactly which TikTok videos you have watched and when that was.",
                "De tabel hieronder geeft aan welke TikTok video's je precies hebt bekeken en wanneer dat was.",
            ),
            ..date_and_link(
                "tiktok_video_browsing_history",
                "Browsing History.txt",
                &["Time and Date", "Video watched"],
            )
        })
        .with(BlockTable {
            title: Translatable::en_nl("Favorite video's", "Favoriete video's"),
            description: Translatable::same(
                "In de tabel hieronder vind je de video's die tot je favorieten behoren.",
            ),
            ..date_and_link("tiktok_favorite_videos", "Favorite Videos.txt", &["Tijdstip", "Video"])
        })
        .with(BlockTable {
            id: "tiktok_favorite_hashtags",
            file: "Favorite HashTags.txt",
            title: Translatable::en_nl("Favorite hashtags", "Favoriete hashtags"),
            description: Translatable::en_nl(
                "In the table below, you will find the hashtags that are among your favorites.",
                "In de tabel hieronder vind je de hashtags die tot je favorieten behoren.",
            ),
            columns: &["Tijdstip", "Hashtag url"],
            pattern: r"(?m)^Date: (.*?)\nHashTag Link::? (.*?)$",
        })
        .with(BlockTable {
            id: "tiktok_hashtag",
            file: "Hashtag.txt",
            title: Translatable::same("Hashtags in video's die je hebt geplaatst"),
            description: Translatable::same(
                "In de tabel hieronder vind je de hashtags die je gebruikt hebt in een video die je hebt geplaats op TikTok.",
            ),
            columns: &["Hashtag naam", "Hashtag url"],
            pattern: r"(?m)^Hashtag Name: (.*?)\nHashtag Link: (.*?)$",
        })
        .with(BlockTable {
            title: Translatable::en_nl("Videos you have liked", "Video's die je hebt geliket"),
            description: Translatable::en_nl(
                "In the table below, you will find the videos you have liked and when that was.",
                "In de tabel hieronder vind je de video's die je hebt geliket en wanneer dat was.",
            ),
            ..date_and_link("tiktok_like_list", "Like List.txt", &["Tijdstip", "Video"])
        })
        .with(BlockTable {
            id: "tiktok_searches",
            file: "Searches.txt",
            title: Translatable::en_nl("Search terms", "Zoektermen"),
            description: Translatable::en_nl(
                "The table below shows what you have searched for and when.",
                "De tabel hieronder laat zien wat je hebt gezocht en wanneer dat was.",
            ),
            columns: &["Tijdstip", "Zoekterm"],
            pattern: r"(?m)^Date: (.*?)\nSearch Term: (.*?)$",
        })
        .with(BlockTable {
            id: "tiktok_share_history",
            file: "Share History.txt",
            title: Translatable::en_nl("Shared videos", "Gedeelde video's"),
            description: Translatable::en_nl(
                "The table below shows what you have shared, at what time, and how.",
                "In de tabel hieronder vind je wat je hebt gedeeld, op welk tijdstip en de manier waarop.",
            ),
            columns: &["Tijdstip", "Gedeelde inhoud", "Url", "Gedeeld via"],
            pattern: r"(?m)^Date: (.*?)\nShared Content: (.*?)\nLink: (.*?)\nMethod: (.*?)$",
        })
        .with(InterestsTable)
}

/// Extracts every table a TikTok package has data for.
pub fn extract(archive: &dyn Archive) -> Vec<Table> {
    extractors().extract(archive)
}

/// Builds the complete TikTok flow.
pub fn create_flow(config: FlowConfig, opener: impl ArchiveOpener + 'static) -> DataDonationFlow {
    let ctx = FlowContext::new(PLATFORM_NAME, PLATFORM_KEY, config, opener);

    DataDonationFlow::new(ctx)
        .add_step(PromptFileStep::new(
            FilePromptTexts {
                submit_file_header: Translatable::en_nl(
                    "Select your TikTok file",
                    "Selecteer uw TikTok bestand",
                ),
                retry_header: Translatable::en_nl("Try again", "Probeer opnieuw"),
            },
            ddp_categories(),
            Box::new(KnownFilesValidator),
        ))
        .add_step(ExtractStep::new(extractors()))
        .add_step(ReviewStep::new(ReviewTexts {
            review_data_header: Translatable::en_nl("Your TikTok data", "Uw TikTok gegevens"),
            review_data_description: Translatable::en_nl(
                "Below you will find a selection of your TikTok data.",
                "Hieronder vindt u een geselecteerde weergave van uw TikTok-gegevens.",
            ),
        }))
        .with_exit()
}
