//! Data types for manga, chapters, and chapter page state.

use crate::error::MangaError;
use chrono::NaiveDate;
use std::fmt;

/// A single chapter as listed in the manga feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Display name with the chapter number as its last word, e.g. "Bleach Chapter 1.5".
    pub name: String,

    /// Canonical chapter page URL (pagination suffix removed).
    pub url: String,
}

impl Chapter {
    /// Creates a chapter from feed fields.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// The manga-name portion of the display name, hyphen-joined.
    ///
    /// Takes the whitespace- or hyphen-delimited words up to the first word
    /// containing "chapter" (any case). Word casing is preserved.
    pub fn slug(&self) -> String {
        self.words()
            .take_while(|word| !word.to_lowercase().contains("chapter"))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// The chapter number parsed from the last word of the display name.
    pub fn number(&self) -> Result<ChapterNumber, MangaError> {
        let token = self.words().last().ok_or_else(|| {
            MangaError::ChapterError("chapter name is empty".to_string())
        })?;
        ChapterNumber::parse(token).ok_or_else(|| {
            MangaError::ChapterError(format!("no chapter number in '{}'", self.name))
        })
    }

    /// Returns true when the chapter number equals `number`, whole or not.
    pub fn has_number(&self, number: ChapterNumber) -> bool {
        self.number().is_ok_and(|n| n.value() == number.value())
    }

    /// Non-empty words of the display name, split on whitespace and hyphens.
    fn words(&self) -> impl Iterator<Item = &str> {
        self.name
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|word| !word.is_empty())
    }
}

/// A chapter number, whole or fractional.
///
/// The distinction selects the zero-padding used in image file names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChapterNumber {
    Whole(u64),
    Fractional(f64),
}

impl ChapterNumber {
    /// Parses "12" as whole and "12.5" as fractional.
    pub fn parse(token: &str) -> Option<Self> {
        if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
            return token.parse().ok().map(ChapterNumber::Whole);
        }

        token
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(ChapterNumber::Fractional)
    }

    /// The number as a float, for comparing whole and fractional forms.
    pub fn value(&self) -> f64 {
        match self {
            ChapterNumber::Whole(n) => *n as f64,
            ChapterNumber::Fractional(n) => *n,
        }
    }

    /// Returns true for whole chapter numbers.
    pub fn is_whole(&self) -> bool {
        matches!(self, ChapterNumber::Whole(_))
    }
}

impl fmt::Display for ChapterNumber {
    /// Formats the zero-padded file name component: `0004` or `0004.5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChapterNumber::Whole(n) => write!(f, "{:04}", n),
            ChapterNumber::Fractional(n) => write!(f, "{:06.1}", n),
        }
    }
}

/// State lifted from a chapter page's inline script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPageInfo {
    /// Number of pages (images) in the chapter.
    pub page_count: u32,

    /// Optional subdirectory on the image host; empty when absent.
    pub directory: String,

    /// Hostname and path fragment of the image host.
    pub image_host_path: String,
}

/// Manga-level information read from the feed channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Manga {
    pub title: String,
    pub link: String,
    pub cover: String,
    /// Chapters in ascending order, oldest first.
    pub chapters: Vec<Chapter>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Manga {
    /// Copies the metadata fields onto this manga.
    pub fn enrich(&mut self, metadata: MangaMetadata) {
        self.description = metadata.description;
        self.start_date = metadata.start_date;
        self.end_date = metadata.end_date;
    }
}

/// Fields consumed from the secondary metadata lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MangaMetadata {
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(name: &str) -> Chapter {
        Chapter::new(name, "https://example.com/read-online/x")
    }

    #[test]
    fn test_slug() {
        assert_eq!(
            chapter("Bleach Bankai Stories Chapter 1").slug(),
            "Bleach-Bankai-Stories"
        );
        assert_eq!(chapter("Bleach Chapter 1.5").slug(), "Bleach");
    }

    #[test]
    fn test_slug_hyphens_and_case() {
        assert_eq!(chapter("Spider-Man chapter 3").slug(), "Spider-Man");
        assert_eq!(chapter("one  piece CHAPTER 1000").slug(), "one-piece");
        assert_eq!(chapter("Kaguya-sama Chapter-12").slug(), "Kaguya-sama");
    }

    #[test]
    fn test_slug_without_chapter_word() {
        assert_eq!(chapter("Oneshot 1").slug(), "Oneshot-1");
    }

    #[test]
    fn test_number_whole_and_fractional() {
        assert_eq!(chapter("Bleach Chapter 12").number().unwrap(), ChapterNumber::Whole(12));
        assert_eq!(
            chapter("Bleach Chapter 12.5").number().unwrap(),
            ChapterNumber::Fractional(12.5)
        );
        assert!(chapter("Bleach Chapter 12").number().unwrap().is_whole());
    }

    #[test]
    fn test_number_missing() {
        assert!(matches!(
            chapter("Bleach Chapter Final").number(),
            Err(MangaError::ChapterError(_))
        ));
        assert!(matches!(
            chapter("   ").number(),
            Err(MangaError::ChapterError(_))
        ));
    }

    #[test]
    fn test_number_after_hyphen() {
        let hyphenated = chapter("Bleach Chapter-12");
        assert_eq!(hyphenated.slug(), "Bleach");
        assert_eq!(hyphenated.number().unwrap(), ChapterNumber::Whole(12));
    }

    #[test]
    fn test_number_beyond_u32() {
        assert_eq!(
            chapter("Bleach Chapter 99999999999").number().unwrap(),
            ChapterNumber::Whole(99_999_999_999)
        );
        assert_eq!(ChapterNumber::Whole(99_999_999_999).to_string(), "99999999999");
    }

    #[test]
    fn test_has_number() {
        assert!(chapter("Bleach Chapter 4.5").has_number(ChapterNumber::Fractional(4.5)));
        assert!(chapter("Bleach Chapter 4").has_number(ChapterNumber::Fractional(4.0)));
        assert!(chapter("Bleach Chapter 4").has_number(ChapterNumber::Whole(4)));
        assert!(!chapter("Bleach Chapter 4.5").has_number(ChapterNumber::Whole(4)));
        assert!(!chapter("Bleach Chapter Final").has_number(ChapterNumber::Whole(4)));
    }

    #[test]
    fn test_number_padding() {
        assert_eq!(ChapterNumber::Whole(4).to_string(), "0004");
        assert_eq!(ChapterNumber::Whole(1234).to_string(), "1234");
        assert_eq!(ChapterNumber::Fractional(4.5).to_string(), "0004.5");
        assert_eq!(ChapterNumber::Fractional(123.5).to_string(), "0123.5");
    }

    #[test]
    fn test_enrich() {
        let mut manga = Manga {
            title: "Naruto".to_string(),
            link: "https://mangasee123.com/manga/Naruto".to_string(),
            cover: "https://cover/naruto.jpg".to_string(),
            chapters: Vec::new(),
            description: None,
            start_date: None,
            end_date: None,
        };
        manga.enrich(MangaMetadata {
            description: Some("Ninja".to_string()),
            start_date: NaiveDate::from_ymd_opt(1999, 9, 21),
            end_date: None,
        });
        assert_eq!(manga.description.as_deref(), Some("Ninja"));
        assert_eq!(manga.start_date, NaiveDate::from_ymd_opt(1999, 9, 21));
    }
}
