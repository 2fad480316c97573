//! Chapter page analysis.
//!
//! The chapter page assigns the chapter state and the image host in inline
//! script. Both values are lifted out with regular expressions over the raw
//! page text; no DOM or script evaluation is involved.

use crate::error::MangaError;
use crate::models::ChapterPageInfo;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::LazyLock;

/// Regex for the current chapter object literal.
static CURRENT_CHAPTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)vm\.CurChapter\s*=\s*(\{[^}]*\});").unwrap());

/// Regex for the image host path string.
static CURRENT_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"vm\.CurPathName\s*=\s*"([^"]*)";"#).unwrap());

/// Fields of the current chapter object that are used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CurrentChapter {
    #[serde(default)]
    directory: Option<String>,
    #[serde(default)]
    page: Option<JsonValue>,
}

/// Extracts page count, directory, and image host from chapter page HTML.
pub struct ChapterPageAnalyzer;

impl ChapterPageAnalyzer {
    /// Analyzes the raw chapter page.
    ///
    /// A missing `Directory` is treated as empty and a missing `Page` as zero
    /// pages. A missing chapter object, malformed JSON, an unusable `Page`,
    /// or a missing host path fails with `ChapterError`.
    pub fn analyze(page: &str) -> Result<ChapterPageInfo, MangaError> {
        let chapter_json = CURRENT_CHAPTER_REGEX
            .captures(page)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| MangaError::ChapterError("current chapter data not found".to_string()))?;

        let current: CurrentChapter = serde_json::from_str(chapter_json).map_err(|e| {
            MangaError::ChapterError(format!("malformed current chapter data: {}", e))
        })?;

        let image_host_path = CURRENT_PATH_REGEX
            .captures(page)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| MangaError::ChapterError("image host path not found".to_string()))?;

        let page_count = match current.page {
            None | Some(JsonValue::Null) => 0,
            Some(value) => parse_page_count(&value)?,
        };

        Ok(ChapterPageInfo {
            page_count,
            directory: current.directory.unwrap_or_default(),
            image_host_path,
        })
    }
}

/// Accepts a page count given as a JSON number or a numeric string.
fn parse_page_count(value: &JsonValue) -> Result<u32, MangaError> {
    let count = match value {
        JsonValue::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        JsonValue::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };

    count.ok_or_else(|| MangaError::ChapterError(format!("invalid page count: {}", value)))
}
