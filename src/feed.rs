//! RSS feed parsing.
//!
//! The feed lists chapters newest first; parsing returns them oldest first.

use crate::error::MangaError;
use crate::models::{Chapter, Manga};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;
use std::fmt::Debug;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Regex for the pagination marker on chapter links, keeping any extension.
static PAGE_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-page-1(\.[A-Za-z0-9]+)?$").unwrap());

/// Parser for a manga's chapter feed.
pub struct FeedParser;

impl FeedParser {
    /// Parses the feed into chapters in ascending order (oldest first).
    ///
    /// A feed without items yields an empty list. Items missing a title or
    /// link are skipped.
    pub fn parse(feed: &str) -> Result<Vec<Chapter>, MangaError> {
        let raw = RawFeed::read(feed)?;
        Ok(raw.into_chapters())
    }

    /// Parses channel-level data along with the chapter list.
    ///
    /// Fails with `ParsingError` when the channel title, link, or image URL
    /// is missing.
    pub fn parse_manga(feed: &str) -> Result<Manga, MangaError> {
        let mut raw = RawFeed::read(feed)?;

        let title = raw.title.take().ok_or_else(|| missing("channel title"))?;
        let link = raw.link.take().ok_or_else(|| missing("channel link"))?;
        let cover = raw.cover.take().ok_or_else(|| missing("channel image"))?;

        Ok(Manga {
            title,
            link,
            cover,
            chapters: raw.into_chapters(),
            description: None,
            start_date: None,
            end_date: None,
        })
    }
}

/// Strips the first-page marker from a chapter link.
pub fn canonical_chapter_url(link: &str) -> String {
    PAGE_SUFFIX_REGEX.replace(link.trim(), "${1}").into_owned()
}

#[derive(Default)]
struct RawItem {
    title: Option<String>,
    link: Option<String>,
}

/// Feed fields in document order.
#[derive(Default)]
struct RawFeed {
    title: Option<String>,
    link: Option<String>,
    cover: Option<String>,
    items: Vec<RawItem>,
}

impl RawFeed {
    fn read(feed: &str) -> Result<Self, MangaError> {
        let mut reader = Reader::from_str(feed);
        reader.config_mut().trim_text(false);

        let mut raw = RawFeed::default();
        let mut stack: Vec<String> = Vec::new();
        let mut current: Option<RawItem> = None;
        let mut text = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let qname = e.name();
                    let name = reader.decoder().decode(qname.as_ref()).map_err(xml_error)?;
                    if name == "item" {
                        current = Some(RawItem::default());
                    }
                    stack.push(name.into_owned());
                    text.clear();
                }
                Ok(Event::End(_)) => {
                    let value = text.trim().to_string();
                    text.clear();
                    raw.assign(&stack, &mut current, value);
                    if stack.pop().as_deref() == Some("item")
                        && let Some(item) = current.take()
                    {
                        raw.items.push(item);
                    }
                }
                Ok(Event::Text(e)) => {
                    text.push_str(&e.decode().map_err(xml_error)?);
                }
                Ok(Event::CData(e)) => {
                    text.push_str(&reader.decoder().decode(&e).map_err(xml_error)?);
                }
                Ok(Event::GeneralRef(e)) => {
                    let entity = format!("&{};", e.decode().map_err(xml_error)?);
                    text.push_str(&quick_xml::escape::unescape(&entity).map_err(xml_error)?);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => return Err(xml_error(err)),
            }
        }

        debug!(items = raw.items.len(), "feed read");
        Ok(raw)
    }

    /// Stores a closed element's text according to where it sits.
    fn assign(&mut self, stack: &[String], current: &mut Option<RawItem>, value: String) {
        if value.is_empty() {
            return;
        }

        let path: Vec<&str> = stack.iter().rev().take(3).map(String::as_str).collect();
        match path.as_slice() {
            ["title", "item", ..] => {
                if let Some(item) = current {
                    item.title = Some(value);
                }
            }
            ["link", "item", ..] => {
                if let Some(item) = current {
                    item.link = Some(value);
                }
            }
            ["title", "channel", ..] if self.title.is_none() => self.title = Some(value),
            ["link", "channel", ..] if self.link.is_none() => self.link = Some(value),
            ["url", "image", "channel"] if self.cover.is_none() => self.cover = Some(value),
            _ => {}
        }
    }

    fn into_chapters(self) -> Vec<Chapter> {
        self.items
            .into_iter()
            .rev()
            .filter_map(|item| match (item.title, item.link) {
                (Some(title), Some(link)) => Some(Chapter::new(title, canonical_chapter_url(&link))),
                (title, _) => {
                    warn!(?title, "skipping feed item without title or link");
                    None
                }
            })
            .collect()
    }
}

fn missing(field: &str) -> MangaError {
    MangaError::ParsingError(format!("feed has no {}", field))
}

fn xml_error(err: impl Debug) -> MangaError {
    MangaError::ParsingError(format!("XML error: {:?}", err))
}
