//! Resolves a manga name to its feed and chapter list.

use crate::error::MangaError;
use crate::feed::FeedParser;
use crate::http::HttpClient;
use crate::metadata::MetadataLookup;
use crate::models::{Chapter, Manga};
use crate::utils::{ensure_found, normalize_manga_name};
use tracing::{info, instrument, warn};

/// Finds the chapters of a manga through its RSS feed.
///
/// Every call fetches the feed again.
pub struct ChapterLocator<'a> {
    client: &'a dyn HttpClient,
    base_url: String,
}

impl<'a> ChapterLocator<'a> {
    pub fn new(client: &'a dyn HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Feed URL for a manga name: `{base_url}/rss/{Normalized-Name}.xml`.
    pub fn feed_url(&self, name: &str) -> String {
        format!(
            "{}/rss/{}.xml",
            self.base_url.trim_end_matches('/'),
            normalize_manga_name(name)
        )
    }

    /// Returns the chapters of `name`, oldest first.
    #[instrument(skip(self))]
    pub async fn locate(&self, name: &str) -> Result<Vec<Chapter>, MangaError> {
        let feed = self.fetch_feed(name).await?;
        let chapters = FeedParser::parse(&feed)?;
        info!(count = chapters.len(), "chapters located");
        Ok(chapters)
    }

    /// Returns manga-level information and chapters of `name`.
    ///
    /// With a metadata lookup, description and dates are filled in when the
    /// lookup succeeds; a failed lookup only logs a warning.
    #[instrument(skip(self, metadata))]
    pub async fn manga(
        &self,
        name: &str,
        metadata: Option<&MetadataLookup<'_>>,
    ) -> Result<Manga, MangaError> {
        let feed = self.fetch_feed(name).await?;
        let mut manga = FeedParser::parse_manga(&feed)?;

        if let Some(lookup) = metadata {
            match lookup.lookup(&manga.title).await {
                Ok(found) => manga.enrich(found),
                Err(e) => warn!(error = %e, "metadata lookup failed"),
            }
        }

        Ok(manga)
    }

    async fn fetch_feed(&self, name: &str) -> Result<String, MangaError> {
        let url = self.feed_url(name);
        let response = self.client.get(&url).await?;
        let response = ensure_found(response, || MangaError::MangaNotFound(name.to_string()))?;
        Ok(response.text())
    }
}
