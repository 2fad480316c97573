//! Secondary metadata lookup against a Jikan-compatible API.
//!
//! Supplies description and publication dates the feed doesn't carry.

use crate::error::MangaError;
use crate::http::HttpClient;
use crate::models::MangaMetadata;
use crate::utils::ensure_found;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Search response wrapper.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchEntry>,
}

/// A single search hit.
#[derive(Debug, Deserialize)]
struct SearchEntry {
    synopsis: Option<String>,
    #[serde(default)]
    published: Published,
}

/// Publication range as RFC 3339 timestamps.
#[derive(Debug, Default, Deserialize)]
struct Published {
    from: Option<String>,
    to: Option<String>,
}

/// Looks up manga metadata by name.
pub struct MetadataLookup<'a> {
    client: &'a dyn HttpClient,
    api_url: String,
}

impl<'a> MetadataLookup<'a> {
    pub fn new(client: &'a dyn HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// Fetches the best match for `name`.
    ///
    /// Fails with `MangaNotFound` on a non-success status or when the search
    /// has no results.
    #[instrument(skip(self))]
    pub async fn lookup(&self, name: &str) -> Result<MangaMetadata, MangaError> {
        let url = self.search_url(name)?;
        let response = self.client.get(url.as_str()).await?;
        let response = ensure_found(response, || MangaError::MangaNotFound(name.to_string()))?;

        let search: SearchResponse = serde_json::from_slice(&response.body).map_err(|e| {
            MangaError::ParsingError(format!("malformed metadata response: {}", e))
        })?;
        let entry = search
            .data
            .into_iter()
            .next()
            .ok_or_else(|| MangaError::MangaNotFound(name.to_string()))?;

        debug!(from = ?entry.published.from, to = ?entry.published.to, "metadata found");
        Ok(MangaMetadata {
            description: entry.synopsis.filter(|s| !s.trim().is_empty()),
            start_date: entry.published.from.as_deref().and_then(parse_date),
            end_date: entry.published.to.as_deref().and_then(parse_date),
        })
    }

    fn search_url(&self, name: &str) -> Result<url::Url, MangaError> {
        let endpoint = format!("{}/manga", self.api_url.trim_end_matches('/'));
        url::Url::parse_with_params(&endpoint, &[("q", name), ("limit", "1")])
            .map_err(|e| MangaError::InvalidUrl(format!("{}: {}", endpoint, e)))
    }
}

/// Reduces a timestamp like `1999-09-21T00:00:00+00:00` to its date.
fn parse_date(timestamp: &str) -> Option<NaiveDate> {
    let date = timestamp.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
