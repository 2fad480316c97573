//! Chapter and manga downloads.
//!
//! Image fetches of one chapter go through a counting gate; a manga download
//! puts chapters through a second, independent gate. Results are collected in
//! dispatch order, so archive member order never depends on network timing.

use crate::archive::{ArchiveEntry, write_archive};
use crate::config::{DownloadConfig, FailurePolicy};
use crate::error::MangaError;
use crate::http::HttpClient;
use crate::models::Chapter;
use crate::page::ChapterPageAnalyzer;
use crate::resolver::ImageUrlResolver;
use crate::utils::{ensure_found, sanitize_file_name, url_file_name};
use futures::future::{join_all, try_join_all};
use std::path::{Path, PathBuf};
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

/// Builds a gate admitting at most `limit` holders at a time.
fn gate(limit: usize) -> Semaphore {
    Semaphore::new(limit.clamp(1, Semaphore::MAX_PERMITS))
}

/// Downloads a single chapter into an archive.
pub struct ChapterDownloader<'a> {
    client: &'a dyn HttpClient,
    image_concurrency: usize,
    policy: FailurePolicy,
    archive_extension: String,
}

impl<'a> ChapterDownloader<'a> {
    /// Creates a downloader fetching at most `image_concurrency` images at once.
    pub fn new(client: &'a dyn HttpClient, image_concurrency: usize) -> Self {
        Self {
            client,
            image_concurrency,
            policy: FailurePolicy::default(),
            archive_extension: "cbz".to_string(),
        }
    }

    /// Creates a downloader from the download section of the config.
    pub fn from_config(client: &'a dyn HttpClient, config: &DownloadConfig) -> Self {
        Self::new(client, config.image_concurrency)
            .with_policy(config.failure_policy)
            .with_archive_extension(&config.archive_extension)
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_archive_extension(mut self, extension: &str) -> Self {
        self.archive_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Where the archive of `chapter` goes inside `destination`.
    pub fn archive_path(&self, chapter: &Chapter, destination: &Path) -> PathBuf {
        destination.join(format!(
            "{}.{}",
            sanitize_file_name(&chapter.name),
            self.archive_extension
        ))
    }

    /// Fetches the chapter page and resolves its image URLs in page order.
    pub async fn image_urls(&self, chapter: &Chapter) -> Result<Vec<String>, MangaError> {
        let response = self.client.get(&chapter.url).await?;
        let response =
            ensure_found(response, || MangaError::ChapterNotFound(chapter.name.clone()))?;

        let info = ChapterPageAnalyzer::analyze(&response.text())?;
        ImageUrlResolver::resolve(chapter, &info)
    }

    /// Fetches every URL through the image gate.
    ///
    /// Entries come back in the order of `urls`. Under `Abort` the first
    /// failure fails the whole call; under `BestEffort` failures are skipped
    /// unless nothing at all could be fetched.
    pub async fn fetch_images(&self, urls: &[String]) -> Result<Vec<ArchiveEntry>, MangaError> {
        let gate = gate(self.image_concurrency);
        let fetches = urls.iter().map(|url| self.fetch_image(&gate, url));

        match self.policy {
            FailurePolicy::Abort => try_join_all(fetches).await,
            FailurePolicy::BestEffort => {
                let mut entries = Vec::with_capacity(urls.len());
                let mut first_error = None;

                for result in join_all(fetches).await {
                    match result {
                        Ok(entry) => entries.push(entry),
                        Err(e) => {
                            warn!(error = %e, "skipping image");
                            first_error.get_or_insert(e);
                        }
                    }
                }

                match first_error {
                    Some(e) if entries.is_empty() => Err(e),
                    _ => Ok(entries),
                }
            }
        }
    }

    async fn fetch_image(&self, gate: &Semaphore, url: &str) -> Result<ArchiveEntry, MangaError> {
        let _permit = gate.acquire().await?;
        let response = self.client.get(url).await?;

        if !response.is_success() {
            return Err(MangaError::ImageNotFound {
                url: url.to_string(),
                status: response.status,
            });
        }

        Ok(ArchiveEntry::new(url_file_name(url), response.body))
    }

    /// Downloads `chapter` into `{destination}/{chapter name}.{extension}`.
    ///
    /// The destination directory is created when missing. A chapter with zero
    /// pages produces an empty archive.
    #[instrument(skip_all, fields(chapter = %chapter.name))]
    pub async fn download(
        &self,
        chapter: &Chapter,
        destination: &Path,
    ) -> Result<PathBuf, MangaError> {
        let urls = self.image_urls(chapter).await?;
        info!(pages = urls.len(), "fetching images");

        let entries = self.fetch_images(&urls).await?;
        if entries.len() < urls.len() {
            warn!(
                fetched = entries.len(),
                expected = urls.len(),
                "archiving partial chapter"
            );
        }

        let path = write_archive(&self.archive_path(chapter, destination), entries).await?;
        info!(path = %path.display(), "chapter archived");
        Ok(path)
    }
}

/// Result of one chapter within a manga download.
#[derive(Debug)]
pub struct ChapterOutcome {
    pub chapter: Chapter,
    pub result: Result<PathBuf, MangaError>,
}

/// Downloads many chapters, at most `chapter_concurrency` at once.
pub struct MangaDownloader<'a> {
    chapters: ChapterDownloader<'a>,
    chapter_concurrency: usize,
}

impl<'a> MangaDownloader<'a> {
    pub fn new(chapters: ChapterDownloader<'a>, chapter_concurrency: usize) -> Self {
        Self {
            chapters,
            chapter_concurrency,
        }
    }

    /// Creates a manga downloader from the download section of the config.
    pub fn from_config(client: &'a dyn HttpClient, config: &DownloadConfig) -> Self {
        Self::new(
            ChapterDownloader::from_config(client, config),
            config.chapter_concurrency,
        )
    }

    /// Downloads every chapter in `chapters` into `destination`.
    ///
    /// A failed chapter doesn't stop the others; outcomes are returned in the
    /// order of `chapters`.
    pub async fn download_all(
        &self,
        chapters: &[Chapter],
        destination: &Path,
    ) -> Vec<ChapterOutcome> {
        let gate = gate(self.chapter_concurrency);

        let downloads = chapters.iter().map(|chapter| {
            let gate = &gate;
            async move {
                let result = match gate.acquire().await {
                    Ok(_permit) => self.chapters.download(chapter, destination).await,
                    Err(e) => Err(e.into()),
                };
                if let Err(e) = &result {
                    warn!(chapter = %chapter.name, error = %e, "chapter failed");
                }
                ChapterOutcome {
                    chapter: chapter.clone(),
                    result,
                }
            }
        });

        join_all(downloads).await
    }
}
