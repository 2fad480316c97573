//! mangasee-dl - manga chapter downloader.
//!
//! This library provides functionality for:
//! - Locating a manga's chapters through the site's RSS feed
//! - Lifting page count and image host out of chapter page scripts
//! - Fetching chapter images with bounded concurrency into CBZ archives

pub mod archive;
pub mod config;
pub mod console;
pub mod downloader;
pub mod error;
pub mod feed;
pub mod http;
pub mod locator;
pub mod logger;
pub mod metadata;
pub mod models;
pub mod page;
pub mod resolver;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, FailurePolicy};
pub use console::Console;
pub use downloader::{ChapterDownloader, ChapterOutcome, MangaDownloader};
pub use error::{ConfigError, MangaError};
pub use feed::FeedParser;
pub use http::{HttpClient, HttpResponse, Session};
pub use locator::ChapterLocator;
pub use metadata::MetadataLookup;
pub use models::{Chapter, ChapterNumber, ChapterPageInfo, Manga, MangaMetadata};
pub use page::ChapterPageAnalyzer;
pub use resolver::ImageUrlResolver;
