//! Error types for the mangasee-dl application.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for locating and downloading manga.
#[derive(Error, Debug)]
pub enum MangaError {
    /// The manga feed (or metadata entry) does not exist
    #[error("Manga not found: {0}")]
    MangaNotFound(String),

    /// The chapter page does not exist
    #[error("Chapter not found: {0}")]
    ChapterNotFound(String),

    /// The feed document lacked required fields or was not valid XML
    #[error("Failed to parse feed: {0}")]
    ParsingError(String),

    /// The chapter page lacked the embedded page/host data, or it was malformed
    #[error("Failed to read chapter data: {0}")]
    ChapterError(String),

    /// An image request returned a non-success status
    #[error("Image not found: {url} (HTTP {status})")]
    ImageNotFound { url: String, status: StatusCode },

    /// URL construction failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP transport failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the chapter archive failed
    #[error("Failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The concurrency gate was closed while requests were waiting on it
    #[error("Download gate closed")]
    GateClosed(#[from] tokio::sync::AcquireError),

    /// The blocking archive task panicked or was cancelled
    #[error("Archive task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl MangaError {
    /// Returns true for the "not found" family the CLI reports and moves past.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MangaError::MangaNotFound(_)
                | MangaError::ChapterNotFound(_)
                | MangaError::ImageNotFound { .. }
        )
    }
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
