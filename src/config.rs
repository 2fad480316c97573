//! Configuration management for mangasee-dl.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "mangasee-dl";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source site settings.
    pub site: SiteConfig,

    /// Download behavior settings.
    pub download: DownloadConfig,

    /// HTTP client settings.
    pub http: HttpConfig,

    /// Secondary metadata lookup settings.
    pub metadata: MetadataConfig,
}

/// Source site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL; feeds live at `{base_url}/rss/{name}.xml`.
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mangasee123.com".to_string(),
        }
    }
}

/// What to do when a single image of a chapter cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the whole chapter.
    #[default]
    Abort,
    /// Skip the image and archive what was fetched.
    BestEffort,
}

/// Download behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory archives are written to.
    pub output_directory: PathBuf,

    /// Chapters downloaded at the same time.
    pub chapter_concurrency: usize,

    /// Images fetched at the same time, per chapter.
    pub image_concurrency: usize,

    /// Handling of failed image fetches.
    pub failure_policy: FailurePolicy,

    /// Archive file extension.
    pub archive_extension: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            chapter_concurrency: 3,
            image_concurrency: 5,
            failure_policy: FailurePolicy::Abort,
            archive_extension: "cbz".to_string(),
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request.
    pub user_agent: String,

    /// Request timeout in seconds.
    pub timeout_sec: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_sec: 30,
        }
    }
}

/// Metadata lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Enrich `--info` output with description and publication dates.
    pub enabled: bool,

    /// Base URL of the Jikan-compatible API.
    pub api_url: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.jikan.moe/v4".to_string(),
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.base_url.trim().is_empty() {
            return Err(invalid("site.base_url", "must not be empty"));
        }

        if self.download.chapter_concurrency == 0 {
            return Err(invalid(
                "download.chapter_concurrency",
                "must be greater than 0",
            ));
        }

        if self.download.image_concurrency == 0 {
            return Err(invalid("download.image_concurrency", "must be greater than 0"));
        }

        if self.download.archive_extension.trim().is_empty() {
            return Err(invalid("download.archive_extension", "must not be empty"));
        }

        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.site.base_url, "https://mangasee123.com");
        assert_eq!(config.download.chapter_concurrency, 3);
        assert_eq!(config.download.image_concurrency, 5);
        assert_eq!(config.download.failure_policy, FailurePolicy::Abort);
        assert!(!config.metadata.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.download.failure_policy = FailurePolicy::BestEffort;
        config.download.image_concurrency = 8;
        let file = NamedTempFile::new().unwrap();

        config.save_to(file.path()).unwrap();

        let loaded = Config::load_from(file.path()).unwrap();
        assert_eq!(loaded.download.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(loaded.download.image_concurrency, 8);
        assert_eq!(loaded.site.base_url, config.site.base_url);
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.download.archive_extension, "cbz");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[download]\nfailure_policy = \"best_effort\"\nchapter_concurrency = 1\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.download.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.download.chapter_concurrency, 1);
        assert_eq!(config.download.image_concurrency, 5);
        assert_eq!(config.http.timeout_sec, 30);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[download\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.download.image_concurrency = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "download.image_concurrency"
        ));

        let mut config = Config::default();
        config.site.base_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.download.chapter_concurrency = 0;
        assert!(config.validate().is_err());
    }
}
