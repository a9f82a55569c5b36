//! Configuration Module - Backend and display settings from config.toml
//!
//! Supports:
//! - Backend base URL and request timeout
//! - Endpoint paths for every retrieval and mutation
//! - Date style and dashboard list sizes

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::format::DateLocale;
use crate::query::SortKey;

/// Environment variable that overrides `backend.base_url`
pub const BASE_URL_ENV: &str = "KNOWLEDGE_LENS_URL";

/// Knowledge Lens Configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend connection settings
    pub backend: BackendConfig,
    /// Endpoint paths, relative to the base URL
    pub endpoints: EndpointConfig,
    /// Display settings
    pub display: DisplayConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL prepended to every endpoint path
    pub base_url: String,
    /// Per-request timeout in seconds (0 = wait forever)
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 0,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.timeout_secs > 0).then(|| std::time::Duration::from_secs(self.timeout_secs))
    }
}

/// Endpoint paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Document list
    pub documents: String,
    /// Link list
    pub links: String,
    /// Search history
    pub search_logs: String,
    /// Document search, the query is appended as `q=`
    pub search_documents: String,
    /// Link search, the query is appended as `q=`
    pub search_links: String,
    /// Single document, `{id}` is replaced
    pub document_detail: String,
    /// Multipart document upload
    pub upload_document: String,
    /// Link creation (POST)
    pub create_link: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            documents: "/documents".to_string(),
            links: "/links".to_string(),
            search_logs: "/search-logs".to_string(),
            search_documents: "/documents/search".to_string(),
            search_links: "/links/search".to_string(),
            document_detail: "/documents/{id}".to_string(),
            upload_document: "/documents/upload".to_string(),
            create_link: "/links".to_string(),
        }
    }
}

/// Display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Short-date style: en-us, en-gb, de, iso
    pub date_locale: DateLocale,
    /// Library sort when none is given: recent, title, owner, size
    pub default_sort: SortKey,
    /// Entries in the dashboard "recently added" list
    pub recent_documents: usize,
    /// Entries in the dashboard "most searched" list
    pub most_searched: usize,
    /// Entries in the "recent searches" strip
    pub recent_searches: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_locale: DateLocale::EnUs,
            default_sort: SortKey::Recent,
            recent_documents: 4,
            most_searched: 5,
            recent_searches: 8,
        }
    }
}

impl Config {
    /// Load config from `path` if it exists, otherwise defaults; env overrides apply either way
    pub fn load_or_default(path: &Path) -> Self {
        let mut config = if path.exists() {
            Self::load_from(path).unwrap_or_else(|e| {
                tracing::warn!("{:#}, using defaults", e);
                Config::default()
            })
        } else {
            Config::default()
        };
        config.apply_env();
        config
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }

    /// Directory holding config.toml and preferences.toml
    pub fn config_dir() -> PathBuf {
        directories::ProjectDirs::from("com", "tunclon", "knowledge-lens")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".knowledge-lens")
            })
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend.base_url = url;
            }
        }
    }
}

/// Generate a sample config file with comments
pub fn generate_sample_config() -> String {
    r#"# Knowledge Lens Configuration
# Location: ~/.config/knowledge-lens/config.toml (or %APPDATA%\tunclon\knowledge-lens\config\config.toml on Windows)

[backend]
# Base URL of the knowledge backend (overridden by KNOWLEDGE_LENS_URL)
base_url = "http://localhost:8000"

# Per-request timeout in seconds (0 = wait forever)
timeout_secs = 0

[endpoints]
documents = "/documents"
links = "/links"
search_logs = "/search-logs"

# The search query is appended as ?q=<query>
search_documents = "/documents/search"
search_links = "/links/search"

# {id} is replaced with the document id
document_detail = "/documents/{id}"

upload_document = "/documents/upload"
create_link = "/links"

[display]
# Short-date style: "en-us", "en-gb", "de", or "iso"
date_locale = "en-us"

# Library sort: "recent", "title", "owner", or "size"
default_sort = "recent"

# Dashboard list sizes
recent_documents = 4
most_searched = 5
recent_searches = 8
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoints.documents, "/documents");
        assert_eq!(config.display.date_locale, DateLocale::EnUs);
        assert_eq!(config.backend.timeout(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.backend.base_url = "https://kb.example.com/api".to_string();
        config.display.default_sort = SortKey::Size;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_sample_config() {
        let sample = generate_sample_config();
        let config: Config = toml::from_str(&sample).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            timeout_secs = 15

            [display]
            date_locale = "de"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.timeout(), Some(std::time::Duration::from_secs(15)));
        assert_eq!(config.display.date_locale, DateLocale::De);
        assert_eq!(config.endpoints.links, "/links");
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.toml")).is_err());
    }
}
