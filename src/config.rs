//! Configuration Management
//!
//! Handles persistent configuration storage for segment-provider.

use crate::segment::DEFAULT_API_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "SEGMENT_API_TOKEN";
/// Environment variable holding the API base URL
pub const API_URL_ENV: &str = "SEGMENT_API_URL";

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Segment public API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Bearer token for the public API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("segment-provider").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path().context("No config directory on this platform")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective token (CLI > env > config)
    pub fn effective_token(&self, cli: Option<&str>) -> Option<String> {
        pick(cli, env_value(TOKEN_ENV), self.token.as_deref())
    }

    /// Get effective API URL (CLI > env > config > public endpoint)
    pub fn effective_api_url(&self, cli: Option<&str>) -> String {
        pick(cli, env_value(API_URL_ENV), self.api_url.as_deref())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// First non-blank value in precedence order
fn pick(cli: Option<&str>, env: Option<String>, file: Option<&str>) -> Option<String> {
    cli.map(str::to_string)
        .into_iter()
        .chain(env)
        .chain(file.map(str::to_string))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(
            pick(Some("cli"), Some("env".to_string()), Some("file")).as_deref(),
            Some("cli")
        );
        assert_eq!(
            pick(None, Some("env".to_string()), Some("file")).as_deref(),
            Some("env")
        );
        assert_eq!(pick(None, None, Some("file")).as_deref(), Some("file"));
        assert_eq!(pick(None, None, None), None);
    }

    #[test]
    fn test_blank_values_fall_through() {
        assert_eq!(
            pick(Some(""), Some("  ".to_string()), Some("file")).as_deref(),
            Some("file")
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("segment-provider-test-{}", std::process::id()));
        let path = dir.join("nested").join("config.json");

        let config = Config {
            api_url: Some("https://eu1.api.segmentapis.com".to_string()),
            token: Some("sgp_token".to_string()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("segment-provider-does-not-exist.json");
        assert_eq!(Config::load_from(&path), Config::default());
    }
}
