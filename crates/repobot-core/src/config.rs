//! Configuration management for repobot.
//!
//! Handles loading and saving configuration from TOML files.
//! Config files are stored in platform-specific locations:
//!
//! - **macOS/Linux**: `~/.config/repobot/config.toml`
//! - **Windows**: `%APPDATA%\repobot\config.toml`
//!
//! Environment variables override file values, see [`Config::with_env`].
//!
//! # Example
//!
//! ```ignore
//! use repobot_core::config::Config;
//!
//! let mut config = Config::load()?.with_env()?;
//! config.set("agent.format", "html")?;
//! config.save()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "repobot";

/// Read-scoped token.
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
/// Token used for issue creation.
pub const ENV_ISSUE_TOKEN: &str = "GITHUB_ISSUE_TOKEN";
/// API base URL override.
pub const ENV_API_URL: &str = "GITHUB_API_URL";
/// Reply format override.
pub const ENV_FORMAT: &str = "REPOBOT_FORMAT";

// =============================================================================
// Configuration structures
// =============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// GitHub configuration
    #[serde(default)]
    pub github: GitHubConfig,

    /// Agent behaviour
    #[serde(default)]
    pub agent: AgentConfig,
}

/// GitHub provider configuration.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API base URL (for GitHub Enterprise)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Token for read operations and collaborator management
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Token for issue creation; falls back to `token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_token: Option<String>,
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .field("issue_token", &redact(&self.issue_token))
            .finish()
    }
}

impl GitHubConfig {
    /// Credentials for the GitHub client.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            read_token: self.token.clone(),
            issue_token: self.issue_token.clone(),
        }
    }
}

/// Agent configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// How replies are rendered
    #[serde(default)]
    pub format: ResponseFormat,
}

/// Presentation style of reply messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Plain text lines
    #[default]
    Text,
    /// HTML fragment
    Html,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text",
            ResponseFormat::Html => "html",
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(ResponseFormat::Text),
            "html" => Ok(ResponseFormat::Html),
            other => Err(Error::Config(format!(
                "Unknown response format '{}'. Expected text or html",
                other
            ))),
        }
    }
}

/// Static credential strings for the remote host.
#[derive(Clone, Default, PartialEq)]
pub struct Credentials {
    pub read_token: Option<String>,
    pub issue_token: Option<String>,
}

impl Credentials {
    /// Credentials using one token for everything.
    pub fn single(token: impl Into<String>) -> Self {
        Self {
            read_token: Some(token.into()),
            issue_token: None,
        }
    }

    /// Token for read operations.
    pub fn read(&self) -> Option<&str> {
        self.read_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Token for issue creation.
    pub fn issue(&self) -> Option<&str> {
        self.issue_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.read())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("read_token", &redact(&self.read_token))
            .field("issue_token", &redact(&self.issue_token))
            .finish()
    }
}

fn redact(token: &Option<String>) -> Option<&'static str> {
    token.as_ref().map(|_| "***")
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    ///
    /// Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_TOKEN) {
            debug!("Using {} from environment", ENV_TOKEN);
            self.github.token = Some(token);
        }
        if let Some(token) = get(ENV_ISSUE_TOKEN) {
            debug!("Using {} from environment", ENV_ISSUE_TOKEN);
            self.github.issue_token = Some(token);
        }
        if let Some(url) = get(ENV_API_URL) {
            self.github.base_url = Some(url);
        }
        if let Some(format) = get(ENV_FORMAT) {
            self.agent.format = format.parse()?;
        }

        Ok(self)
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `github.token`, `agent.format`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = split_key(key)?;

        match (section, field) {
            ("github", "base_url" | "url") => self.github.base_url = Some(value.to_string()),
            ("github", "token") => self.github.token = Some(value.to_string()),
            ("github", "issue_token") => self.github.issue_token = Some(value.to_string()),
            ("agent", "format") => self.agent.format = value.parse()?,
            ("github" | "agent", _) => {
                return Err(Error::Config(format!(
                    "Unknown {} config field: {}",
                    section, field
                )))
            }
            _ => return Err(Error::Config(format!("Unknown section: {}", section))),
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    ///
    /// Tokens are returned redacted.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let (section, field) = split_key(key)?;

        match (section, field) {
            ("github", "base_url" | "url") => Ok(self.github.base_url.clone()),
            ("github", "token") => Ok(redact(&self.github.token).map(String::from)),
            ("github", "issue_token") => Ok(redact(&self.github.issue_token).map(String::from)),
            ("agent", "format") => Ok(Some(self.agent.format.as_str().to_string())),
            ("github" | "agent", _) => Err(Error::Config(format!(
                "Unknown {} config field: {}",
                section, field
            ))),
            _ => Err(Error::Config(format!("Unknown section: {}", section))),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    match key.split('.').collect::<Vec<_>>().as_slice() {
        [section, field] => Ok((*section, *field)),
        _ => Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: section.field",
            key
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.base_url.is_none());
        assert!(config.github.token.is_none());
        assert_eq!(config.agent.format, ResponseFormat::Text);
    }

    #[test]
    fn test_set_and_get() {
        let mut config = Config::default();

        config.set("github.url", "https://ghe.example.com/api/v3").unwrap();
        config.set("github.token", "ghp_read").unwrap();
        config.set("agent.format", "HTML").unwrap();

        assert_eq!(
            config.get("github.base_url").unwrap(),
            Some("https://ghe.example.com/api/v3".to_string())
        );
        assert_eq!(config.get("github.token").unwrap(), Some("***".to_string()));
        assert_eq!(config.get("github.issue_token").unwrap(), None);
        assert_eq!(config.get("agent.format").unwrap(), Some("html".to_string()));
        assert_eq!(config.github.token.as_deref(), Some("ghp_read"));
    }

    #[test]
    fn test_invalid_key() {
        let mut config = Config::default();

        assert!(config.set("invalid", "value").is_err());
        assert!(config.set("too.many.parts", "value").is_err());
        assert!(config.set("gitlab.url", "value").is_err());
        assert!(config.set("github.owner", "value").is_err());
        assert!(config.set("agent.format", "markdown").is_err());
        assert!(config.get("agent.unknown").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let mut config = Config::default();
        config.github.token = Some("ghp_read".to_string());
        config.github.issue_token = Some("ghp_issue".to_string());

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[github]"));
        assert!(contents.contains("token = \"ghp_read\""));
        assert!(contents.contains("format = \"text\""));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_nonexistent() {
        let path = PathBuf::from("/nonexistent/path/config.toml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[agent]\nformat = \"html\"\n").unwrap();

        let config = Config::load_from(temp_file.path()).unwrap();
        assert_eq!(config.agent.format, ResponseFormat::Html);
        assert!(config.github.token.is_none());
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[github\ntoken = ").unwrap();

        let result = Config::load_from(temp_file.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_TOKEN, "env_read"),
            (ENV_ISSUE_TOKEN, ""),
            (ENV_FORMAT, "html"),
        ]);

        let mut config = Config::default();
        config.github.issue_token = Some("file_issue".to_string());

        let config = config
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.github.token.as_deref(), Some("env_read"));
        assert_eq!(config.github.issue_token.as_deref(), Some("file_issue"));
        assert!(config.github.base_url.is_none());
        assert_eq!(config.agent.format, ResponseFormat::Html);
    }

    #[test]
    fn test_credentials_issue_fallback() {
        let creds = Credentials::single("read");
        assert_eq!(creds.read(), Some("read"));
        assert_eq!(creds.issue(), Some("read"));

        let creds = Credentials {
            read_token: Some(String::new()),
            issue_token: Some("issue".to_string()),
        };
        assert_eq!(creds.read(), None);
        assert_eq!(creds.issue(), Some("issue"));

        assert_eq!(Credentials::default().issue(), None);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let mut config = Config::default();
        config.github.token = Some("ghp_secret".to_string());

        let debug = format!("{:?} {:?}", config, config.github.credentials());
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("***"));
    }
}
