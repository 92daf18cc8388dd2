//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::mcp::executor::{ToolSettings, DEFAULT_MAX_LIST_LIMIT};

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Path to the SQLite content database.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Public site URL used when printing page links.
    #[serde(default)]
    pub site_url: Option<String>,

    /// Upper bound applied to `limit` arguments of the list tools.
    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: usize,

    /// Settings for the HTTP client.
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            _schema: None,
            _comment: None,
            database_path: default_database_path(),
            site_url: None,
            max_list_limit: default_max_list_limit(),
            client: ClientConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_list_limit == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_list_limit must be at least 1".to_string(),
            });
        }
        if let Some(ref url) = self.site_url {
            validate_url("site_url", url)?;
        }
        validate_url("client.base_url", &self.client.base_url)?;
        Ok(())
    }

    /// Tool behaviour settings derived from this configuration.
    #[must_use]
    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            site_url: self.site_url.clone(),
            max_list_limit: self.max_list_limit,
        }
    }
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: format!("{field} must start with http:// or https://, got '{url}'"),
        })
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("content.db")
}

const fn default_max_list_limit() -> usize {
    DEFAULT_MAX_LIST_LIMIT
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the CMS serving the MCP endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.database_path, PathBuf::from("content.db"));
        assert_eq!(config.max_list_limit, 100);
        assert!(config.site_url.is_none());
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "database_path": "/var/lib/cms/content.db",
            "site_url": "https://example.com",
            "max_list_limit": 50,
            "client": {
                "base_url": "https://cms.example.com"
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/cms/content.db")
        );
        assert_eq!(config.client.base_url, "https://cms.example.com");
        assert_eq!(config.logging.level, "debug");

        let settings = config.tool_settings();
        assert_eq!(settings.site_url.as_deref(), Some("https://example.com"));
        assert_eq!(settings.max_list_limit, 50);
    }

    #[test]
    fn defaults_match_empty_file() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.client.base_url, "http://localhost:3000");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn reject_zero_limit() {
        let config: Config = serde_json::from_str(r#"{"max_list_limit": 0}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_bad_urls() {
        let config: Config = serde_json::from_str(r#"{"site_url": "example.com"}"#).unwrap();
        assert!(config.validate().is_err());

        let config: Config =
            serde_json::from_str(r#"{"client": {"base_url": "ftp://host"}}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("client.base_url"));
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
