//! Configuration management for bankcode

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub share: ShareConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    /// Base URL of the catalog service, e.g. `http://localhost:8080`
    pub base_url: String,

    /// Optional per-request transport timeout. Unset means the transport decides.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShareConfig {
    /// Origin prepended to deep links when exporting a shareable URL
    pub origin: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error; the built-in defaults are used instead.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            catalog: CatalogConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_secs: None,
            },
            share: ShareConfig::default(),
        }
    }

    /// Check that both URLs are absolute http(s) URLs
    pub fn validate(&self) -> Result<()> {
        parse_http_url(&self.catalog.base_url)?;
        parse_http_url(&self.share.origin)?;
        Ok(())
    }
}

/// Parse an absolute http(s) URL, rejecting anything else
pub fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(format!("{}: unsupported scheme '{}'", raw, other)).into()),
    }
}

/// Resolve the configuration file path: `$BANKCODE_CONFIG`, else the XDG config dir
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("BANKCODE_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("bankcode").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog.base_url, "http://localhost:8080");
        assert_eq!(config.catalog.timeout_secs, None);
    }

    #[test]
    fn test_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[catalog]
base_url = "https://banks.example.tw"
timeout_secs = 5

[share]
origin = "https://lookup.example.tw"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.catalog.base_url, "https://banks.example.tw");
        assert_eq!(config.catalog.timeout_secs, Some(5));
        assert_eq!(config.share.origin, "https://lookup.example.tw");
    }

    #[test]
    fn test_share_section_is_optional() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[catalog]\nbase_url = \"http://127.0.0.1:9000\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.share, ShareConfig::default());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[catalog]\nbase_url = \"ftp://banks.example.tw\"\n").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[catalog\n").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        std::env::set_var("BANKCODE_CONFIG", "/tmp/bankcode-test/config.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var("BANKCODE_CONFIG");

        assert_eq!(path, PathBuf::from("/tmp/bankcode-test/config.toml"));
    }

    #[test]
    #[serial]
    fn test_load_missing_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");
        std::env::set_var("BANKCODE_CONFIG", path.to_string_lossy().to_string());
        let config = Config::load().unwrap();
        std::env::remove_var("BANKCODE_CONFIG");

        assert_eq!(config, Config::default_config());
    }
}
