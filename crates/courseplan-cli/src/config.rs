//! Configuration file management for courseplan.
//!
//! Provides a TOML-based config file at `~/.config/courseplan/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use courseplan_remote::config::{CatalogConfig, RemoteConfig};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub store: StoreSection,
    #[serde(default)]
    pub catalog: CatalogSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub url: String,
    /// Credential sent as the `x-api-key` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogSection {
    pub url: String,
    pub roster: String,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            url: CatalogConfig::DEFAULT_URL.to_owned(),
            roster: CatalogConfig::DEFAULT_ROSTER.to_owned(),
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the courseplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/courseplan` or
/// `~/.config/courseplan`. We intentionally ignore the platform-specific
/// `dirs::config_dir()` (which returns `~/Library/Application Support`
/// on macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("courseplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("courseplan")
}

/// Return the path to the courseplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file may hold an
/// api key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct PlanConfig {
    pub remote: RemoteConfig,
    pub catalog: CatalogConfig,
}

impl PlanConfig {
    /// Resolve configuration using the chain: CLI flag > env var >
    /// config file > default.
    ///
    /// - Store URL: `cli_api_url` > `COURSEPLAN_API_URL` > `store.url` > `RemoteConfig::DEFAULT_URL`
    /// - Api key: `COURSEPLAN_API_KEY` > `store.api_key` > none
    /// - Catalog URL: `cli_catalog_url` > `COURSEPLAN_CATALOG_URL` > `catalog.url` > `CatalogConfig::DEFAULT_URL`
    /// - Roster: `COURSEPLAN_ROSTER` > `catalog.roster` > `CatalogConfig::DEFAULT_ROSTER`
    pub fn resolve(cli_api_url: Option<&str>, cli_catalog_url: Option<&str>) -> Self {
        let file_config = load_config().ok();

        let api_url = if let Some(url) = cli_api_url {
            url.to_owned()
        } else if let Ok(url) = std::env::var("COURSEPLAN_API_URL") {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.store.url.clone()
        } else {
            RemoteConfig::DEFAULT_URL.to_owned()
        };

        let api_key = std::env::var("COURSEPLAN_API_KEY")
            .ok()
            .or_else(|| file_config.as_ref().and_then(|cfg| cfg.store.api_key.clone()));

        let mut remote = RemoteConfig::new(api_url);
        if let Some(key) = api_key {
            remote = remote.with_api_key(key);
        }

        let catalog_url = if let Some(url) = cli_catalog_url {
            url.to_owned()
        } else if let Ok(url) = std::env::var("COURSEPLAN_CATALOG_URL") {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.catalog.url.clone()
        } else {
            CatalogConfig::DEFAULT_URL.to_owned()
        };

        let roster = std::env::var("COURSEPLAN_ROSTER")
            .ok()
            .or_else(|| file_config.as_ref().map(|cfg| cfg.catalog.roster.clone()))
            .unwrap_or_else(|| CatalogConfig::DEFAULT_ROSTER.to_owned());

        Self {
            remote,
            catalog: CatalogConfig::new(catalog_url, roster),
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
