//! Configuration file (docsmith.toml).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub release: ReleaseConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site name appended to page titles and used for the commit meta tag
    pub name: String,
    /// Deployed site URL
    pub url: String,
    /// Icon file name inside docs/img
    pub icon: String,
    /// Favicon file name inside docs/img
    pub favicon: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "docker-lint".to_string(),
            url: "https://docker-lint.asymmetric-effort.com".to_string(),
            icon: "docker-linter.png".to_string(),
            favicon: "favicon.ico".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Remote that new tags are pushed to
    pub remote: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    pub signer_key_id: String,
    pub keyserver: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            signer_key_id: "8528A7AE7B308461".to_string(),
            keyserver: "hkps://keys.openpgp.org".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub retries: u32,
    pub delay_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            retries: 5,
            delay_secs: 5,
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}
