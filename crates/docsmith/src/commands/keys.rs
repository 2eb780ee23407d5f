//! Signing key check command.

use anyhow::{Context, Result};
use docsmith_release::{check_keys, KeyCheckConfig, KeyMaterial, SystemRunner};

use crate::config::ConfigFile;

/// Run the check-keys command.
pub async fn run(config: &ConfigFile, signer_key_id: Option<String>) -> Result<()> {
    let check = KeyCheckConfig {
        signer_key_id: signer_key_id.unwrap_or_else(|| config.keys.signer_key_id.clone()),
        keyserver: config.keys.keyserver.clone(),
    };

    let keys = KeyMaterial::from_env()?;
    let now = chrono::Utc::now().timestamp();

    let fingerprint =
        check_keys(&SystemRunner, &keys, &check, now).context("Signing key check failed")?;

    tracing::info!("CI signing key {} OK", fingerprint);

    Ok(())
}
