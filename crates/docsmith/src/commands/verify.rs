//! Deployment verification command.

use std::time::Duration;

use anyhow::{Context, Result};
use docsmith_release::{verify_commit, HttpFetcher, VerifyConfig};

use crate::config::ConfigFile;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Command-line overrides for the `[site]` and `[deploy]` settings.
#[derive(Debug, Default)]
pub struct VerifyArgs {
    pub url: Option<String>,
    pub site_name: Option<String>,
    pub retries: Option<u32>,
    pub delay_secs: Option<u64>,
}

/// Run the verify-deploy command.
pub async fn run(config: &ConfigFile, commit: String, args: VerifyArgs) -> Result<()> {
    let verify = verify_config(config, args);

    tracing::info!("Verifying {} serves commit {}", verify.url, commit);

    let fetcher = HttpFetcher::new(REQUEST_TIMEOUT)?;
    verify_commit(&fetcher, &verify, &commit)
        .await
        .context("Deployment verification failed")?;

    Ok(())
}

/// The meta tag name follows the site name the pages were built with, so a
/// `--site-name` given to `build` must also be given here.
fn verify_config(config: &ConfigFile, args: VerifyArgs) -> VerifyConfig {
    let site_name = args.site_name.unwrap_or_else(|| config.site.name.clone());

    VerifyConfig {
        url: args.url.unwrap_or_else(|| config.site.url.clone()),
        meta_name: format!("{}:commit", site_name),
        retries: args.retries.unwrap_or(config.deploy.retries),
        delay: Duration::from_secs(args.delay_secs.unwrap_or(config.deploy.delay_secs)),
    }
}
