//! Post-deployment verification.
//!
//! A deployed page publishes the commit it was built from in a
//! `<meta name="{site}:commit" content="...">` tag. Verification fetches the
//! page until that tag carries the expected commit or the retry budget runs
//! out.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

/// Errors that can occur while verifying a deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Request to {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("{url} did not serve commit {commit} after {attempts} attempts")]
    NotDeployed {
        url: String,
        commit: String,
        attempts: u32,
    },
}

/// Fetches the HTML served at a URL.
#[async_trait]
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, DeployError>;
}

/// [`PageFetcher`] backed by an HTTP client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, DeployError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeployError::Fetch {
                url: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, DeployError> {
        let fetch_error = |e: reqwest::Error| DeployError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(fetch_error)?
            .error_for_status()
            .map_err(fetch_error)?;

        response.text().await.map_err(fetch_error)
    }
}

/// Where to look and how patiently.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Deployed site URL
    pub url: String,

    /// Name of the meta tag holding the commit
    pub meta_name: String,

    /// Number of fetch attempts
    pub retries: u32,

    /// Wait between attempts
    pub delay: Duration,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            url: "https://docker-lint.asymmetric-effort.com".to_string(),
            meta_name: "docker-lint:commit".to_string(),
            retries: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// Poll the deployed site until it serves `commit`.
///
/// Fetch failures and missing tags count as a miss for that attempt. There is
/// no wait after the last attempt.
pub async fn verify_commit(
    fetcher: &(impl PageFetcher + Sync),
    config: &VerifyConfig,
    commit: &str,
) -> Result<(), DeployError> {
    for attempt in 1..=config.retries {
        match fetcher.fetch(&config.url).await {
            Ok(html) => match extract_meta_content(&html, &config.meta_name) {
                Some(found) if found == commit => {
                    tracing::info!("{} serves commit {}", config.url, commit);
                    return Ok(());
                }
                Some(found) => tracing::warn!(
                    "Attempt {}/{}: {} serves commit {}, expected {}",
                    attempt,
                    config.retries,
                    config.url,
                    found,
                    commit
                ),
                None => tracing::warn!(
                    "Attempt {}/{}: no {} meta tag at {}",
                    attempt,
                    config.retries,
                    config.meta_name,
                    config.url
                ),
            },
            Err(e) => tracing::warn!("Attempt {}/{}: {}", attempt, config.retries, e),
        }

        if attempt < config.retries {
            tokio::time::sleep(config.delay).await;
        }
    }

    Err(DeployError::NotDeployed {
        url: config.url.clone(),
        commit: commit.to_string(),
        attempts: config.retries,
    })
}

/// Content of the first `<meta name="{name}" content="...">` tag in `html`.
pub fn extract_meta_content(html: &str, name: &str) -> Option<String> {
    meta_pattern()
        .find_iter(html)
        .map(|tag| attributes(tag.as_str()))
        .find(|attrs| attrs.get("name").map(String::as_str) == Some(name))
        .and_then(|mut attrs| attrs.remove("content"))
}

fn attributes(tag: &str) -> HashMap<String, String> {
    attribute_pattern()
        .captures_iter(tag)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or("");
            (caps[1].to_ascii_lowercase(), value.to_string())
        })
        .collect()
}

fn meta_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("Invalid meta tag regex"))
}

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"([a-zA-Z][a-zA-Z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("Invalid attribute regex")
    })
}
