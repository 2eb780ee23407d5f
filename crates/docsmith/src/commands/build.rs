//! Static site build command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use docsmith_static::{BuildConfig, StaticBuilder};

use crate::config::ConfigFile;

/// Run the build command.
pub async fn run(
    file_config: &ConfigFile,
    src: PathBuf,
    output: PathBuf,
    site_name: Option<String>,
    commit: Option<String>,
) -> Result<()> {
    tracing::info!("Building static site...");

    let config = BuildConfig {
        source_dir: src,
        output_dir: output,
        site_name: site_name.unwrap_or_else(|| file_config.site.name.clone()),
        icon: file_config.site.icon.clone(),
        favicon: file_config.site.favicon.clone(),
        commit,
    };

    let result = StaticBuilder::new(config)?
        .build()
        .context("Documentation build failed")?;

    tracing::info!(
        "Built {} pages with {} assets in {}ms",
        result.pages,
        result.assets,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
