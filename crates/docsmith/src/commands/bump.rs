//! Version bump command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use docsmith_release::{bump_version, BumpPart, SystemRunner};

use crate::config::ConfigFile;

/// Run the bump command. The new tag is printed on stdout.
pub async fn run(config: &ConfigFile, part: BumpPart, repo: PathBuf) -> Result<()> {
    let version = bump_version(&SystemRunner, &repo, part, &config.release.remote)
        .with_context(|| format!("Failed to bump version in {}", repo.display()))?;

    println!("{}", version);

    Ok(())
}
