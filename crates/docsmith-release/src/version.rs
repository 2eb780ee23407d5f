//! Semantic version tags.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::command::{CommandError, CommandRunner, ExternalCommand};

/// Tag assumed when the repository has none.
pub const INITIAL_TAG: &str = "v0.0.0";

/// Which part of the version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BumpPart {
    Major,
    #[default]
    Minor,
}

impl FromStr for BumpPart {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            other => Err(VersionError::InvalidPart(other.to_string())),
        }
    }
}

/// A `vMAJOR.MINOR.PATCH` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Parse a tag such as `v1.2.3`.
    pub fn parse(tag: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidTag(tag.to_string());

        let caps = tag_pattern().captures(tag).ok_or_else(invalid)?;
        let part = |i: usize| caps[i].parse::<u64>().map_err(|_| invalid());

        Ok(Self {
            major: part(1)?,
            minor: part(2)?,
            patch: part(3)?,
        })
    }

    /// The next version for `part`; lower parts reset to zero.
    pub fn bump(self, part: BumpPart) -> Result<Self, VersionError> {
        let overflow = || VersionError::Overflow(self.to_string());

        Ok(match part {
            BumpPart::Major => Self {
                major: self.major.checked_add(1).ok_or_else(overflow)?,
                minor: 0,
                patch: 0,
            },
            BumpPart::Minor => Self {
                minor: self.minor.checked_add(1).ok_or_else(overflow)?,
                patch: 0,
                ..self
            },
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v(\d+)\.(\d+)\.(\d+)$").expect("valid tag regex"))
}

/// Errors that can occur while bumping versions.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Cannot increment {0}: version part overflows")]
    Overflow(String),

    #[error("Invalid version part '{0}': expected 'major' or 'minor'")]
    InvalidPart(String),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Increment `tag` by `part`: `v1.2.3` + minor = `v1.3.0`.
pub fn increment_version(tag: &str, part: BumpPart) -> Result<String, VersionError> {
    Ok(Version::parse(tag)?.bump(part)?.to_string())
}

/// Most recent tag reachable from HEAD, or [`INITIAL_TAG`] when there is none.
pub fn latest_tag(runner: &impl CommandRunner, repo: &Path) -> Result<String, VersionError> {
    let output = runner.run(
        &ExternalCommand::new("git")
            .args(["describe", "--tags", "--abbrev=0"])
            .current_dir(repo),
    )?;

    if !output.success {
        tracing::debug!("No tags found, starting from {}", INITIAL_TAG);
        return Ok(INITIAL_TAG.to_string());
    }

    Ok(output.stdout.trim().to_string())
}

/// Tag HEAD with `version` and push the tag when `remote` is configured.
pub fn tag_commit(
    runner: &impl CommandRunner,
    repo: &Path,
    version: &str,
    remote: &str,
) -> Result<(), VersionError> {
    let git = || ExternalCommand::new("git").current_dir(repo);

    runner.run_checked(&git().args(["tag", version]))?;

    let remotes = runner.run_checked(&git().arg("remote"))?.stdout;
    if remotes.split_whitespace().any(|r| r == remote) {
        runner.run_checked(&git().args(["push", remote, version]))?;
        tracing::info!("Pushed {} to {}", version, remote);
    } else {
        tracing::info!("Remote '{}' not configured, tag not pushed", remote);
    }

    Ok(())
}

/// Bump the latest tag in `repo` by `part` and tag HEAD with the result.
pub fn bump_version(
    runner: &impl CommandRunner,
    repo: &Path,
    part: BumpPart,
    remote: &str,
) -> Result<String, VersionError> {
    let tag = latest_tag(runner, repo)?;
    let version = increment_version(&tag, part)?;

    tag_commit(runner, repo, &version, remote)?;
    tracing::info!("Tagged {} (was {})", version, tag);

    Ok(version)
}
