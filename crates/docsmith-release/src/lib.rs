//! Release helpers for the docsmith pipeline.
//!
//! Each module is an independent CI step: bumping the version tag, checking
//! the CI signing keys, and verifying that a deployment serves the expected
//! commit. Process and network access go through the [`CommandRunner`] and
//! [`PageFetcher`] traits so the logic can be exercised with fakes.

pub mod command;
pub mod deploy;
pub mod keys;
pub mod version;

pub use command::{CommandError, CommandOutput, CommandRunner, ExternalCommand, SystemRunner};
pub use deploy::{
    extract_meta_content, verify_commit, DeployError, HttpFetcher, PageFetcher, VerifyConfig,
};
pub use keys::{check_keys, KeyCheckConfig, KeyError, KeyMaterial};
pub use version::{bump_version, increment_version, BumpPart, VersionError};
