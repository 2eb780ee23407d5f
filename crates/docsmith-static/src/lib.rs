//! Static site generator for docsmith documentation.
//!
//! Builds a self-contained HTML tree from the project readme, the `docs/`
//! Markdown pages and the license file, with an index page linking them all.

pub mod assets;
pub mod builder;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
