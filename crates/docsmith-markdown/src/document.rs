//! Source documents and metadata extraction.

use std::fs;
use std::path::{Path, PathBuf};

/// Marker that starts a heading line.
const HEADING_MARKER: char = '#';

/// A Markdown file discovered under the source root.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// Path on disk
    pub path: PathBuf,

    /// Path relative to the source root
    pub relative_path: PathBuf,

    /// Raw Markdown text
    pub content: String,

    /// Text of the first heading line, or the file stem
    pub title: String,

    /// First non-blank, non-heading line, or empty
    pub description: String,
}

/// Errors that can occur when loading a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not under {root}")]
    OutsideRoot { path: String, root: String },
}

impl SourceDocument {
    /// Build a document from text already in memory.
    pub fn new(path: PathBuf, relative_path: PathBuf, content: String) -> Self {
        let stem = file_stem(&relative_path);
        let title = extract_title(&content, &stem);
        let description = extract_description(&content);

        Self {
            path,
            relative_path,
            content,
            title,
            description,
        }
    }

    /// Read a document from disk. `path` must live under `root`.
    pub fn load(root: &Path, path: &Path) -> Result<Self, DocumentError> {
        let relative_path = path
            .strip_prefix(root)
            .map_err(|_| DocumentError::OutsideRoot {
                path: path.display().to_string(),
                root: root.display().to_string(),
            })?
            .to_path_buf();

        let content = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self::new(path.to_path_buf(), relative_path, content))
    }

    /// File name without extension, used as link text in the index.
    pub fn stem(&self) -> String {
        file_stem(&self.relative_path)
    }

    /// Output path relative to the output root: `docs/a.md` -> `docs/a.html`.
    pub fn output_relative_path(&self) -> PathBuf {
        self.relative_path.with_extension("html")
    }

    /// `/`-separated link target for the generated page.
    pub fn href(&self) -> String {
        slash_path(&self.output_relative_path())
    }

    /// Canonical sort key: the `/`-separated relative source path.
    ///
    /// Comparing these strings compares bytes, so ordering does not depend on
    /// the platform separator or directory listing order.
    pub fn sort_key(&self) -> String {
        slash_path(&self.relative_path)
    }
}

/// Title of a Markdown text: the first line starting with `#`, without the
/// marker characters and surrounding whitespace. Falls back to `fallback`.
pub fn extract_title(content: &str, fallback: &str) -> String {
    content
        .lines()
        .find(|line| line.starts_with(HEADING_MARKER))
        .map(|line| line.trim_start_matches(HEADING_MARKER).trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// Description of a Markdown text: the first non-blank line that is not a
/// heading, trimmed. Empty when there is none.
pub fn extract_description(content: &str) -> String {
    content
        .lines()
        .find(|line| !line.trim().is_empty() && !line.starts_with(HEADING_MARKER))
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
