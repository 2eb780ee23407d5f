//! Static image assets shared by every generated page.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Directory, relative to the output root, that pages link assets from.
pub const ASSET_DIR: &str = "img";

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Copy every regular file directly inside `source` into each target.
    ///
    /// Files keep their names and replace existing files. Returns the copied
    /// file names in name order. A missing `source` copies nothing. A target
    /// that resolves to `source` itself is skipped, since copying a file onto
    /// itself truncates it.
    pub fn copy_images(source: &Path, targets: &[PathBuf]) -> io::Result<Vec<String>> {
        if !source.is_dir() {
            return Ok(Vec::new());
        }
        let canonical_source = source.canonicalize()?;

        let mut files = Vec::new();
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();

        let mut destinations = Vec::with_capacity(targets.len());
        for target in targets {
            fs::create_dir_all(target)?;
            if target.canonicalize()? == canonical_source {
                tracing::debug!("Skipping {}: same as asset source", target.display());
                continue;
            }
            destinations.push(target);
        }

        let mut names = Vec::with_capacity(files.len());
        for file in files {
            let Some(name) = file.file_name() else {
                continue;
            };
            for target in &destinations {
                fs::copy(&file, target.join(name))?;
            }
            tracing::debug!("Copied asset {}", file.display());
            names.push(name.to_string_lossy().into_owned());
        }

        Ok(names)
    }

    /// Link from a page to a file in the output root's asset directory.
    ///
    /// `page` is the page path relative to the output root; one `../` is
    /// emitted per directory level between the page and the root.
    pub fn relative_link(page: &Path, asset: &str) -> String {
        let depth = page
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter(|c| matches!(c, Component::Normal(_)))
                    .count()
            })
            .unwrap_or(0);

        format!("{}{}/{}", "../".repeat(depth), ASSET_DIR, asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn relative_link_at_root() {
        assert_eq!(
            AssetPipeline::relative_link(Path::new("README.html"), "favicon.ico"),
            "img/favicon.ico"
        );
    }

    #[test]
    fn relative_link_nested() {
        assert_eq!(
            AssetPipeline::relative_link(Path::new("docs/a.html"), "icon.png"),
            "../img/icon.png"
        );
        assert_eq!(
            AssetPipeline::relative_link(Path::new("docs/guide/deep/b.html"), "icon.png"),
            "../../../img/icon.png"
        );
    }

    #[test]
    fn copies_to_every_target() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("src");
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::write(source.join("x.png"), b"\x89PNG data").unwrap();
        fs::write(source.join("favicon.ico"), b"ico").unwrap();
        fs::write(source.join("nested").join("skip.png"), b"no").unwrap();

        let first = temp.path().join("out/img");
        let second = temp.path().join("out/docs/img");
        let names =
            AssetPipeline::copy_images(&source, &[first.clone(), second.clone()]).unwrap();

        assert_eq!(names, vec!["favicon.ico".to_string(), "x.png".to_string()]);
        for target in [&first, &second] {
            assert_eq!(fs::read(target.join("x.png")).unwrap(), b"\x89PNG data");
            assert_eq!(fs::read(target.join("favicon.ico")).unwrap(), b"ico");
            assert!(!target.join("nested").exists());
            assert!(!target.join("skip.png").exists());
        }
    }

    #[test]
    fn overwrites_existing_files() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("src");
        let target = temp.path().join("out");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&target).unwrap();
        fs::write(source.join("x.png"), b"new").unwrap();
        fs::write(target.join("x.png"), b"old contents").unwrap();

        AssetPipeline::copy_images(&source, &[target.clone()]).unwrap();

        assert_eq!(fs::read(target.join("x.png")).unwrap(), b"new");
    }

    #[test]
    fn target_that_is_the_source_keeps_its_files() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("docs/img");
        let other = temp.path().join("img");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("x.png"), b"x-bytes").unwrap();

        let names = AssetPipeline::copy_images(
            &source,
            &[other.clone(), temp.path().join("docs/../docs/img")],
        )
        .unwrap();

        assert_eq!(names, vec!["x.png".to_string()]);
        assert_eq!(fs::read(source.join("x.png")).unwrap(), b"x-bytes");
        assert_eq!(fs::read(other.join("x.png")).unwrap(), b"x-bytes");
    }

    #[test]
    fn missing_source_copies_nothing() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("out");

        let names = AssetPipeline::copy_images(&temp.path().join("none"), &[target.clone()])
            .unwrap();

        assert!(names.is_empty());
        assert!(!target.exists());
    }
}
