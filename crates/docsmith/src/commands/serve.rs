//! Local preview of a built documentation site.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tower_http::services::ServeDir;

/// Serve the site built into `dir` on localhost until interrupted.
pub async fn run(port: u16, dir: PathBuf, open_browser: bool) -> Result<()> {
    let root = site_root(&dir)?;
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));

    let app = Router::new().fallback_service(ServeDir::new(&root));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let index = format!("http://{}/index.html", addr);
    tracing::info!("Previewing {} at {}", root.display(), index);

    if open_browser {
        if let Err(e) = open::that(&index) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Stopping preview server");
        })
        .await
        .context("Preview server failed")?;

    Ok(())
}

/// The built site directory, resolved to an absolute path.
fn site_root(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        anyhow::bail!(
            "Site directory not found: {}. Run 'docsmith build --output {}' first.",
            dir.display(),
            dir.display()
        );
    }

    if !dir.join("index.html").is_file() {
        tracing::warn!("{} has no index.html", dir.display());
    }

    dir.canonicalize()
        .with_context(|| format!("Failed to resolve {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_site_is_an_error() {
        let temp = tempdir().unwrap();

        let err = site_root(&temp.path().join("site")).unwrap_err();

        assert!(err.to_string().contains("docsmith build"));
    }

    #[test]
    fn file_is_not_a_site() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("index.html");
        std::fs::write(&file, "<html></html>").unwrap();

        assert!(site_root(&file).is_err());
    }

    #[test]
    fn resolves_built_site() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("index.html"), "<html></html>").unwrap();

        let root = site_root(temp.path()).unwrap();

        assert_eq!(root, temp.path().canonicalize().unwrap());
    }
}
