//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use docsmith_markdown::{render_markdown, DocumentError, SourceDocument};

use crate::assets::{AssetPipeline, ASSET_DIR};
use crate::templates::{Context, IndexLink, TemplateEngine};

/// Root readme, optional.
const README_FILE: &str = "README.md";
/// License file, required.
const LICENSE_FILE: &str = "LICENSE";
/// Documentation subtree, optional.
const DOCS_DIR: &str = "docs";

const LICENSE_OUTPUT: &str = "license.html";
const INDEX_OUTPUT: &str = "index.html";
const LICENSE_TITLE: &str = "License";
const INDEX_TITLE: &str = "Index";

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source root holding README.md, docs/ and LICENSE
    pub source_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Site name appended to every page title
    pub site_name: String,

    /// Icon file name inside docs/img
    pub icon: String,

    /// Favicon file name inside docs/img
    pub favicon: String,

    /// Commit identifier published in every page head
    pub commit: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from("site"),
            site_name: "docker-lint".to_string(),
            icon: "docker-linter.png".to_string(),
            favicon: "favicon.ico".to_string(),
            commit: None,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated, including the index and license pages
    pub pages: usize,

    /// Number of image files copied from docs/img
    pub assets: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Required file not found: {0}")]
    MissingInput(String),

    #[error("Failed to read sources: {0}")]
    ReadError(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Asset links for one page.
#[derive(Debug, Default)]
struct PageAssets {
    favicon: Option<String>,
    icon: Option<String>,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        let templates =
            TemplateEngine::new().map_err(|e| BuildError::TemplateError(e.to_string()))?;

        Ok(Self { config, templates })
    }

    /// Build the static site.
    ///
    /// All sources are read before anything is written, so a missing license
    /// or an unreadable document leaves the output directory untouched.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let license = self.read_license()?;
        let documents = self.discover_documents()?;

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let assets = self.copy_assets()?;

        for doc in &documents {
            let relative = doc.output_relative_path();
            let html = self.render(
                &relative,
                &doc.title,
                &doc.description,
                render_markdown(&doc.content),
            )?;
            self.write_page(&relative, &html)?;
            tracing::debug!("Rendered {}", doc.path.display());
        }

        let license_html = self.render(
            Path::new(LICENSE_OUTPUT),
            LICENSE_TITLE,
            "",
            render_markdown(&license),
        )?;
        self.write_page(Path::new(LICENSE_OUTPUT), &license_html)?;

        let index_html = self.build_index(&documents)?;
        self.write_page(Path::new(INDEX_OUTPUT), &index_html)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: documents.len() + 2,
            assets,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Discover the readme and every Markdown page under docs/.
    ///
    /// The readme comes first; docs pages follow in byte-wise order of their
    /// `/`-separated relative path.
    pub fn discover_documents(&self) -> Result<Vec<SourceDocument>, BuildError> {
        let root = &self.config.source_dir;
        let mut documents = Vec::new();

        let readme = root.join(README_FILE);
        if readme.is_file() {
            documents.push(SourceDocument::load(root, &readme)?);
        }

        let docs_dir = root.join(DOCS_DIR);
        if !docs_dir.is_dir() {
            tracing::debug!("No {} directory in {}", DOCS_DIR, root.display());
            return Ok(documents);
        }

        let mut pages = Vec::new();
        for entry in WalkDir::new(&docs_dir).follow_links(true) {
            let entry = entry.map_err(|e| BuildError::ReadError(e.to_string()))?;
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "md" {
                continue;
            }

            pages.push(SourceDocument::load(root, path)?);
        }

        pages.sort_by_key(|doc| doc.sort_key());
        documents.extend(pages);

        Ok(documents)
    }

    fn read_license(&self) -> Result<String, BuildError> {
        let path = self.config.source_dir.join(LICENSE_FILE);
        if !path.is_file() {
            return Err(BuildError::MissingInput(path.display().to_string()));
        }

        fs::read_to_string(&path)
            .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))
    }

    /// Copy docs/img into img/ and docs/img/ under the output root.
    fn copy_assets(&self) -> Result<usize, BuildError> {
        let source = self.image_dir();
        let targets = [
            self.config.output_dir.join(ASSET_DIR),
            self.config.output_dir.join(DOCS_DIR).join(ASSET_DIR),
        ];

        let copied = AssetPipeline::copy_images(&source, &targets)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", source.display(), e)))?;

        if !copied.is_empty() {
            tracing::info!("Copied {} assets from {}", copied.len(), source.display());
        }

        Ok(copied.len())
    }

    fn image_dir(&self) -> PathBuf {
        self.config.source_dir.join(DOCS_DIR).join(ASSET_DIR)
    }

    /// Favicon and icon links for a page, for the images that exist.
    fn page_assets(&self, page: &Path) -> PageAssets {
        let images = self.image_dir();
        let link = |name: &str| {
            images
                .join(name)
                .is_file()
                .then(|| AssetPipeline::relative_link(page, name))
        };

        PageAssets {
            favicon: link(&self.config.favicon),
            icon: link(&self.config.icon),
        }
    }

    fn context(&self, page: &Path, title: &str, description: &str, content: String) -> Context {
        let assets = self.page_assets(page);

        Context {
            title: title.to_string(),
            site_name: self.config.site_name.clone(),
            description: description.to_string(),
            content,
            commit: self.config.commit.clone(),
            favicon: assets.favicon,
            icon: assets.icon,
        }
    }

    fn render(
        &self,
        page: &Path,
        title: &str,
        description: &str,
        content: String,
    ) -> Result<String, BuildError> {
        let context = self.context(page, title, description, content);

        self.templates
            .render_page(&context)
            .map_err(|e| BuildError::TemplateError(e.to_string()))
    }

    /// Build the index page linking every document and the license.
    fn build_index(&self, documents: &[SourceDocument]) -> Result<String, BuildError> {
        let mut links: Vec<IndexLink> = documents
            .iter()
            .map(|doc| IndexLink {
                text: doc.stem(),
                href: doc.href(),
            })
            .collect();

        links.push(IndexLink {
            text: LICENSE_TITLE.to_string(),
            href: LICENSE_OUTPUT.to_string(),
        });

        let description = format!("{} documentation", self.config.site_name);
        let context = self.context(
            Path::new(INDEX_OUTPUT),
            INDEX_TITLE,
            &description,
            String::new(),
        );

        self.templates
            .render_index(&context, &links)
            .map_err(|e| BuildError::TemplateError(e.to_string()))
    }

    fn write_page(&self, relative: &Path, html: &str) -> Result<(), BuildError> {
        let path = self.config.output_dir.join(relative);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(&path, html)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
    }
}
