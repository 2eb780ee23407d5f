//! Markdown source documents for docsmith.
//!
//! This crate loads Markdown files, derives the page title and description
//! from their first lines, and renders the full text to HTML.

pub mod document;
pub mod render;

pub use document::{extract_description, extract_title, DocumentError, SourceDocument};
pub use render::render_markdown;
