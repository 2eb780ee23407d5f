//! Template engine for rendering documentation pages.

use html_escape::encode_double_quoted_attribute;
use minijinja::{context, Environment};

/// A link in the index page.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct IndexLink {
    /// Display text
    pub text: String,
    /// Target path relative to the output root
    pub href: String,
}

/// Context for rendering a page template.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Site name appended to the title
    pub site_name: String,
    /// Meta description
    pub description: String,
    /// Rendered content HTML
    pub content: String,
    /// Commit identifier published in a meta tag
    pub commit: Option<String>,
    /// Relative path to the favicon
    pub favicon: Option<String>,
    /// Relative path to the site icon
    pub icon: Option<String>,
}

/// Template engine using minijinja.
///
/// Templates are named `*.html`, so minijinja escapes interpolated values.
/// Content and paths are marked `safe`; paths are attribute-encoded first.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        env.add_template("base.html", BASE_TEMPLATE)?;
        env.add_template("page.html", PAGE_TEMPLATE)?;
        env.add_template("index.html", INDEX_TEMPLATE)?;

        Ok(Self { env })
    }

    /// Render a document page.
    pub fn render_page(&self, context: &Context) -> Result<String, minijinja::Error> {
        self.render("page.html", context, &[])
    }

    /// Render the index page with its list of links.
    pub fn render_index(
        &self,
        context: &Context,
        links: &[IndexLink],
    ) -> Result<String, minijinja::Error> {
        self.render("index.html", context, links)
    }

    fn render(
        &self,
        template: &str,
        context: &Context,
        links: &[IndexLink],
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        let links: Vec<IndexLink> = links
            .iter()
            .map(|link| IndexLink {
                text: link.text.clone(),
                href: encode_double_quoted_attribute(&link.href).into_owned(),
            })
            .collect();

        tmpl.render(context! {
            title => &context.title,
            site_name => &context.site_name,
            description => &context.description,
            content => &context.content,
            commit => &context.commit,
            favicon => context.favicon.as_deref().map(encode_path),
            icon => context.icon.as_deref().map(encode_path),
            links => links,
        })
    }
}

fn encode_path(path: &str) -> String {
    encode_double_quoted_attribute(path).into_owned()
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ title }} | {{ site_name }}</title>
  <meta name="description" content="{{ description }}">
  {% if commit %}
  <meta name="{{ site_name }}:commit" content="{{ commit }}">
  {% endif %}
  {% if favicon %}
  <link rel="icon" href="{{ favicon | safe }}">
  {% endif %}
</head>
<body>
  {% if icon %}
  <img src="{{ icon | safe }}" alt="{{ site_name }}" class="site-icon">
  {% endif %}
{% block content %}{% endblock %}
</body>
</html>
"##;

const PAGE_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
{{ content | safe }}
{% endblock %}"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<ul>
{% for link in links %}
<li><a href="{{ link.href | safe }}">{{ link.text }}</a></li>
{% endfor %}
</ul>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn context(title: &str) -> Context {
        Context {
            title: title.to_string(),
            site_name: "docker-lint".to_string(),
            description: "About it".to_string(),
            content: "<p>Hello world</p>".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn renders_basic_page() {
        let engine = TemplateEngine::new().unwrap();

        let html = engine.render_page(&context("Button")).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<meta charset="utf-8">"#));
        assert!(html.contains("<title>Button | docker-lint</title>"));
        assert!(html.contains(r#"<meta name="description" content="About it">"#));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(!html.contains("rel=\"icon\""));
        assert!(!html.contains("<img"));
        assert!(!html.contains(":commit"));
    }

    #[test]
    fn escapes_title_and_description() {
        let engine = TemplateEngine::new().unwrap();
        let mut ctx = context("A <b> & C");
        ctx.description = "say \"hi\"".to_string();

        let html = engine.render_page(&ctx).unwrap();

        assert!(html.contains("<title>A &lt;b&gt; &amp; C | docker-lint</title>"));
        assert!(html.contains("content=\"say &quot;hi&quot;\""));
    }

    #[test]
    fn includes_asset_references() {
        let engine = TemplateEngine::new().unwrap();
        let mut ctx = context("Guide");
        ctx.favicon = Some("../img/favicon.ico".to_string());
        ctx.icon = Some("../img/docker-linter.png".to_string());

        let html = engine.render_page(&ctx).unwrap();

        assert!(html.contains(r#"<link rel="icon" href="../img/favicon.ico">"#));
        assert!(html.contains(r#"<img src="../img/docker-linter.png""#));
    }

    #[test]
    fn includes_commit_meta_tag() {
        let engine = TemplateEngine::new().unwrap();
        let mut ctx = context("Home");
        ctx.commit = Some("abc123".to_string());

        let html = engine.render_page(&ctx).unwrap();

        assert!(html.contains(r#"<meta name="docker-lint:commit" content="abc123">"#));
    }

    #[test]
    fn renders_index_links_in_order() {
        let engine = TemplateEngine::new().unwrap();
        let links = vec![
            IndexLink {
                text: "README".to_string(),
                href: "README.html".to_string(),
            },
            IndexLink {
                text: "a".to_string(),
                href: "docs/a.html".to_string(),
            },
            IndexLink {
                text: "License".to_string(),
                href: "license.html".to_string(),
            },
        ];

        let html = engine.render_index(&context("Index"), &links).unwrap();

        let readme = html.find(r#"<a href="README.html">README</a>"#).unwrap();
        let doc = html.find(r#"<a href="docs/a.html">a</a>"#).unwrap();
        let license = html.find(r#"<a href="license.html">License</a>"#).unwrap();
        assert!(readme < doc && doc < license);
        assert!(html.contains("<ul>"));
    }
}
