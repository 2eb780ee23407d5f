//! Markdown to HTML conversion.

use pulldown_cmark::{html, Options, Parser};

/// Render Markdown text to an HTML fragment.
pub fn render_markdown(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(content, options);

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_heading_and_paragraph() {
        let html = render_markdown("# Title\n\nSome *text*.");

        assert_eq!(html, "<h1>Title</h1>\n<p>Some <em>text</em>.</p>\n");
    }

    #[test]
    fn renders_plain_text_as_paragraph() {
        assert_eq!(render_markdown("MIT"), "<p>MIT</p>\n");
    }

    #[test]
    fn renders_tables() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");

        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn escapes_inline_angle_brackets_in_code() {
        let html = render_markdown("`<tag>`");

        assert!(html.contains("<code>&lt;tag&gt;</code>"));
    }
}
