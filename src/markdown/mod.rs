//! Markdown to HTML conversion.
//!
//! Documents run through the configured extensions in their declared order:
//! text passes first, then the parser options each extension contributes,
//! then `comrak` renders the result.

use comrak::{
    nodes::{AstNode, NodeCode, NodeHeading, NodeValue},
    Arena, ComrakOptions, ComrakPlugins,
};

use crate::{config::ExtensionConfig, error::ConfigError};

pub mod extensions;

use extensions::{create_extension, Extension, TocEntry};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedMarkdown {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

pub struct MarkdownRenderer {
    extensions: Vec<Box<dyn Extension>>,
    options: ComrakOptions,
}

impl MarkdownRenderer {
    /// Plain CommonMark without extensions
    pub fn plain() -> Self {
        Self {
            extensions: Vec::new(),
            options: base_options(),
        }
    }

    pub fn new(configs: &[ExtensionConfig]) -> Result<Self, ConfigError> {
        let mut extensions = Vec::with_capacity(configs.len());

        for config in configs {
            match create_extension(config)? {
                Some(extension) => {
                    tracing::debug!("Enabled markdown extension {}", extension.name());
                    extensions.push(extension)
                }
                None => tracing::warn!("Ignoring unsupported markdown extension {}", config.name),
            }
        }
        let mut options = base_options();
        for extension in &extensions {
            extension.configure(&mut options);
        }

        Ok(Self {
            extensions,
            options,
        })
    }

    pub fn extension_names(&self) -> Vec<&'static str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    pub fn render(&self, body: &str) -> RenderedMarkdown {
        let markdown = self
            .extensions
            .iter()
            .fold(body.to_owned(), |md, ext| ext.preprocess(md));

        let arena = Arena::new();
        let root = comrak::parse_document(&arena, &markdown, &self.options);
        let toc = self
            .extensions
            .iter()
            .find_map(|ext| ext.table_of_contents(root))
            .unwrap_or_default();

        let mut plugins = ComrakPlugins::default();
        plugins.render.codefence_syntax_highlighter =
            self.extensions.iter().find_map(|ext| ext.highlighter()).map(|h| h as _);

        let mut html = Vec::new();
        if let Err(e) = comrak::format_html_with_plugins(root, &self.options, &mut html, &plugins) {
            tracing::error!("Failed to write html: {e}");
        }
        let html = String::from_utf8_lossy(&html).into_owned();

        RenderedMarkdown { html, toc }
    }
}

/// A heading of a parsed document
#[derive(Clone, Debug, PartialEq)]
pub struct Heading {
    pub level: u8,

    /// inline content flattened to text, the same text comrak derives
    /// heading ids from
    pub text: String,
}

/// All headings in document order
pub fn headings<'a>(root: &'a AstNode<'a>) -> Vec<Heading> {
    root.descendants()
        .filter_map(|node| match node.data.borrow().value {
            NodeValue::Heading(NodeHeading { level, .. }) => Some(Heading {
                level,
                text: heading_text(node),
            }),
            _ => None,
        })
        .collect()
}

/// Headings of a markdown text parsed with the default options
pub fn parse_headings(markdown: &str) -> Vec<Heading> {
    let arena = Arena::new();
    let root = comrak::parse_document(&arena, markdown, &ComrakOptions::default());

    headings(root)
}

fn heading_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match node.data.borrow().value {
        NodeValue::Text(ref literal) | NodeValue::Code(NodeCode { ref literal, .. }) => {
            output.push_str(literal)
        }
        NodeValue::LineBreak | NodeValue::SoftBreak => output.push(' '),
        _ => {
            for child in node.children() {
                collect_text(child, output);
            }
        }
    }
}

fn base_options() -> ComrakOptions {
    let mut options = ComrakOptions::default();
    // documentation sources are trusted and may embed html
    options.render.unsafe_ = true;

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Mapping;

    fn ext(name: &str) -> ExtensionConfig {
        ExtensionConfig {
            name: name.into(),
            options: Mapping::new(),
        }
    }

    #[test]
    fn renders_plain_markdown() {
        let out = MarkdownRenderer::plain().render("# Hello\n\n*world*\n");
        assert_eq!(out.html, "<h1>Hello</h1>\n<p><em>world</em></p>\n");
        assert!(out.toc.is_empty());
    }

    #[test]
    fn extensions_keep_declared_order() {
        let renderer = MarkdownRenderer::new(&[
            ext("pymdownx.emoji"),
            ext("attr_list"),
            ext("admonition"),
            ext("tables"),
        ])
        .unwrap();

        assert_eq!(
            renderer.extension_names(),
            vec!["emoji", "admonition", "tables"]
        );
    }

    #[test]
    fn admonition_body_is_markdown() {
        let renderer = MarkdownRenderer::new(&[ext("admonition")]).unwrap();
        let out = renderer.render("!!! note\n    Some **bold** text\n");

        assert!(out.html.contains("<div class=\"admonition note\">"));
        assert!(out.html.contains("<p class=\"admonition-title\">Note</p>"));
        assert!(out.html.contains("<p>Some <strong>bold</strong> text</p>"));
        assert!(out.html.contains("</div>"));
    }

    #[test]
    fn tables_only_with_extension() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        assert!(!MarkdownRenderer::plain().render(md).html.contains("<table>"));

        let renderer = MarkdownRenderer::new(&[ext("tables")]).unwrap();
        assert!(renderer.render(md).html.contains("<table>"));
    }

    #[test]
    fn highlight_styles_code_blocks() {
        let renderer = MarkdownRenderer::new(&[ext("pymdownx.highlight")]).unwrap();
        let out = renderer.render("```rust\nfn main() {}\n```\n");

        assert!(out.html.contains("style=\""));
        assert!(!MarkdownRenderer::plain()
            .render("```rust\nfn main() {}\n```\n")
            .html
            .contains("style=\""));
    }

    #[test]
    fn toc_collects_headings() {
        let renderer = MarkdownRenderer::new(&[ext("toc")]).unwrap();
        let out = renderer.render("# Title\n\n## Install\n");

        assert_eq!(out.toc.len(), 1);
        assert_eq!(out.toc[0].title, "Install");
        assert!(out.html.contains("id=\"install\""));
    }

    #[test]
    fn toc_ids_match_rendered_anchors() {
        let renderer = MarkdownRenderer::new(&[ext("toc")]).unwrap();
        let out = renderer.render("## Use _this_ now\n\n## A\n\n## A\n\n## A 1\n\nSetext\n------\n");

        let ids: Vec<&str> = out.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["use-this-now", "a", "a-1", "a-1-1", "setext"]);
        for id in ids {
            assert!(
                out.html.contains(&format!("id=\"{id}\"")),
                "no anchor for {id} in {}",
                out.html
            );
        }
    }

    #[test]
    fn headings_flatten_inline_markup() {
        let headings = parse_headings("# Set up the `client`\n\nTitle\n=====\n\n    # indented code\n");

        assert_eq!(
            headings,
            vec![
                Heading {
                    level: 1,
                    text: "Set up the client".into()
                },
                Heading {
                    level: 1,
                    text: "Title".into()
                },
            ]
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = MarkdownRenderer::new(&[
            ext("admonition"),
            ext("emoji"),
            ext("highlight"),
            ext("toc"),
        ])
        .unwrap();
        let md = "# T\n\n!!! tip\n    :rocket:\n\n```yaml\na: 1\n```\n";

        assert_eq!(renderer.render(md), renderer.render(md));
    }
}
