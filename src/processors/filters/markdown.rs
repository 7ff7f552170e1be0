use tera::{try_get_value, Filter};

use crate::markdown::MarkdownRenderer;

/// Renders a markdown string from a template, e.g. the site description
pub struct Markdown {
    renderer: MarkdownRenderer,
}

impl Default for Markdown {
    fn default() -> Self {
        Self {
            renderer: MarkdownRenderer::plain(),
        }
    }
}

impl Filter for Markdown {
    fn filter(
        &self,
        value: &tera::Value,
        _args: &std::collections::HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        let string_content = try_get_value!("markdown", "value", String, value);
        let html = self.renderer.render(&string_content).html;

        Ok(tera::Value::String(html))
    }
}
