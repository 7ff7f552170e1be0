use comrak::{nodes::AstNode, plugins::syntect::SyntectAdapter, ComrakOptions};
use serde_yaml::Mapping;

use crate::{config::ExtensionConfig, error::ConfigError};

mod admonition;
mod emoji;
mod highlight;
mod toc;

pub use admonition::{Admonition, Details};
pub use emoji::Emoji;
pub use highlight::Highlight;
pub use toc::{Toc, TocEntry};

/// A named pass over a document. Passes run in the order they are declared
/// in the config.
pub trait Extension: Send + Sync {
    fn name(&self) -> &'static str;

    /// adjusts the options of the markdown parser
    fn configure(&self, _options: &mut ComrakOptions) {}

    /// text transform applied to the markdown before parsing
    fn preprocess(&self, markdown: String) -> String {
        markdown
    }

    fn highlighter(&self) -> Option<&SyntectAdapter> {
        None
    }

    fn table_of_contents<'a>(&self, _root: &'a AstNode<'a>) -> Option<Vec<TocEntry>> {
        None
    }
}

/// Turns on parser features
pub struct Toggle {
    name: &'static str,
    apply: fn(&mut ComrakOptions),
}

impl Extension for Toggle {
    fn name(&self) -> &'static str {
        self.name
    }

    fn configure(&self, options: &mut ComrakOptions) {
        (self.apply)(options)
    }
}

/// Strips the Python-Markdown package prefixes, e.g. `pymdownx.emoji`
pub fn normalize_name(name: &str) -> &str {
    name.trim_start_matches("pymdownx.")
        .trim_start_matches("markdown.extensions.")
}

/// Creates the extension for a config entry. Returns `None` for names that
/// have no implementation.
pub fn create_extension(
    config: &ExtensionConfig,
) -> Result<Option<Box<dyn Extension>>, ConfigError> {
    let name = normalize_name(&config.name);
    let extension: Box<dyn Extension> = match name {
        "admonition" => Box::new(Admonition),
        "details" => Box::new(Details),
        "emoji" | "emojis" => Box::new(Emoji),
        "highlight" | "codehilite" | "superfences" => {
            Box::new(Highlight::from_options(&config.name, &config.options)?)
        }
        "toc" => Box::new(Toc::from_options(&config.name, &config.options)?),
        "tables" => toggle("tables", |o| o.extension.table = true),
        "footnotes" => toggle("footnotes", |o| o.extension.footnotes = true),
        "def_list" => toggle("def_list", |o| o.extension.description_lists = true),
        "tasklist" => toggle("tasklist", |o| o.extension.tasklist = true),
        "tilde" => toggle("tilde", |o| o.extension.strikethrough = true),
        "caret" => toggle("caret", |o| o.extension.superscript = true),
        "magiclink" => toggle("magiclink", |o| o.extension.autolink = true),
        "smarty" => toggle("smarty", |o| o.parse.smart = true),
        "extra" => toggle("extra", |o| {
            o.extension.table = true;
            o.extension.footnotes = true;
            o.extension.description_lists = true;
        }),
        _ => return Ok(None),
    };

    Ok(Some(extension))
}

fn toggle(name: &'static str, apply: fn(&mut ComrakOptions)) -> Box<dyn Extension> {
    Box::new(Toggle { name, apply })
}

/// Reads an optional string option
pub(crate) fn string_option<'a>(
    extension: &str,
    options: &'a Mapping,
    key: &str,
) -> Result<Option<&'a str>, ConfigError> {
    match options.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidExtension {
                extension: extension.to_owned(),
                reason: format!("option `{key}` must be a string"),
            }),
    }
}
