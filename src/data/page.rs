use std::{
    collections::BTreeMap,
    path::{Component, Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::markdown::parse_headings;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct PageMetadata {
    /// overrides the title taken from the first heading
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,

    /// template used to render this page
    pub template: Option<String>,

    /// parts of the page layout to hide (`navigation`, `toc`)
    #[serde(default)]
    pub hide: Vec<String>,

    /// remaining front matter of this page
    /// passed to the templates when rendering
    #[serde(flatten)]
    pub meta: BTreeMap<String, Value>,
}

impl PageMetadata {
    pub fn hides(&self, part: &str) -> bool {
        self.hide.iter().any(|h| h == part)
    }
}

/// A markdown source document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// path relative to the docs directory
    pub path: PathBuf,
    pub title: String,
    pub body: String,
    pub metadata: PageMetadata,
}

impl Document {
    pub fn new(path: PathBuf, text: &str) -> Self {
        let (metadata, body) = super::parse_front_matter(text, &path);
        let title = metadata
            .title
            .clone()
            .or_else(|| first_heading(body))
            .unwrap_or_else(|| file_title(&path));

        Self {
            path,
            title,
            body: body.to_owned(),
            metadata,
        }
    }

    /// Output path of the rendered page, relative to the output root and
    /// always `/` separated
    pub fn output_path(&self) -> String {
        output_path(&self.path)
    }
}

/// `guide/setup.md` -> `guide/setup.html`
pub fn output_path(source: &Path) -> String {
    url_path(&source.with_extension("html"))
}

/// Joins the normal components of a relative path with `/`
pub fn url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn file_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Text of the first level one heading
pub fn first_heading(body: &str) -> Option<String> {
    parse_headings(body)
        .into_iter()
        .find(|h| h.level == 1)
        .map(|h| h.text)
}
