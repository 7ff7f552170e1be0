use comrak::{nodes::AstNode, Anchorizer, ComrakOptions};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::{
    error::ConfigError,
    markdown::{headings, Heading},
};

use super::Extension;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TocEntry {
    pub level: u8,
    pub title: String,
    pub id: String,
}

/// Heading outline of a page. Also gives headings their anchor ids.
pub struct Toc {
    min_level: u8,
    max_level: u8,
}

impl Default for Toc {
    fn default() -> Self {
        Self {
            min_level: 2,
            max_level: 6,
        }
    }
}

impl Toc {
    /// `toc_depth` is either the deepest level (`3`) or a range (`"2-4"`)
    pub fn from_options(extension: &str, options: &Mapping) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidExtension {
            extension: extension.to_owned(),
            reason: "toc_depth must be a level (1-6) or a range like \"2-4\"".into(),
        };
        let (min_level, max_level): (u64, u64) = match options.get("toc_depth") {
            None => return Ok(Self::default()),
            Some(Value::Number(n)) => (2, n.as_u64().ok_or_else(invalid)?),
            Some(Value::String(range)) => {
                let (min, max) = range.split_once('-').ok_or_else(invalid)?;
                (
                    min.trim().parse().map_err(|_| invalid())?,
                    max.trim().parse().map_err(|_| invalid())?,
                )
            }
            Some(_) => return Err(invalid()),
        };
        if !(1..=6).contains(&min_level) || !(1..=6).contains(&max_level) {
            return Err(invalid());
        }

        Ok(Self {
            min_level: min_level as u8,
            max_level: max_level as u8,
        })
    }
}

impl Extension for Toc {
    fn name(&self) -> &'static str {
        "toc"
    }

    fn configure(&self, options: &mut ComrakOptions) {
        options.extension.header_ids = Some(String::new());
    }

    fn table_of_contents<'a>(&self, root: &'a AstNode<'a>) -> Option<Vec<TocEntry>> {
        // every heading takes an id, including the ones outside the toc depth
        let mut anchorizer = Anchorizer::new();
        let entries = headings(root)
            .into_iter()
            .map(|Heading { level, text }| TocEntry {
                level,
                id: anchorizer.anchorize(text.clone()),
                title: text,
            })
            .filter(|e| e.level >= self.min_level && e.level <= self.max_level)
            .collect();

        Some(entries)
    }
}
