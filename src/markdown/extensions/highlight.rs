use comrak::plugins::syntect::SyntectAdapter;
use serde_yaml::Mapping;

use crate::error::ConfigError;

use super::{string_option, Extension};

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// themes bundled with syntect
pub const THEMES: [&str; 7] = [
    "base16-ocean.dark",
    "base16-eighties.dark",
    "base16-mocha.dark",
    "base16-ocean.light",
    "InspiredGitHub",
    "Solarized (dark)",
    "Solarized (light)",
];

/// Syntax highlighting of fenced code blocks
pub struct Highlight {
    theme: &'static str,
    adapter: SyntectAdapter,
}

impl Highlight {
    pub fn from_options(extension: &str, options: &Mapping) -> Result<Self, ConfigError> {
        let theme = match string_option(extension, options, "theme")? {
            None => DEFAULT_THEME,
            Some(name) => THEMES.iter().copied().find(|t| *t == name).ok_or_else(|| {
                ConfigError::InvalidExtension {
                    extension: extension.to_owned(),
                    reason: format!("unknown highlight theme `{name}`"),
                }
            })?,
        };

        Ok(Self {
            theme,
            adapter: SyntectAdapter::new(theme),
        })
    }

    pub fn theme(&self) -> &'static str {
        self.theme
    }
}

impl Extension for Highlight {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn highlighter(&self) -> Option<&SyntectAdapter> {
        Some(&self.adapter)
    }
}
