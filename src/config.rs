use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tokio::fs;

use crate::error::ConfigError;

/// Config file names looked up in the input directory, in order.
pub const CONFIG_FILES: [&str; 3] = ["folio.yml", "folio.yaml", "mkdocs.yml"];

#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub site: SiteMeta,
    pub docs_dir: PathBuf,

    /// `None` when the config has no `nav` key and the navigation is
    /// generated from the documents
    pub nav: Option<Vec<NavEntry>>,
    pub theme: ThemeConfig,
    pub markdown_extensions: Vec<ExtensionConfig>,
    pub static_dirs: Vec<PathBuf>,
    pub extra_css: Vec<String>,
    pub extra_javascript: Vec<String>,
    pub exclude_docs: Vec<String>,
    pub extra: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SiteMeta {
    pub site_name: String,
    pub site_url: Option<String>,
    pub site_description: Option<String>,
    pub site_author: Option<String>,
    pub copyright: Option<String>,
    pub repo_url: Option<String>,
    pub repo_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ThemeConfig {
    pub name: String,

    /// directory with templates overriding the built-in ones
    #[serde(skip)]
    pub custom_dir: Option<PathBuf>,

    /// everything else under `theme:`, passed to templates untouched
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "default".into(),
            custom_dir: None,
            options: BTreeMap::new(),
        }
    }
}

/// A markdown extension as declared in the config together with its
/// extension specific options
#[derive(Clone, Debug, PartialEq)]
pub struct ExtensionConfig {
    pub name: String,
    pub options: Mapping,
}

/// One entry of the navigation tree
#[derive(Clone, Debug, PartialEq)]
pub enum NavEntry {
    /// a link to a document, relative to `docs_dir`
    Page {
        title: Option<String>,
        path: PathBuf,
    },
    Section {
        title: String,
        children: Vec<NavEntry>,
    },
    /// an external url that is not resolved against the documents
    Link { title: String, url: String },
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(flatten)]
    site: SiteMeta,
    #[serde(default = "default_docs_dir")]
    docs_dir: PathBuf,
    #[serde(default)]
    nav: Option<Value>,
    #[serde(default)]
    theme: Option<RawTheme>,
    #[serde(default)]
    markdown_extensions: Vec<Value>,
    #[serde(default)]
    static_dirs: Vec<PathBuf>,
    #[serde(default)]
    extra_css: Vec<String>,
    #[serde(default)]
    extra_javascript: Vec<String>,
    #[serde(default)]
    exclude_docs: Vec<String>,
    #[serde(default)]
    extra: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTheme {
    Name(String),
    Full {
        #[serde(default = "default_theme_name")]
        name: String,
        #[serde(default)]
        custom_dir: Option<PathBuf>,
        #[serde(flatten)]
        options: BTreeMap<String, Value>,
    },
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_theme_name() -> String {
    "default".into()
}

/// Returns the first config file that exists in the given directory
pub fn find_config_file(dir: &Path) -> Result<PathBuf, ConfigError> {
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| ConfigError::NotFound {
            dir: dir.to_owned(),
        })
}

#[tracing::instrument(level = "trace")]
pub async fn read_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let path = find_config_file(dir)?;
    let cfg_string = fs::read_to_string(&path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
    tracing::debug!("Using config {path:?}");

    parse_config(&cfg_string, &path)
}

pub fn parse_config(cfg_string: &str, path: &Path) -> Result<SiteConfig, ConfigError> {
    let raw: RawConfig = serde_yaml::from_str(cfg_string).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })?;

    let nav = raw.nav.as_ref().map(parse_nav).transpose()?;
    let markdown_extensions = raw
        .markdown_extensions
        .iter()
        .map(parse_extension)
        .collect::<Result<Vec<_>, _>>()?;
    let theme = match raw.theme {
        None => ThemeConfig::default(),
        Some(RawTheme::Name(name)) => ThemeConfig {
            name,
            ..Default::default()
        },
        Some(RawTheme::Full {
            name,
            custom_dir,
            options,
        }) => ThemeConfig {
            name,
            custom_dir,
            options,
        },
    };

    Ok(SiteConfig {
        site: raw.site,
        docs_dir: raw.docs_dir,
        nav,
        theme,
        markdown_extensions,
        static_dirs: raw.static_dirs,
        extra_css: raw.extra_css,
        extra_javascript: raw.extra_javascript,
        exclude_docs: raw.exclude_docs,
        extra: raw.extra,
    })
}

fn parse_nav(value: &Value) -> Result<Vec<NavEntry>, ConfigError> {
    match value {
        Value::Sequence(items) => items.iter().map(parse_nav_item).collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(ConfigError::InvalidNav {
            reason: "nav must be a list".into(),
        }),
    }
}

fn parse_nav_item(item: &Value) -> Result<NavEntry, ConfigError> {
    match item {
        Value::String(target) => Ok(nav_leaf(None, target)),
        Value::Mapping(map) if map.len() == 1 => {
            let (key, value) = single_entry(map);
            let title = key
                .as_str()
                .ok_or_else(|| ConfigError::InvalidNav {
                    reason: format!("entry title must be a string, got {key:?}"),
                })?
                .to_owned();

            match value {
                Value::String(target) => Ok(nav_leaf(Some(title), target)),
                Value::Sequence(_) => {
                    let children = parse_nav(value)?;
                    if children.is_empty() {
                        return Err(ConfigError::InvalidNav {
                            reason: format!("section `{title}` has no entries"),
                        });
                    }
                    Ok(NavEntry::Section { title, children })
                }
                other => Err(ConfigError::InvalidNav {
                    reason: format!("entry `{title}` must be a path or a list, got {other:?}"),
                }),
            }
        }
        other => Err(ConfigError::InvalidNav {
            reason: format!("expected `title: target` or a path, got {other:?}"),
        }),
    }
}

fn nav_leaf(title: Option<String>, target: &str) -> NavEntry {
    if target.contains("://") || target.starts_with("mailto:") {
        NavEntry::Link {
            title: title.unwrap_or_else(|| target.to_owned()),
            url: target.to_owned(),
        }
    } else {
        NavEntry::Page {
            title,
            path: PathBuf::from(target.trim_start_matches("./")),
        }
    }
}

fn single_entry(map: &Mapping) -> (&Value, &Value) {
    static NULL: Value = Value::Null;
    map.iter().next().unwrap_or((&NULL, &NULL))
}

fn parse_extension(value: &Value) -> Result<ExtensionConfig, ConfigError> {
    match value {
        Value::String(name) => Ok(ExtensionConfig {
            name: name.to_owned(),
            options: Mapping::new(),
        }),
        Value::Mapping(map) if map.len() == 1 => {
            let (key, options) = single_entry(map);
            let name = key.as_str().ok_or_else(|| ConfigError::InvalidExtension {
                extension: format!("{key:?}"),
                reason: "extension name must be a string".into(),
            })?;
            let options = match options {
                Value::Mapping(options) => options.clone(),
                Value::Null => Mapping::new(),
                other => {
                    return Err(ConfigError::InvalidExtension {
                        extension: name.to_owned(),
                        reason: format!("options must be a mapping, got {other:?}"),
                    })
                }
            };

            Ok(ExtensionConfig {
                name: name.to_owned(),
                options,
            })
        }
        other => Err(ConfigError::InvalidExtension {
            extension: format!("{other:?}"),
            reason: "expected a name or `name: {options}`".into(),
        }),
    }
}
