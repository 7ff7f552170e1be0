//! Navigation tree resolution.
//!
//! The configured [`NavEntry`] tree is checked against the discovered
//! documents before anything is loaded, then resolved into a [`SiteNav`]
//! once titles are known. Menus, breadcrumbs and previous/next links for a
//! page are all derived from the resolved tree with urls relative to that
//! page.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Component, Path, PathBuf},
};

use serde::Serialize;

use crate::{
    config::NavEntry,
    data::{output_path, Document},
    error::ConfigError,
};

/// Checks that every page of the navigation is one of the documents
pub fn validate_nav(nav: &[NavEntry], documents: &BTreeSet<PathBuf>) -> Result<(), ConfigError> {
    for entry in nav {
        match entry {
            NavEntry::Page { path, .. } => {
                if !documents.contains(path) {
                    return Err(ConfigError::MissingNavTarget { path: path.clone() });
                }
            }
            NavEntry::Section { children, .. } => validate_nav(children, documents)?,
            NavEntry::Link { .. } => {}
        }
    }

    Ok(())
}

/// Navigation for sites without a configured `nav`: one entry per document,
/// directories become sections, `index.md` comes first on every level
pub fn auto_nav(documents: &[PathBuf]) -> Vec<NavEntry> {
    let items = documents
        .iter()
        .map(|p| {
            let parts = p
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect::<Vec<_>>();
            (parts, p.clone())
        })
        .collect();

    auto_nav_level(items)
}

fn auto_nav_level(items: Vec<(Vec<String>, PathBuf)>) -> Vec<NavEntry> {
    let mut pages = Vec::new();
    let mut dirs: BTreeMap<String, Vec<(Vec<String>, PathBuf)>> = BTreeMap::new();

    for (mut parts, path) in items {
        if parts.len() <= 1 {
            pages.push(path);
        } else {
            let dir = parts.remove(0);
            dirs.entry(dir).or_default().push((parts, path));
        }
    }
    pages.sort_by_key(|p| (!is_index(p), p.clone()));

    pages
        .into_iter()
        .map(|path| NavEntry::Page { title: None, path })
        .chain(dirs.into_iter().map(|(dir, children)| NavEntry::Section {
            title: section_title(&dir),
            children: auto_nav_level(children),
        }))
        .collect()
}

fn is_index(path: &Path) -> bool {
    path.file_stem()
        .map(|s| s.eq_ignore_ascii_case("index"))
        .unwrap_or(false)
}

/// `getting-started` -> `Getting started`
fn section_title(dir: &str) -> String {
    let spaced = dir.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedEntry {
    Page {
        title: String,
        /// output path relative to the site root
        url: String,
    },
    Section {
        title: String,
        children: Vec<ResolvedEntry>,
    },
    Link {
        title: String,
        url: String,
    },
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MenuItem {
    pub title: String,
    pub url: Option<String>,
    pub active: bool,
    pub is_section: bool,
    pub is_external: bool,
    pub children: Vec<MenuItem>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NavLink {
    pub title: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SiteNav {
    entries: Vec<ResolvedEntry>,
}

impl SiteNav {
    /// Resolves titles and output urls. Pages whose document failed to load
    /// are dropped, and so are sections left empty by that.
    pub fn resolve(nav: &[NavEntry], documents: &BTreeMap<PathBuf, Document>) -> Self {
        Self {
            entries: resolve_entries(nav, documents),
        }
    }

    pub fn entries(&self) -> &[ResolvedEntry] {
        &self.entries
    }

    /// Whether the page with this output path is linked from the navigation
    pub fn contains(&self, url: &str) -> bool {
        self.pages().iter().any(|p| p.url == url)
    }

    /// All pages in depth-first order, the reading order of the site
    pub fn pages(&self) -> Vec<NavLink> {
        let mut pages = Vec::new();
        collect_pages(&self.entries, &mut pages);
        pages
    }

    /// The menu as seen from the page at `current`
    pub fn menu(&self, current: &str) -> Vec<MenuItem> {
        menu_items(&self.entries, current)
    }

    /// Titles of the sections enclosing the page at `current`
    pub fn breadcrumbs(&self, current: &str) -> Vec<String> {
        let mut trail = Vec::new();
        if find_trail(&self.entries, current, &mut trail) {
            trail
        } else {
            Vec::new()
        }
    }

    /// Previous and next page in reading order, linked relative to `current`
    pub fn neighbours(&self, current: &str) -> (Option<NavLink>, Option<NavLink>) {
        let pages = self.pages();
        let Some(idx) = pages.iter().position(|p| p.url == current) else {
            return (None, None);
        };
        let link = |p: &NavLink| NavLink {
            title: p.title.clone(),
            url: relative_url(current, &p.url),
        };
        let previous = idx.checked_sub(1).map(|i| link(&pages[i]));
        let next = pages.get(idx + 1).map(link);

        (previous, next)
    }
}

fn resolve_entries(nav: &[NavEntry], documents: &BTreeMap<PathBuf, Document>) -> Vec<ResolvedEntry> {
    nav.iter()
        .filter_map(|entry| match entry {
            NavEntry::Page { title, path } => {
                let Some(doc) = documents.get(path) else {
                    tracing::warn!("Dropping {path:?} from the navigation, it failed to load");
                    return None;
                };
                Some(ResolvedEntry::Page {
                    title: title.clone().unwrap_or_else(|| doc.title.clone()),
                    url: output_path(path),
                })
            }
            NavEntry::Section { title, children } => {
                let children = resolve_entries(children, documents);
                (!children.is_empty()).then(|| ResolvedEntry::Section {
                    title: title.clone(),
                    children,
                })
            }
            NavEntry::Link { title, url } => Some(ResolvedEntry::Link {
                title: title.clone(),
                url: url.clone(),
            }),
        })
        .collect()
}

fn collect_pages(entries: &[ResolvedEntry], pages: &mut Vec<NavLink>) {
    for entry in entries {
        match entry {
            ResolvedEntry::Page { title, url } => pages.push(NavLink {
                title: title.clone(),
                url: url.clone(),
            }),
            ResolvedEntry::Section { children, .. } => collect_pages(children, pages),
            ResolvedEntry::Link { .. } => {}
        }
    }
}

fn menu_items(entries: &[ResolvedEntry], current: &str) -> Vec<MenuItem> {
    entries
        .iter()
        .map(|entry| match entry {
            ResolvedEntry::Page { title, url } => MenuItem {
                title: title.clone(),
                url: Some(relative_url(current, url)),
                active: url == current,
                is_section: false,
                is_external: false,
                children: Vec::new(),
            },
            ResolvedEntry::Section { title, children } => {
                let children = menu_items(children, current);
                MenuItem {
                    title: title.clone(),
                    url: None,
                    active: children.iter().any(|c| c.active),
                    is_section: true,
                    is_external: false,
                    children,
                }
            }
            ResolvedEntry::Link { title, url } => MenuItem {
                title: title.clone(),
                url: Some(url.clone()),
                active: false,
                is_section: false,
                is_external: true,
                children: Vec::new(),
            },
        })
        .collect()
}

fn find_trail(entries: &[ResolvedEntry], current: &str, trail: &mut Vec<String>) -> bool {
    for entry in entries {
        match entry {
            ResolvedEntry::Page { url, .. } if url == current => return true,
            ResolvedEntry::Section { title, children } => {
                trail.push(title.clone());
                if find_trail(children, current, trail) {
                    return true;
                }
                trail.pop();
            }
            _ => {}
        }
    }

    false
}

/// Url of `to` as seen from `from`; both are `/` separated paths relative to
/// the site root
pub fn relative_url(from: &str, to: &str) -> String {
    let mut from_dirs: Vec<&str> = from.split('/').collect();
    from_dirs.pop();
    let to_parts: Vec<&str> = to.split('/').collect();
    let to_dirs = &to_parts[..to_parts.len() - 1];

    let common = from_dirs
        .iter()
        .zip(to_dirs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts = vec![".."; from_dirs.len() - common];
    parts.extend(&to_parts[common..]);
    parts.join("/")
}

/// Prefix leading from the page at `from` back to the site root, e.g. `../`
pub fn root_prefix(from: &str) -> String {
    "../".repeat(from.matches('/').count())
}
