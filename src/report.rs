use std::{fmt, path::PathBuf};

use crate::{content_loader::SiteContent, rendering::RenderedSite};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedPage {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a completed build
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// output paths of all written pages, without the sitemap
    pub rendered: Vec<String>,
    pub skipped: Vec<SkippedPage>,
    pub orphans: Vec<String>,

    /// number of copied static files
    pub assets: usize,
}

impl BuildReport {
    pub fn new(content: &SiteContent, site: &RenderedSite, assets: usize) -> Self {
        let mut rendered: Vec<String> = site.pages.iter().map(|p| p.path.clone()).collect();
        rendered.sort();
        let mut orphans = site.orphans.clone();
        orphans.sort();
        let mut skipped: Vec<SkippedPage> = content
            .skipped
            .iter()
            .map(|e| SkippedPage {
                path: e.path().to_owned(),
                reason: e.to_string(),
            })
            .collect();
        skipped.sort_by(|a, b| a.path.cmp(&b.path));

        Self {
            rendered,
            skipped,
            orphans,
            assets,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rendered {} page(s)", self.rendered.len())?;
        for page in &self.rendered {
            writeln!(f, "  {page}")?;
        }
        if !self.orphans.is_empty() {
            writeln!(f, "Not in navigation:")?;
            for page in &self.orphans {
                writeln!(f, "  {page}")?;
            }
        }
        if !self.skipped.is_empty() {
            writeln!(f, "Skipped {} page(s):", self.skipped.len())?;
            for page in &self.skipped {
                writeln!(f, "  {}: {}", page.path.display(), page.reason)?;
            }
        }
        write!(f, "Copied {} static file(s)", self.assets)
    }
}
