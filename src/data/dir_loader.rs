use std::path::{Component, Path, PathBuf};

use async_walkdir::WalkDir;
use futures::StreamExt;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::fs;

use crate::error::ConfigError;

/// discovers the markdown documents of a docs directory
pub struct DirLoader {
    base_path: PathBuf,
    excluded: GlobSet,
    skip_dirs: Vec<PathBuf>,
}

impl DirLoader {
    pub fn new(base_path: PathBuf, exclude_docs: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            base_path,
            excluded: build_glob_set(exclude_docs)?,
            skip_dirs: Vec::new(),
        })
    }

    /// Directories that are never scanned, e.g. the output directory when it
    /// lives inside the docs directory
    pub fn skip_dir(mut self, dir: PathBuf) -> Self {
        self.skip_dirs.push(dir);
        self
    }

    /// Asynchronously finds all markdown files at the content location.
    /// Returned paths are relative to the docs directory and sorted.
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn find_documents(&self) -> Result<Vec<PathBuf>, ConfigError> {
        if !self.base_path.is_dir() {
            return Err(ConfigError::MissingDirectory {
                path: self.base_path.to_owned(),
            });
        }
        let skip_dirs = self.relative_skip_dirs().await?;
        let mut entries = WalkDir::new(&self.base_path);
        let mut pages = Vec::new();

        while let Some(res) = entries.next().await {
            let entry = res.map_err(|source| ConfigError::Io {
                path: self.base_path.to_owned(),
                source,
            })?;
            let entry_path = entry.path();

            if !entry_path.is_file() || !is_markdown(&entry_path) {
                continue;
            }
            let Ok(rel_path) = entry_path.strip_prefix(&self.base_path) else {
                continue;
            };
            if skip_dirs.iter().any(|d| rel_path.starts_with(d)) {
                continue;
            }
            if is_hidden(rel_path) {
                continue;
            }
            if self.excluded.is_match(rel_path) {
                tracing::debug!("Excluding {rel_path:?}");
                continue;
            }
            pages.push(rel_path.to_owned());
        }
        pages.sort();
        tracing::debug!("Found {} documents", pages.len());

        Ok(pages)
    }

    /// Skip dirs below the docs directory, relative to it. Both sides are
    /// canonicalized so `./docs` and `docs/../docs` compare equal. Dirs that
    /// do not exist yet cannot contain documents and are dropped.
    async fn relative_skip_dirs(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let base = fs::canonicalize(&self.base_path)
            .await
            .map_err(|source| ConfigError::Io {
                path: self.base_path.to_owned(),
                source,
            })?;
        let mut dirs = Vec::new();

        for dir in &self.skip_dirs {
            let Ok(dir) = fs::canonicalize(dir).await else {
                continue;
            };
            if let Ok(rel_dir) = dir.strip_prefix(&base) {
                dirs.push(rel_dir.to_owned());
            }
        }

        Ok(dirs)
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
        .unwrap_or(false)
}

fn is_hidden(rel_path: &Path) -> bool {
    rel_path.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidExclude {
            pattern: pattern.to_owned(),
            source,
        })?;
        builder.add(glob);
    }

    builder.build().map_err(|source| ConfigError::InvalidExclude {
        pattern: patterns.join(", "),
        source,
    })
}
