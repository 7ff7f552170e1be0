use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use async_walkdir::WalkDir;
use futures::StreamExt;
use tokio::fs;

use crate::{
    common::{SaveFile, SaveFileParams},
    context::Context,
    error::{BuildError, ConfigError},
    pipeline::{ProcessingStep, ProcessingStepParallel},
    rendering::RenderedSite,
};

/// Writes a rendered site. Everything goes into the staging directory first,
/// which then replaces the output directory. A failed write leaves the
/// previous output untouched.
pub struct OutputWriter {
    ctx: Arc<Context>,
}

impl OutputWriter {
    pub fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    /// Checks that all static directories exist and that the output
    /// directory can be replaced without touching the sources
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dirs = &self.ctx.dirs;

        for dir in &self.ctx.config.static_dirs {
            let inside_docs = dir.components().next().is_some()
                && dir.components().all(|c| matches!(c, Component::Normal(_)));
            if !inside_docs {
                return Err(ConfigError::InvalidStaticDir {
                    path: dir.to_owned(),
                });
            }
            let path = dirs.docs_dir.join(dir);
            if !path.is_dir() {
                return Err(ConfigError::MissingDirectory { path });
            }
        }

        // replacing the output must never delete sources
        let Ok(output) = std::fs::canonicalize(&dirs.output_dir) else {
            return Ok(());
        };
        for source_dir in [&dirs.input_dir, &dirs.docs_dir] {
            let Ok(source_dir) = std::fs::canonicalize(source_dir) else {
                continue;
            };
            if source_dir.starts_with(&output) {
                return Err(ConfigError::UnsafeOutput {
                    path: dirs.output_dir.to_owned(),
                });
            }
        }

        Ok(())
    }

    /// Returns the number of copied static files
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn write(&self, site: &RenderedSite) -> Result<usize, BuildError> {
        let staging = &self.ctx.dirs.staging_dir;
        if staging.exists() {
            fs::remove_dir_all(staging)
                .await
                .map_err(BuildError::output(staging))?;
        }

        match self.write_staging(site).await {
            Ok(assets) => {
                self.swap_staging().await?;
                Ok(assets)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(staging).await {
                    tracing::warn!("Failed to remove {staging:?}: {cleanup}");
                }
                Err(e)
            }
        }
    }

    async fn write_staging(&self, site: &RenderedSite) -> Result<usize, BuildError> {
        let staging = &self.ctx.dirs.staging_dir;
        fs::create_dir_all(staging)
            .await
            .map_err(BuildError::output(staging))?;

        let pages = site
            .pages
            .iter()
            .chain(std::iter::once(&site.sitemap))
            .map(|page| SaveFileParams {
                path: staging.join(&page.path),
                contents: page.html.as_bytes().to_vec(),
            })
            .collect::<Vec<_>>();
        let page_count = pages.len();
        SaveFile.parallel().process(pages).await?;
        tracing::debug!("Wrote {page_count} pages");

        let mut assets = 0;
        for dir in &self.ctx.config.static_dirs {
            assets += self.copy_static_dir(dir).await?;
        }

        Ok(assets)
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn copy_static_dir(&self, dir: &Path) -> Result<usize, BuildError> {
        let source = self.ctx.dirs.docs_dir.join(dir);
        let target = self.ctx.dirs.staging_dir.join(dir);
        let mut entries = WalkDir::new(&source);
        let mut files = Vec::new();

        while let Some(res) = entries.next().await {
            let entry = res.map_err(BuildError::output(&source))?;
            let entry_path = entry.path();
            if !entry_path.is_file() {
                continue;
            }
            let Ok(rel_path) = entry_path.strip_prefix(&source) else {
                continue;
            };
            let contents = fs::read(&entry_path)
                .await
                .map_err(BuildError::output(&entry_path))?;
            files.push(SaveFileParams {
                path: target.join(rel_path),
                contents,
            });
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let count = files.len();
        SaveFile.parallel().process(files).await?;
        tracing::debug!("Copied {count} files from {source:?}");

        Ok(count)
    }

    async fn swap_staging(&self) -> Result<(), BuildError> {
        let dirs = &self.ctx.dirs;

        if dirs.output_dir.exists() {
            fs::remove_dir_all(&dirs.output_dir)
                .await
                .map_err(BuildError::output(&dirs.output_dir))?;
        }
        fs::rename(&dirs.staging_dir, &dirs.output_dir)
            .await
            .map_err(BuildError::output(&dirs.output_dir))?;

        Ok(())
    }
}

/// Paths of all files below `dir`, relative to it and sorted
pub async fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = WalkDir::new(dir);
    let mut files = Vec::new();

    while let Some(res) = entries.next().await {
        let entry_path = res?.path();
        if entry_path.is_file() {
            if let Ok(rel_path) = entry_path.strip_prefix(dir) {
                files.push(rel_path.to_owned());
            }
        }
    }
    files.sort();

    Ok(files)
}
