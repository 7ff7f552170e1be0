use std::{path::PathBuf, sync::Arc};

use content_loader::ContentLoader;
use context::Context;
use error::BuildError;
use markdown::MarkdownRenderer;
use output::OutputWriter;
use rendering::{load_theme, ContentRenderer};

mod common;
pub mod config;
pub mod content_loader;
pub mod context;
pub mod data;
pub mod error;
pub mod markdown;
pub mod navigation;
pub mod output;
pub mod pipeline;
mod processors;
pub mod rendering;
pub mod report;

pub use report::{BuildReport, SkippedPage};

#[derive(Clone, Debug)]
pub struct Paths {
    /// directory containing the site configuration
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Builds the site found in `paths.input` into `paths.output`.
/// Configuration and template errors abort before the output is touched,
/// documents that fail to load are skipped and listed in the report.
#[tracing::instrument(level = "trace")]
pub async fn build(paths: &Paths) -> Result<BuildReport, BuildError> {
    let config = config::read_config(&paths.input).await?;
    tracing::debug!("Building {:?}", config.site.site_name);
    let ctx = Arc::new(Context::new(paths, config));

    let markdown = MarkdownRenderer::new(&ctx.config.markdown_extensions)?;
    tracing::debug!("Markdown extensions: {:?}", markdown.extension_names());
    let writer = OutputWriter::new(ctx.clone());
    writer.validate()?;

    let content = ContentLoader::new(ctx.clone()).load().await?;
    let tera = load_theme(&ctx.config.theme, &ctx.dirs.input_dir).await?;
    let site = ContentRenderer::new(ctx.clone(), tera, markdown)
        .render_all(&content)
        .await?;

    let assets = writer.write(&site).await?;
    tracing::info!(
        "Wrote {} pages to {:?}",
        site.pages.len() + 1,
        ctx.dirs.output_dir
    );

    Ok(BuildReport::new(&content, &site, assets))
}
