use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
    sync::Arc,
};

use crate::{
    config::NavEntry,
    context::Context,
    data::{output_path, DirLoader, Document, ParseDocument, ReadSource},
    error::{BuildError, ConfigError, ContentError},
    navigation::{auto_nav, validate_nav},
    pipeline::{ProcessingStep, ProcessingStepChain, ProcessingStepParallel},
    rendering::SITEMAP_PATH,
};

/// Everything the renderer needs from the docs directory
#[derive(Debug)]
pub struct SiteContent {
    pub documents: BTreeMap<PathBuf, Document>,

    /// documents that could not be loaded
    pub skipped: Vec<ContentError>,
    pub nav: Vec<NavEntry>,
}

pub struct ContentLoader {
    ctx: Arc<Context>,
}

impl ContentLoader {
    pub fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    /// Discovers and loads all documents. The navigation is checked against
    /// the discovered files before any of them is read.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn load(&self) -> Result<SiteContent, BuildError> {
        let dirs = &self.ctx.dirs;
        let config = &self.ctx.config;

        let paths = DirLoader::new(dirs.docs_dir.to_owned(), &config.exclude_docs)?
            .skip_dir(dirs.output_dir.to_owned())
            .skip_dir(dirs.staging_dir.to_owned())
            .find_documents()
            .await?;

        check_output_paths(&paths)?;

        let nav = match &config.nav {
            Some(nav) => {
                let known: BTreeSet<PathBuf> = paths.iter().cloned().collect();
                validate_nav(nav, &known)?;
                nav.clone()
            }
            None => auto_nav(&paths),
        };

        let outcomes = ReadSource {
            docs_dir: dirs.docs_dir.to_owned(),
        }
        .chain(ParseDocument)
        .parallel()
        .process(paths)
        .await?;

        let mut documents = BTreeMap::new();
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(document) => {
                    documents.insert(document.path.clone(), document);
                }
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {e}", e.path());
                    skipped.push(e);
                }
            }
        }
        tracing::debug!(
            "Loaded {} documents, skipped {}",
            documents.len(),
            skipped.len()
        );

        Ok(SiteContent {
            documents,
            skipped,
            nav,
        })
    }
}

/// Every document needs an output file of its own
fn check_output_paths(paths: &[PathBuf]) -> Result<(), ConfigError> {
    let mut outputs: BTreeMap<String, &PathBuf> = BTreeMap::new();

    for path in paths {
        let output = output_path(path);
        if output == SITEMAP_PATH {
            return Err(ConfigError::OutputCollision {
                path: path.to_owned(),
                output,
                with: "the site map".into(),
            });
        }
        if let Some(other) = outputs.insert(output.clone(), path) {
            return Err(ConfigError::OutputCollision {
                path: path.to_owned(),
                output,
                with: other.display().to_string(),
            });
        }
    }

    Ok(())
}
