use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::{
    error::ContentError,
    pipeline::{ProcessingStep, Result},
};

use super::Document;

/// Loading a single document either succeeds or yields a recoverable error
/// for that page only
pub type DocumentOutcome = std::result::Result<Document, ContentError>;

/// reads the raw source of a document
pub struct ReadSource {
    pub docs_dir: PathBuf,
}

pub struct ParseDocument;

#[async_trait]
impl ProcessingStep for ReadSource {
    type Input = PathBuf;
    type Output = (PathBuf, std::result::Result<String, ContentError>);

    #[tracing::instrument(name = "read source", level = "trace", skip(self))]
    async fn process(&self, rel_path: Self::Input) -> Result<Self::Output> {
        let full_path = self.docs_dir.join(&rel_path);
        let contents = match fs::read(&full_path).await {
            Ok(bytes) => String::from_utf8(bytes).map_err(|_| ContentError::Encoding {
                path: rel_path.clone(),
            }),
            Err(source) => Err(ContentError::Io {
                path: rel_path.clone(),
                source,
            }),
        };

        Ok((rel_path, contents))
    }
}

#[async_trait]
impl ProcessingStep for ParseDocument {
    type Input = (PathBuf, std::result::Result<String, ContentError>);
    type Output = DocumentOutcome;

    #[tracing::instrument(name = "parse document", level = "trace", skip_all)]
    async fn process(&self, (rel_path, contents): Self::Input) -> Result<Self::Output> {
        Ok(contents.map(|text| Document::new(rel_path, &text)))
    }
}
