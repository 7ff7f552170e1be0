use std::path::PathBuf;

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};

use crate::{
    error::BuildError,
    pipeline::{ProcessingStep, Result},
};

pub struct SaveFile;

pub struct SaveFileParams {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

#[async_trait]
impl ProcessingStep for SaveFile {
    type Input = SaveFileParams;
    type Output = ();

    #[tracing::instrument(name = "save file", level = "trace", skip_all)]
    async fn process(
        &self,
        SaveFileParams { path, contents }: Self::Input,
    ) -> Result<Self::Output> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(BuildError::output(parent))?;
            }
        }

        // the file handle is closed when it goes out of scope, on every path
        let mut file = fs::File::create(&path)
            .await
            .map_err(BuildError::output(&path))?;
        file.write_all(&contents)
            .await
            .map_err(BuildError::output(&path))?;
        file.flush().await.map_err(BuildError::output(&path))?;
        file.sync_all().await.map_err(BuildError::output(&path))?;
        tracing::trace!("Wrote {path:?}");

        Ok(())
    }
}
