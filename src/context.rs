use std::path::PathBuf;

use crate::{config::SiteConfig, Paths};

pub struct Context {
    pub dirs: Dirs,
    pub config: SiteConfig,
}

pub struct Dirs {
    pub input_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub output_dir: PathBuf,

    /// output is assembled here and moved into place once complete
    pub staging_dir: PathBuf,
}

impl Context {
    pub fn new(paths: &Paths, config: SiteConfig) -> Self {
        let output_dir = paths.output.to_owned();
        let staging_name = output_dir
            .file_name()
            .map(|n| format!("{}.staging", n.to_string_lossy()))
            .unwrap_or_else(|| "site.staging".into());

        Self {
            dirs: Dirs {
                input_dir: paths.input.to_owned(),
                docs_dir: paths.input.join(&config.docs_dir),
                staging_dir: output_dir.with_file_name(staging_name),
                output_dir,
            },
            config,
        }
    }
}
