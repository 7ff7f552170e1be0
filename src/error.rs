use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Malformed or inconsistent site configuration. Always aborts the build.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("no site configuration found in {}", dir.display())]
    #[diagnostic(
        code(folio::config::not_found),
        help("create a folio.yml (or mkdocs.yml) in the input directory")
    )]
    NotFound { dir: PathBuf },

    #[error("failed to read {}", path.display())]
    #[diagnostic(code(folio::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    #[diagnostic(code(folio::config::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid navigation entry: {reason}")]
    #[diagnostic(code(folio::config::nav))]
    InvalidNav { reason: String },

    #[error("navigation references `{}`, which is not a document", path.display())]
    #[diagnostic(
        code(folio::config::missing_nav_target),
        help("check the path is relative to docs_dir and the file is not excluded")
    )]
    MissingNavTarget { path: PathBuf },

    #[error("directory {} does not exist", path.display())]
    #[diagnostic(code(folio::config::missing_dir))]
    MissingDirectory { path: PathBuf },

    #[error("unknown theme `{name}`")]
    #[diagnostic(
        code(folio::config::unknown_theme),
        help("use a built-in theme (default, material) or set theme.custom_dir")
    )]
    UnknownTheme { name: String },

    #[error("extension `{extension}`: {reason}")]
    #[diagnostic(code(folio::config::extension))]
    InvalidExtension { extension: String, reason: String },

    #[error("invalid exclude pattern `{pattern}`")]
    #[diagnostic(code(folio::config::exclude))]
    InvalidExclude {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("{} and {with} would both be written to {output}", path.display())]
    #[diagnostic(
        code(folio::config::output_collision),
        help("rename or exclude one of the documents")
    )]
    OutputCollision {
        path: PathBuf,
        output: String,
        with: String,
    },

    #[error("output directory {} contains the site sources", path.display())]
    #[diagnostic(
        code(folio::config::unsafe_output),
        help("choose an output directory outside of the input and docs directories")
    )]
    UnsafeOutput { path: PathBuf },

    #[error("static directory {} must be a relative path inside the docs directory", path.display())]
    #[diagnostic(code(folio::config::static_dir))]
    InvalidStaticDir { path: PathBuf },
}

/// A single document that could not be loaded. The page is skipped and the
/// build continues.
#[derive(Debug, Error, Diagnostic)]
pub enum ContentError {
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(folio::content::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    #[diagnostic(code(folio::content::encoding))]
    Encoding { path: PathBuf },
}

impl ContentError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ContentError::Io { path, .. } | ContentError::Encoding { path } => path,
        }
    }
}

/// Theme or template failure. Always aborts the build.
#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("failed to load theme templates")]
    #[diagnostic(code(folio::render::theme))]
    Theme {
        #[source]
        source: tera::Error,
    },

    #[error("failed to read theme template {}", path.display())]
    #[diagnostic(code(folio::render::theme_io))]
    ThemeIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template `{template}` failed while rendering {}", path.display())]
    #[diagnostic(code(folio::render::template))]
    Template {
        template: String,
        path: PathBuf,
        #[source]
        source: tera::Error,
    },
}

#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error("failed to write {}", path.display())]
    #[diagnostic(code(folio::output::io))]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{count} page(s) were skipped")]
    #[diagnostic(code(folio::build::skipped))]
    PagesSkipped { count: usize },
}

impl BuildError {
    pub(crate) fn output(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| BuildError::Output { path, source }
    }
}
