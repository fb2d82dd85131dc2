//! Error types for the build pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] gantry_config::ConfigError),

    #[error("unknown transform '{0}' in rule chain")]
    UnknownTransform(String),

    #[error("unknown plugin '{0}'")]
    UnknownPlugin(String),

    #[error("invalid options for plugin '{plugin}': {message}")]
    PluginOptions { plugin: String, message: String },

    #[error("entry '{name}' could not be read: {path}")]
    EntryUnreadable {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transform '{transform}' failed on {path}: {message}")]
    Transform {
        transform: String,
        path: PathBuf,
        message: String,
    },

    #[error("template error in {path}")]
    Template {
        path: PathBuf,
        #[source]
        source: Box<minijinja::Error>,
    },

    #[error("stylesheet error in {path}: {message}")]
    Style { path: PathBuf, message: String },

    #[error("output path '{0}' escapes the output directory")]
    UnsafeOutputPath(String),

    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<walkdir::Error> for PipelineError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("walk cycle"));
        Self::Io { path, source }
    }
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn transform(
        transform: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::Transform {
            transform: transform.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn style(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Style {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn template(path: impl Into<PathBuf>, source: minijinja::Error) -> Self {
        Self::Template {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
