//! CLI error type with diagnostic rendering.

use std::path::PathBuf;

use gantry_config::ConfigError;
use gantry_pipeline::PipelineError;
use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(
        code(gantry::config),
        help("run 'gantry check' to inspect the resolved configuration")
    )]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(gantry::build))]
    Build(#[from] PipelineError),

    #[error("invalid configuration: {0}")]
    #[diagnostic(
        code(gantry::config::layering),
        help("check gantry.toml and any GANTRY_* environment overrides")
    )]
    Layering(#[from] figment::Error),

    #[error("file watcher error: {0}")]
    #[diagnostic(code(gantry::dev::watch))]
    Watch(#[from] notify::Error),

    #[error("no free port between {start} and {end}")]
    #[diagnostic(
        code(gantry::dev::port),
        help("pass --port to pick a different range")
    )]
    NoFreePort { start: u16, end: u16 },

    #[error("{path} already exists")]
    #[diagnostic(code(gantry::init), help("pass --force to overwrite it"))]
    AlreadyInitialized { path: PathBuf },

    #[error("serialization failed: {0}")]
    #[diagnostic(code(gantry::serialize))]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(gantry::io))]
    Io(#[from] std::io::Error),
}
