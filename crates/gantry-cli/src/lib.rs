//! Command-line interface for the gantry asset pipeline.
//!
//! This crate provides the `gantry` binary: it discovers and layers the
//! project manifest, drives [`gantry_pipeline`] builds, and runs the
//! development server with file watching and live reload.
//!
//! # Architecture
//!
//! - [`cli`] - the clap argument surface
//! - [`commands`] - one module per subcommand
//! - [`config`] - manifest discovery layered with environment overrides
//! - [`dev`] - file watcher, HTTP server, and reload events
//! - [`error`] - CLI errors rendered as miette diagnostics
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - terminal message and formatting helpers
//!
//! # Example
//!
//! ```no_run
//! use gantry_cli::{config, logger, Result};
//!
//! fn main() -> Result<()> {
//!     logger::init(0, false, false);
//!     let project = config::load_project(None)?;
//!     println!("project at {}", project.root.display());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
