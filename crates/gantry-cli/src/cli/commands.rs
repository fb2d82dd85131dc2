//! Subcommands and their arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the project into the output directory
    Build(BuildArgs),

    /// Serve the project, rebuilding and reloading on change
    Dev(DevArgs),

    /// Validate the manifest and print the resolved build plan
    Check(CheckArgs),

    /// Scaffold a new project
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Build in production mode (minified style bundles)
    #[arg(long)]
    pub production: bool,
}

#[derive(Debug, Args)]
pub struct DevArgs {
    /// Override the configured port
    #[arg(long)]
    pub port: Option<u16>,

    /// Override the configured host
    #[arg(long)]
    pub host: Option<String>,

    /// Do not open the browser
    #[arg(long)]
    pub no_open: bool,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Print the resolved plan as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to scaffold into
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite an existing gantry.toml
    #[arg(long)]
    pub force: bool,
}
