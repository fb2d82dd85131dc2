//! Command-line interface definition.

pub mod commands;

pub use commands::{BuildArgs, CheckArgs, Command, DevArgs, InitArgs};

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "gantry",
    version,
    about = "Declarative build pipeline for static sites",
    long_about = "Routes every source file through an ordered transform table, \
bundles scripts and styles with content-hashed names, renders one HTML \
document per page template, and serves it all with hot reload in development."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project root. Defaults to the directory of the nearest
    /// gantry.toml, or the current directory without one.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable ANSI colors in log output
    #[arg(long, global = true)]
    pub no_color: bool,
}
