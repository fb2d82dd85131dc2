//! The `gantry` binary.

use clap::Parser;

use gantry_cli::cli::{Cli, Command};
use gantry_cli::{commands, logger};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.quiet, cli.no_color);

    match &cli.command {
        Command::Build(args) => commands::build::run(&cli, args)?,
        Command::Check(args) => commands::check::run(&cli, args)?,
        Command::Init(args) => commands::init::run(&cli, args)?,
        Command::Dev(args) => commands::dev::run(&cli, args).await?,
    }

    Ok(())
}
