//! Tracing setup for the CLI.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. `RUST_LOG` overrides the
/// verbosity flags when set.
pub fn init(verbose: u8, quiet: bool, no_color: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn,gantry_pipeline=info,gantry_config=info,gantry=info",
            1 => "info,gantry_pipeline=debug,gantry_config=debug,gantry=debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_ansi(!no_color)
                .with_writer(std::io::stderr),
        )
        .init();
}
