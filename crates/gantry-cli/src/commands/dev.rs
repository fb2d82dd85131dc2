//! `gantry dev`
//!
//! Builds once, then serves the output tree while a watcher thread
//! rebuilds on change and pushes reload events to connected browsers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use gantry_config::{validate_fs, validate_schema};
use gantry_pipeline::{BuildReport, Pipeline};

use crate::cli::{Cli, DevArgs};
use crate::config;
use crate::dev::{server, BuildStatus, DevServerState, FileWatcher, WatchConfig};
use crate::error::Result;
use crate::ui;

pub async fn run(cli: &Cli, args: &DevArgs) -> Result<()> {
    let mut project = config::load_project(cli.root.as_deref())?;
    if let Some(port) = args.port {
        project.manifest.dev.port = port;
    }
    if let Some(host) = &args.host {
        project.manifest.dev.host = host.clone();
    }
    if args.no_open {
        project.manifest.dev.open = false;
    }

    validate_schema(&project.manifest)?;
    validate_fs(&project.manifest, &project.root)?;

    let options = project.manifest.dev.clone();
    let plan = project.manifest.finalize(&project.root)?;
    let source_root = plan.source_root.clone();
    let output_root = plan.output_root.clone();

    let report = Pipeline::new(plan)?.run()?;
    ui::success(&format!(
        "built {} pages and {} bundles in {}",
        report.documents(),
        report.bundles.len(),
        ui::format_duration(report.duration)
    ));

    let state = Arc::new(DevServerState::new(output_root.clone(), options.clone()));
    state.announce(ready(&report));

    let project_root = project.root.clone();
    let watcher_state = state.clone();
    let _watcher = FileWatcher::spawn(
        WatchConfig {
            source_root,
            manifest: project.manifest_path.clone(),
            output_root,
            debounce: Duration::from_millis(options.debounce_ms),
            ignore: options.watch_ignore.clone(),
        },
        move |changed| {
            if let Some(path) = changed.first() {
                ui::info(&format!("{} changed", display_relative(path, &project_root)));
            }
            watcher_state.announce(BuildStatus::Building);
            match rebuild(&project_root) {
                Ok(report) => {
                    ui::success(&format!(
                        "rebuilt in {}",
                        ui::format_duration(report.duration)
                    ));
                    watcher_state.announce(ready(&report));
                }
                Err(err) => {
                    ui::error(&format!("rebuild failed: {err}"));
                    watcher_state.announce(BuildStatus::Failed {
                        message: err.to_string(),
                    });
                }
            }
        },
    )?;

    let (listener, addr) = server::bind(&options).await?;
    let url = format!("http://{addr}");
    ui::success(&format!("dev server running at {url}"));
    ui::info("watching for changes, ctrl-c to stop");
    if options.open {
        open_browser(&url);
    }

    server::serve(listener, state).await?;
    ui::info("dev server stopped");
    Ok(())
}

/// Re-reads the manifest each time, so edits to gantry.toml and
/// freshly added pages are picked up without restarting.
fn rebuild(root: &Path) -> Result<BuildReport> {
    let project = config::load_project(Some(root))?;
    validate_schema(&project.manifest)?;
    validate_fs(&project.manifest, &project.root)?;
    let plan = project.manifest.finalize(&project.root)?;
    Ok(Pipeline::new(plan)?.run()?)
}

fn ready(report: &BuildReport) -> BuildStatus {
    BuildStatus::Ready {
        duration_ms: report.duration.as_millis() as u64,
        documents: report.documents(),
    }
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn open_browser(url: &str) {
    use std::process::Command;

    let spawned = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    if let Err(err) = spawned {
        ui::warn(&format!("could not open a browser: {err}"));
    }
}
