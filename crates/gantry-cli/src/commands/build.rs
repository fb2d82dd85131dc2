//! `gantry build`

use gantry_config::{validate_fs, validate_schema, Mode};
use gantry_pipeline::{ArtifactKind, BuildReport, Pipeline};

use crate::cli::{BuildArgs, Cli};
use crate::config;
use crate::error::Result;
use crate::ui;

pub fn run(cli: &Cli, args: &BuildArgs) -> Result<()> {
    let mut project = config::load_project(cli.root.as_deref())?;
    if args.production {
        project.manifest.mode = Mode::Production;
    }

    validate_schema(&project.manifest)?;
    validate_fs(&project.manifest, &project.root)?;

    let plan = project.manifest.finalize(&project.root)?;
    let output_root = plan.output_root.clone();
    let report = Pipeline::new(plan)?.run()?;

    print_summary(&report);
    ui::success(&format!(
        "built into {} in {}",
        output_root.display(),
        ui::format_duration(report.duration)
    ));
    Ok(())
}

fn print_summary(report: &BuildReport) {
    for bundle in &report.bundles {
        let artifact = report.find_artifact(|a| a.output == bundle.output);
        let size = artifact.map(|a| ui::format_size(a.bytes)).unwrap_or_default();
        ui::info(&format!("{}  {}", bundle.output, size));
    }
    for artifact in report
        .artifacts
        .iter()
        .filter(|a| a.kind == ArtifactKind::Document)
    {
        ui::info(&format!(
            "{}  {}",
            artifact.output,
            ui::format_size(artifact.bytes)
        ));
    }
    ui::info(&format!(
        "{} assets, {} files copied, {} generated",
        report.assets(),
        report.copied,
        ui::format_size(report.generated_bytes())
    ));
}
