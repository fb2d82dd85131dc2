//! `gantry check`

use gantry_config::{validate_fs, validate_schema};
use gantry_pipeline::Pipeline;

use crate::cli::{CheckArgs, Cli};
use crate::config;
use crate::error::Result;
use crate::ui;

pub fn run(cli: &Cli, args: &CheckArgs) -> Result<()> {
    let project = config::load_project(cli.root.as_deref())?;

    validate_schema(&project.manifest)?;
    validate_fs(&project.manifest, &project.root)?;
    let plan = project.manifest.finalize(&project.root)?;

    // Constructing the pipeline catches unknown transform and plugin
    // names without running a build.
    let pipeline = Pipeline::new(plan)?;
    let plan = pipeline.plan();

    for warning in plan.rules.lint() {
        ui::warn(&warning.to_string());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(plan)?);
    } else {
        ui::info(&format!("mode      {}", plan.manifest.mode.as_str()));
        ui::info(&format!("source    {}", plan.source_root.display()));
        ui::info(&format!("output    {}", plan.output_root.display()));
        ui::info(&format!(
            "entries   {}",
            plan.entries
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        ui::info(&format!(
            "pages     {} under {}",
            plan.pages.len(),
            plan.pages_dir.display()
        ));
        ui::info(&format!("rules     {}", plan.rules.rules().len()));
    }

    match &project.manifest_path {
        Some(path) => ui::success(&format!("{} is valid", path.display())),
        None => ui::success("defaults are valid (no gantry.toml found)"),
    }
    Ok(())
}
