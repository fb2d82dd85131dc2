//! Output directory cleaning.

use std::fs;

use tracing::debug;

use super::{Plugin, PluginCx, PluginStage};
use crate::error::{PipelineError, Result};

/// Removes the previous output directory and recreates it empty, so
/// every build starts from nothing and stale artifacts cannot survive.
#[derive(Debug)]
pub struct Clean;

impl Plugin for Clean {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn stage(&self) -> PluginStage {
        PluginStage::Setup
    }

    fn run(&self, cx: &mut PluginCx<'_>) -> Result<()> {
        let output = &cx.plan.output_root;
        if output.exists() {
            fs::remove_dir_all(output).map_err(|e| PipelineError::io(output, e))?;
            debug!(path = %output.display(), "removed previous output");
        }
        fs::create_dir_all(output).map_err(|e| PipelineError::io(output, e))?;
        Ok(())
    }
}
