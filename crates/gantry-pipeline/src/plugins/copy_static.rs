//! Verbatim source tree publication.

use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use super::{Plugin, PluginCx, PluginStage};
use crate::emit;
use crate::error::{PipelineError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Options {
    /// Path substrings excluded from copying.
    ignore: Vec<String>,
}

/// Copies the whole source tree into the output directory, preserving
/// relative paths. Runs before generated artifacts so transformed
/// files can overwrite their verbatim copies.
#[derive(Debug)]
pub struct CopyStatic {
    ignore: Vec<String>,
}

impl CopyStatic {
    pub fn new() -> Self {
        Self { ignore: Vec::new() }
    }

    pub fn from_options(options: &serde_json::Value) -> Result<Self> {
        if options.is_null() {
            return Ok(Self::new());
        }
        let options: Options =
            serde_json::from_value(options.clone()).map_err(|e| PipelineError::PluginOptions {
                plugin: "copy-static".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            ignore: options.ignore,
        })
    }
}

impl Default for CopyStatic {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for CopyStatic {
    fn name(&self) -> &'static str {
        "copy-static"
    }

    fn stage(&self) -> PluginStage {
        PluginStage::PreEmit
    }

    fn run(&self, cx: &mut PluginCx<'_>) -> Result<()> {
        let source_root = &cx.plan.source_root;
        let output_root = &cx.plan.output_root;

        for entry in WalkDir::new(source_root).sort_by_file_name() {
            let entry = entry.map_err(PipelineError::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            // An output directory nested inside the source tree must
            // not be copied into itself.
            if path.starts_with(output_root) {
                continue;
            }
            let rel = match path.strip_prefix(source_root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let rel_str = rel.to_string_lossy().replace('\\', "/");
            if self.ignore.iter().any(|needle| rel_str.contains(needle)) {
                continue;
            }
            emit::copy_file(path, output_root, &rel_str)?;
            cx.state.copied += 1;
        }

        debug!(copied = cx.state.copied, "published source tree");
        Ok(())
    }
}
