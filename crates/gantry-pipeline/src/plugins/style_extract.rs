//! Grouped stylesheet extraction.

use gantry_config::Substitutions;
use tracing::info;

use super::{Plugin, PluginCx, PluginStage};
use crate::error::{PipelineError, Result};
use crate::hash::content_hash;
use crate::state::{ArtifactKind, BundleKind};
use crate::transform::process_css;
use crate::emit;

/// Concatenates collected style sources into one bundle per group and
/// writes each under the configured style pattern.
///
/// Sources concatenate in sorted path order, so the bundle's bytes,
/// and with them its content hash, never depend on directory walk
/// order. Production builds minify the final bundle once here.
#[derive(Debug)]
pub struct StyleExtract;

impl Plugin for StyleExtract {
    fn name(&self) -> &'static str {
        "style-extract"
    }

    fn stage(&self) -> PluginStage {
        PluginStage::Emit
    }

    fn run(&self, cx: &mut PluginCx<'_>) -> Result<()> {
        let production = cx.plan.manifest.mode.is_production();
        let pattern = &cx.plan.manifest.output.styles;

        let groups = std::mem::take(&mut cx.state.style_groups);
        for (group, mut pieces) in groups {
            if pieces.is_empty() {
                continue;
            }
            pieces.sort_by(|a, b| a.source.cmp(&b.source));

            let mut css = String::new();
            for piece in &pieces {
                css.push_str(&piece.css);
                if !piece.css.ends_with('\n') {
                    css.push('\n');
                }
            }

            let bundle_name = format!("{group}.css");
            let css = if production {
                process_css(&css, &bundle_name, true)
                    .map_err(|message| PipelineError::style(&bundle_name, message))?
            } else {
                css
            };

            let digest = content_hash(css.as_bytes());
            let output = pattern.render(&Substitutions {
                name: &group,
                hash: &digest,
                ext: ".css",
                query: "",
            });

            emit::write_bytes(&cx.plan.output_root, &output, css.as_bytes())?;
            info!(bundle = %output, pieces = pieces.len(), "extracted style bundle");
            cx.state
                .record_bundle(group.as_str(), BundleKind::Style, output.as_str());
            cx.state
                .record_artifact(output.as_str(), css.len() as u64, ArtifactKind::Bundle);
        }

        Ok(())
    }
}
