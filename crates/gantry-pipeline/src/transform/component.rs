//! Single-file component transform.

use tracing::trace;

use super::{Transform, TransformContext};
use crate::error::Result;

/// Seam for single-file component compilation.
///
/// The routing rule carries the nested style chain in its options
/// (`options.styles`), so a real compiler registered under this name
/// knows how embedded style blocks should be processed. Until one is
/// registered, components pass through for the owning entry bundle to
/// pick up.
pub struct Component;

impl Transform for Component {
    fn name(&self) -> &'static str {
        "component"
    }

    fn apply(&self, content: &str, ctx: &TransformContext<'_>) -> Result<String> {
        if let Some(styles) = ctx.options.get("styles").and_then(|v| v.as_array()) {
            trace!(
                source = %ctx.source.display(),
                style_steps = styles.len(),
                "component pass-through"
            );
        }
        Ok(content.to_string())
    }
}
