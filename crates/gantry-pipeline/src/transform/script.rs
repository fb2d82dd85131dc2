//! Script transforms.

use tracing::trace;

use super::{Transform, TransformContext};
use crate::error::Result;

/// Seam for syntax-target compilation. Bundled scripts are expected to
/// already be valid for the configured target, so content passes
/// through unchanged; the step still participates in routing so a real
/// compiler can be registered under the same name.
pub struct ScriptTarget;

impl Transform for ScriptTarget {
    fn name(&self) -> &'static str {
        "script:target"
    }

    fn apply(&self, content: &str, ctx: &TransformContext<'_>) -> Result<String> {
        if let Some(target) = ctx.options.get("target").and_then(|v| v.as_str()) {
            trace!(target, source = %ctx.source.display(), "script target pass-through");
        }
        Ok(content.to_string())
    }
}
