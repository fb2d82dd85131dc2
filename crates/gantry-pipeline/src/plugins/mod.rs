//! Build plugins and the stage machinery that drives them.
//!
//! Plugins hook the build at fixed stages. Within one stage they run
//! in the order the manifest lists them, which is how the style
//! extractor is guaranteed to record its bundles before the page
//! renderer reads them.

mod clean;
mod copy_static;
mod html_pages;
mod style_extract;

pub use clean::Clean;
pub use copy_static::CopyStatic;
pub use html_pages::HtmlPages;
pub use style_extract::StyleExtract;

use gantry_config::{BuildPlan, PluginInvocation};

use crate::error::{PipelineError, Result};
use crate::state::BuildState;
use crate::transform::TransformRegistry;

/// Where in the build a plugin runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginStage {
    /// Before anything is written. Output cleaning happens here.
    Setup,

    /// Before generated artifacts, so generated files can layer over
    /// whatever runs here.
    PreEmit,

    /// After routing and entry bundling; bundle and page emission.
    Emit,

    /// After all artifacts exist.
    Report,
}

/// Everything a plugin may touch during its stage.
pub struct PluginCx<'a> {
    pub plan: &'a BuildPlan,
    pub state: &'a mut BuildState,
    pub registry: &'a TransformRegistry,
}

pub trait Plugin: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn stage(&self) -> PluginStage;

    fn run(&self, cx: &mut PluginCx<'_>) -> Result<()>;
}

/// Instantiate built-in plugins from manifest invocations, preserving
/// their listed order.
pub fn from_invocations(invocations: &[PluginInvocation]) -> Result<Vec<Box<dyn Plugin>>> {
    invocations.iter().map(build_one).collect()
}

fn build_one(invocation: &PluginInvocation) -> Result<Box<dyn Plugin>> {
    match invocation.plugin.as_str() {
        "clean" => Ok(Box::new(Clean)),
        "copy-static" => Ok(Box::new(CopyStatic::from_options(&invocation.options)?)),
        "style-extract" => Ok(Box::new(StyleExtract)),
        "html-pages" => Ok(Box::new(HtmlPages)),
        other => Err(PipelineError::UnknownPlugin(other.to_string())),
    }
}
