//! Build engine for the gantry asset pipeline.
//!
//! Consumes a finalized [`gantry_config::BuildPlan`] and produces the
//! output tree: a cleaned output directory, the source tree published
//! verbatim, routed assets renamed by content hash, grouped stylesheet
//! bundles, per-entry script bundles, and one rendered HTML document
//! per discovered page. Builds are deterministic: the same sources and
//! manifest produce byte-identical output.

pub mod build;
pub mod emit;
pub mod error;
pub mod hash;
pub mod plugins;
pub mod report;
pub mod state;
pub mod transform;

pub use build::Pipeline;
pub use error::{PipelineError, Result};
pub use plugins::{Plugin, PluginCx, PluginStage};
pub use report::BuildReport;
pub use state::{Artifact, ArtifactKind, Bundle, BundleKind, BuildState, StylePiece};
pub use transform::{Transform, TransformContext, TransformRegistry};
