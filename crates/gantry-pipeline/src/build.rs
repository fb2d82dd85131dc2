//! The build driver.
//!
//! A build runs in a fixed order: setup plugins (cleaning), pre-emit
//! plugins (verbatim publication), the routed source walk, entry
//! bundling, emit plugins (style extraction, page rendering), then
//! report plugins. The walk routes every source file through the rule
//! table and acts on the winning rule's emit policy; files no rule
//! claims are left to their verbatim copies.

use std::fs;
use std::path::Path;
use std::time::Instant;

use gantry_config::{BuildPlan, Emit, Substitutions, TransformStep};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::emit;
use crate::error::{PipelineError, Result};
use crate::hash::content_hash;
use crate::plugins::{self, Plugin, PluginCx, PluginStage};
use crate::report::BuildReport;
use crate::state::{ArtifactKind, BuildState, BundleKind};
use crate::transform::TransformRegistry;

pub struct Pipeline {
    plan: BuildPlan,
    registry: TransformRegistry,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// Assemble a pipeline for a finalized plan. Fails fast when a
    /// rule chain names a transform that is not registered or the
    /// manifest lists an unknown plugin.
    pub fn new(plan: BuildPlan) -> Result<Self> {
        let registry = TransformRegistry::with_defaults(&plan.source_root);
        let plugins = plugins::from_invocations(&plan.manifest.plugin_invocations())?;
        let pipeline = Self {
            plan,
            registry,
            plugins,
        };
        pipeline.check_chains()?;
        Ok(pipeline)
    }

    /// Register an additional plugin after the built-in set.
    pub fn with_plugin(mut self, plugin: Box<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    pub fn run(&self) -> Result<BuildReport> {
        let started = Instant::now();
        let mut state = BuildState::default();

        info!(
            mode = self.plan.manifest.mode.as_str(),
            source = %self.plan.source_root.display(),
            output = %self.plan.output_root.display(),
            "build started"
        );
        for warning in self.plan.rules.lint() {
            warn!(%warning, "routing table");
        }

        self.run_stage(PluginStage::Setup, &mut state)?;
        self.run_stage(PluginStage::PreEmit, &mut state)?;
        self.emit_routed(&mut state)?;
        self.emit_entry_bundles(&mut state)?;
        self.run_stage(PluginStage::Emit, &mut state)?;
        self.run_stage(PluginStage::Report, &mut state)?;

        let report = BuildReport::from_state(self.plan.manifest.mode, started.elapsed(), state);
        info!(
            artifacts = report.artifacts.len(),
            copied = report.copied,
            elapsed_ms = report.duration.as_millis() as u64,
            "build finished"
        );
        Ok(report)
    }

    fn run_stage(&self, stage: PluginStage, state: &mut BuildState) -> Result<()> {
        for plugin in self.plugins.iter().filter(|p| p.stage() == stage) {
            debug!(plugin = plugin.name(), ?stage, "running plugin");
            let mut cx = PluginCx {
                plan: &self.plan,
                state: &mut *state,
                registry: &self.registry,
            };
            plugin.run(&mut cx)?;
        }
        Ok(())
    }

    fn check_chains(&self) -> Result<()> {
        let mut check = |steps: &[TransformStep]| -> Result<()> {
            for step in steps {
                if !self.registry.contains(&step.transform) {
                    return Err(PipelineError::UnknownTransform(step.transform.clone()));
                }
            }
            Ok(())
        };
        for rule in self.plan.rules.rules() {
            check(&rule.chain)?;
            for sub in &rule.one_of {
                check(&sub.chain)?;
            }
        }
        Ok(())
    }

    /// Walk the source tree and act on each file's winning rule.
    fn emit_routed(&self, state: &mut BuildState) -> Result<()> {
        let plan = &self.plan;
        let mode = plan.manifest.mode;
        let no_vars = serde_json::Value::Null;

        for entry in WalkDir::new(&plan.source_root).sort_by_file_name() {
            let entry = entry.map_err(PipelineError::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.starts_with(&plan.output_root) {
                continue;
            }
            let Some(hit) = plan.rules.route(path, None) else {
                continue;
            };
            let Ok(rel) = path.strip_prefix(&plan.source_root) else {
                continue;
            };
            debug!(file = %rel.display(), rule = %hit.rule.name, "routed");

            match hit.emit() {
                // Entry bundling owns script sources; page rendering
                // owns the discovered templates. Explicitly consumed
                // files produce nothing either.
                Emit::ScriptBundle | Emit::Page | Emit::Consumed => {}

                Emit::StyleBundle { group } => {
                    let text = read_text(path)?;
                    let css =
                        self.registry
                            .apply_chain(hit.chain(), text, path, mode, &no_vars)?;
                    state.add_style_piece(group, rel.to_path_buf(), css);
                }

                Emit::CopyInPlace => {
                    let rel_str = rel_string(rel);
                    if hit.chain().is_empty() {
                        let bytes = emit::copy_file(path, &plan.output_root, &rel_str)?;
                        state.record_artifact(rel_str, bytes, ArtifactKind::Asset);
                    } else {
                        let text = read_text(path)?;
                        let out =
                            self.registry
                                .apply_chain(hit.chain(), text, path, mode, &no_vars)?;
                        emit::write_bytes(&plan.output_root, &rel_str, out.as_bytes())?;
                        state.record_artifact(rel_str, out.len() as u64, ArtifactKind::Asset);
                    }
                }

                Emit::Asset { pattern } => {
                    let bytes = if hit.chain().is_empty() {
                        fs::read(path).map_err(|e| PipelineError::io(path, e))?
                    } else {
                        let text = read_text(path)?;
                        self.registry
                            .apply_chain(hit.chain(), text, path, mode, &no_vars)?
                            .into_bytes()
                    };

                    let digest = if pattern.needs_hash() {
                        content_hash(&bytes)
                    } else {
                        String::new()
                    };
                    let name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let ext = path
                        .extension()
                        .map(|e| format!(".{}", e.to_string_lossy().to_ascii_lowercase()))
                        .unwrap_or_default();
                    let output = pattern.render(&Substitutions {
                        name: &name,
                        hash: &digest,
                        ext: &ext,
                        query: "",
                    });

                    emit::write_bytes(&plan.output_root, &output, &bytes)?;
                    state.record_artifact(output, bytes.len() as u64, ArtifactKind::Asset);
                }
            }
        }
        Ok(())
    }

    /// One script bundle per entry, named by the script pattern.
    fn emit_entry_bundles(&self, state: &mut BuildState) -> Result<()> {
        let plan = &self.plan;
        let mode = plan.manifest.mode;
        let pattern = &plan.manifest.output.scripts;
        let no_vars = serde_json::Value::Null;

        for entry in &plan.entries {
            let content =
                fs::read_to_string(&entry.source).map_err(|e| PipelineError::EntryUnreadable {
                    name: entry.name.clone(),
                    path: entry.source.clone(),
                    source: e,
                })?;

            let chain = plan
                .rules
                .route(&entry.source, None)
                .filter(|hit| matches!(hit.emit(), Emit::ScriptBundle))
                .map(|hit| hit.chain().to_vec())
                .unwrap_or_else(|| vec![TransformStep::new("script:target")]);
            let js = self
                .registry
                .apply_chain(&chain, content, &entry.source, mode, &no_vars)?;

            let digest = content_hash(js.as_bytes());
            let ext = entry
                .source
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_else(|| ".js".to_string());
            let output = pattern.render(&Substitutions {
                name: &entry.name,
                hash: &digest,
                ext: &ext,
                query: "",
            });

            emit::write_bytes(&plan.output_root, &output, js.as_bytes())?;
            info!(bundle = %output, entry = %entry.name, "emitted script bundle");
            state.record_bundle(entry.name.as_str(), BundleKind::Script, output.as_str());
            state.record_artifact(output, js.len() as u64, ArtifactKind::Bundle);
        }
        Ok(())
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}

fn rel_string(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
