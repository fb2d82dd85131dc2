//! The transform chain machinery.
//!
//! A transform is a named, content-in/content-out step. Routing rules
//! reference transforms by name; the registry resolves names and runs
//! chains in rule order. Steps that stand in for external compilers
//! (script targeting, style dialects, component compilation) pass
//! content through unchanged so the rest of the pipeline stays honest
//! about ordering and emission.

mod component;
mod script;
mod style;
mod template;

pub use component::Component;
pub use script::ScriptTarget;
pub use style::{StyleDialect, StyleInject, StyleResolve};
pub use template::{TemplatePlain, TemplateRender};

pub(crate) use style::process_css;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use gantry_config::{Mode, TransformStep};
use tracing::trace;

use crate::error::{PipelineError, Result};

/// Per-invocation context handed to every transform.
pub struct TransformContext<'a> {
    /// Absolute path of the file being transformed.
    pub source: &'a Path,

    pub mode: Mode,

    /// Options from the routing step, forwarded verbatim.
    pub options: &'a serde_json::Value,

    /// Caller-supplied variables. Template rendering exposes these to
    /// the template; other transforms ignore them.
    pub vars: &'a serde_json::Value,
}

pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, content: &str, ctx: &TransformContext<'_>) -> Result<String>;
}

/// Name-indexed set of transforms available to rule chains.
pub struct TransformRegistry {
    transforms: HashMap<String, Arc<dyn Transform>>,
}

impl TransformRegistry {
    pub fn empty() -> Self {
        Self {
            transforms: HashMap::new(),
        }
    }

    /// Registry with every built-in transform. Template rendering
    /// resolves includes against the given source root.
    pub fn with_defaults(source_root: &Path) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(ScriptTarget));
        registry.register(Arc::new(StyleDialect));
        registry.register(Arc::new(StyleInject));
        registry.register(Arc::new(StyleResolve));
        registry.register(Arc::new(TemplateRender::new(source_root)));
        registry.register(Arc::new(TemplatePlain));
        registry.register(Arc::new(Component));
        registry
    }

    pub fn register(&mut self, transform: Arc<dyn Transform>) {
        self.transforms
            .insert(transform.name().to_string(), transform);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Transform>> {
        self.transforms.get(name)
    }

    /// Run a chain over the content, steps in rule order.
    pub fn apply_chain(
        &self,
        steps: &[TransformStep],
        mut content: String,
        source: &Path,
        mode: Mode,
        vars: &serde_json::Value,
    ) -> Result<String> {
        for step in steps {
            let transform = self
                .get(&step.transform)
                .ok_or_else(|| PipelineError::UnknownTransform(step.transform.clone()))?;
            trace!(transform = %step.transform, source = %source.display(), "applying transform");
            let ctx = TransformContext {
                source,
                mode,
                options: &step.options,
                vars,
            };
            content = transform.apply(&content, &ctx)?;
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag(&'static str);

    impl Transform for Tag {
        fn name(&self) -> &'static str {
            self.0
        }

        fn apply(&self, content: &str, _ctx: &TransformContext<'_>) -> Result<String> {
            Ok(format!("{content}+{}", self.0))
        }
    }

    #[test]
    fn chain_runs_steps_in_rule_order() {
        let mut registry = TransformRegistry::empty();
        registry.register(Arc::new(Tag("first")));
        registry.register(Arc::new(Tag("second")));

        let steps = vec![
            TransformStep::new("first"),
            TransformStep::new("second"),
        ];
        let out = registry
            .apply_chain(
                &steps,
                "x".to_string(),
                Path::new("a.css"),
                Mode::Development,
                &serde_json::Value::Null,
            )
            .unwrap();
        assert_eq!(out, "x+first+second");
    }

    #[test]
    fn unknown_step_fails_the_chain() {
        let registry = TransformRegistry::empty();
        let steps = vec![TransformStep::new("missing")];
        let err = registry
            .apply_chain(
                &steps,
                String::new(),
                Path::new("a.css"),
                Mode::Development,
                &serde_json::Value::Null,
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownTransform(name) if name == "missing"));
    }

    #[test]
    fn defaults_cover_every_built_in_chain() {
        let registry = TransformRegistry::with_defaults(Path::new("."));
        for name in [
            "script:target",
            "style:dialect",
            "style:inject",
            "style:resolve",
            "template:render",
            "template:plain",
            "component",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }
}
