//! Template transforms.

use std::path::Path;

use minijinja::{path_loader, Environment};

use super::{Transform, TransformContext};
use crate::error::{PipelineError, Result};

/// Render a template to HTML.
///
/// Includes and extends resolve against the source root, so page
/// templates can share partials and layouts anywhere in the tree. The
/// variables handed in by the caller become the template context.
pub struct TemplateRender {
    env: Environment<'static>,
}

impl TemplateRender {
    pub fn new(source_root: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(source_root));
        Self { env }
    }
}

impl Transform for TemplateRender {
    fn name(&self) -> &'static str {
        "template:render"
    }

    fn apply(&self, content: &str, ctx: &TransformContext<'_>) -> Result<String> {
        self.env
            .render_str(content, ctx.vars)
            .map_err(|e| PipelineError::template(ctx.source, e))
    }
}

/// Seam for templates embedded in component files: the component
/// compiler consumes the raw template text, so no rendering happens.
pub struct TemplatePlain;

impl Transform for TemplatePlain {
    fn name(&self) -> &'static str {
        "template:plain"
    }

    fn apply(&self, content: &str, _ctx: &TransformContext<'_>) -> Result<String> {
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use gantry_config::Mode;
    use tempfile::TempDir;

    fn render(root: &Path, content: &str, vars: serde_json::Value) -> Result<String> {
        let transform = TemplateRender::new(root);
        let ctx = TransformContext {
            source: &root.join("pages/index.jinja"),
            mode: Mode::Development,
            options: &serde_json::Value::Null,
            vars: &vars,
        };
        transform.apply(content, &ctx)
    }

    #[test]
    fn renders_variables_into_html() {
        let tmp = TempDir::new().unwrap();
        let html = render(
            tmp.path(),
            "<title>{{ page }} ({{ mode }})</title>",
            serde_json::json!({ "page": "index", "mode": "development" }),
        )
        .unwrap();
        assert_eq!(html, "<title>index (development)</title>");
    }

    #[test]
    fn includes_resolve_against_the_source_root() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("partials")).unwrap();
        fs::write(tmp.path().join("partials/nav.jinja"), "<nav>site</nav>").unwrap();

        let html = render(
            tmp.path(),
            "{% include 'partials/nav.jinja' %}<main></main>",
            serde_json::json!({}),
        )
        .unwrap();
        assert_eq!(html, "<nav>site</nav><main></main>");
    }

    #[test]
    fn template_errors_name_the_source_file() {
        let tmp = TempDir::new().unwrap();
        let err = render(tmp.path(), "{{ unclosed", serde_json::json!({})).unwrap_err();
        assert!(matches!(err, PipelineError::Template { path, .. }
            if path.ends_with("pages/index.jinja")));
    }

    #[test]
    fn plain_returns_template_text_untouched() {
        let content = "div.card {{ not rendered }}";
        let ctx = TransformContext {
            source: Path::new("card.jinja"),
            mode: Mode::Development,
            options: &serde_json::Value::Null,
            vars: &serde_json::Value::Null,
        };
        assert_eq!(TemplatePlain.apply(content, &ctx).unwrap(), content);
    }
}
