//! Page rendering and bundle reference injection.

use std::fs;

use gantry_config::{BuildPlan, Emit, PageDescriptor, TransformStep};
use tracing::debug;

use super::{Plugin, PluginCx, PluginStage};
use crate::emit;
use crate::error::{PipelineError, Result};
use crate::state::{ArtifactKind, BuildState, BundleKind};

/// Renders every discovered page template to an HTML document and
/// injects references to the generated bundles: stylesheet links
/// before `</head>`, script tags before `</body>`. A page that already
/// references a bundle URL is left alone, and documents without the
/// anchor tags get the references appended so they are never dropped.
#[derive(Debug)]
pub struct HtmlPages;

impl Plugin for HtmlPages {
    fn name(&self) -> &'static str {
        "html-pages"
    }

    fn stage(&self) -> PluginStage {
        PluginStage::Emit
    }

    fn run(&self, cx: &mut PluginCx<'_>) -> Result<()> {
        for page in &cx.plan.pages {
            let content = fs::read_to_string(&page.source)
                .map_err(|e| PipelineError::io(&page.source, e))?;

            let chain = page_chain(cx.plan, page);
            let vars = page_vars(cx.plan, cx.state, page);
            let html = cx.registry.apply_chain(
                &chain,
                content,
                &page.source,
                cx.plan.manifest.mode,
                &vars,
            )?;
            let html = inject_references(html, cx.plan, cx.state);

            emit::write_bytes(&cx.plan.output_root, &page.output, html.as_bytes())?;
            cx.state
                .record_artifact(page.output.as_str(), html.len() as u64, ArtifactKind::Document);
            debug!(page = %page.output, "rendered page");
        }
        Ok(())
    }
}

// Pages honor a custom template chain when the routing table defines
// one; otherwise they render with the default template transform.
fn page_chain(plan: &BuildPlan, page: &PageDescriptor) -> Vec<TransformStep> {
    plan.rules
        .route(&page.source, None)
        .filter(|hit| matches!(hit.emit(), Emit::Page))
        .map(|hit| hit.chain().to_vec())
        .unwrap_or_else(|| vec![TransformStep::new("template:render")])
}

fn page_vars(plan: &BuildPlan, state: &BuildState, page: &PageDescriptor) -> serde_json::Value {
    let scripts: Vec<String> = state
        .bundles_of(BundleKind::Script)
        .map(|b| plan.manifest.paths.public_url(&b.output))
        .collect();
    let styles: Vec<String> = state
        .bundles_of(BundleKind::Style)
        .map(|b| plan.manifest.paths.public_url(&b.output))
        .collect();

    serde_json::json!({
        "page": page.name(),
        "mode": plan.manifest.mode.as_str(),
        "public_path": plan.manifest.paths.public,
        "scripts": scripts,
        "styles": styles,
    })
}

fn inject_references(mut html: String, plan: &BuildPlan, state: &BuildState) -> String {
    for bundle in state.bundles_of(BundleKind::Style) {
        let url = plan.manifest.paths.public_url(&bundle.output);
        if html.contains(&url) {
            continue;
        }
        let tag = format!("<link rel=\"stylesheet\" href=\"{url}\">");
        insert_before(&mut html, "</head>", &tag);
    }
    for bundle in state.bundles_of(BundleKind::Script) {
        let url = plan.manifest.paths.public_url(&bundle.output);
        if html.contains(&url) {
            continue;
        }
        let tag = format!("<script src=\"{url}\"></script>");
        insert_before(&mut html, "</body>", &tag);
    }
    html
}

fn insert_before(html: &mut String, anchor: &str, tag: &str) {
    match html.rfind(anchor) {
        Some(pos) => html.insert_str(pos, &format!("{tag}\n")),
        None => {
            html.push('\n');
            html.push_str(tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_tag_before_the_last_anchor() {
        let mut html = "<html><head></head><body></body></html>".to_string();
        insert_before(&mut html, "</head>", "<link href=\"a.css\">");
        assert!(html.contains("<link href=\"a.css\">\n</head>"));
    }

    #[test]
    fn appends_when_the_anchor_is_missing() {
        let mut html = "<main>bare fragment</main>".to_string();
        insert_before(&mut html, "</body>", "<script src=\"a.js\"></script>");
        assert!(html.ends_with("<script src=\"a.js\"></script>"));
    }
}
