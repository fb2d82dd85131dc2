//! Stylesheet transforms.

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};

use super::{Transform, TransformContext};
use crate::error::{PipelineError, Result};

/// Parse and reprint a stylesheet.
///
/// Parsing is strict, so syntax errors fail the build with the
/// offending file named. Output is normalized, which keeps grouped
/// bundles stable regardless of incidental formatting in the sources.
/// Pass `options.minify = true` to minify at this step; grouped
/// bundles are otherwise minified once, at extraction, in production.
pub struct StyleResolve;

impl Transform for StyleResolve {
    fn name(&self) -> &'static str {
        "style:resolve"
    }

    fn apply(&self, content: &str, ctx: &TransformContext<'_>) -> Result<String> {
        let minify = ctx
            .options
            .get("minify")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let filename = ctx.source.display().to_string();
        process_css(content, &filename, minify)
            .map_err(|message| PipelineError::style(ctx.source, message))
    }
}

/// Shared parse/minify/print used by the resolve transform and by
/// bundle extraction.
pub(crate) fn process_css(
    css: &str,
    filename: &str,
    minify: bool,
) -> std::result::Result<String, String> {
    let mut sheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    if minify {
        sheet
            .minify(MinifyOptions::default())
            .map_err(|e| e.to_string())?;
    }

    let out = sheet
        .to_css(PrinterOptions {
            minify,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    Ok(out.code)
}

/// Seam for preprocessor dialects (sass, scss). Dialect compilation is
/// an external concern; standard CSS flows through unchanged and lands
/// in the resolve step for checking.
pub struct StyleDialect;

impl Transform for StyleDialect {
    fn name(&self) -> &'static str {
        "style:dialect"
    }

    fn apply(&self, content: &str, _ctx: &TransformContext<'_>) -> Result<String> {
        Ok(content.to_string())
    }
}

/// Seam for runtime style injection inside component pipelines.
pub struct StyleInject;

impl Transform for StyleInject {
    fn name(&self) -> &'static str {
        "style:inject"
    }

    fn apply(&self, content: &str, _ctx: &TransformContext<'_>) -> Result<String> {
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use gantry_config::Mode;

    fn ctx<'a>(options: &'a serde_json::Value) -> TransformContext<'a> {
        TransformContext {
            source: Path::new("src/styles/app.css"),
            mode: Mode::Development,
            options,
            vars: &serde_json::Value::Null,
        }
    }

    #[test]
    fn resolve_normalizes_formatting() {
        let options = serde_json::Value::Null;
        let a = StyleResolve
            .apply("body {  color:  red; }", &ctx(&options))
            .unwrap();
        let b = StyleResolve
            .apply("body{color:red}", &ctx(&options))
            .unwrap();
        assert_eq!(a, b);
        assert!(a.contains("red"));
    }

    #[test]
    fn resolve_rejects_broken_css() {
        let options = serde_json::Value::Null;
        let err = StyleResolve
            .apply("..broken { color: red; }", &ctx(&options))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Style { .. }));
    }

    #[test]
    fn minify_option_shrinks_output() {
        let css = "body {\n  color: red;\n  margin: 0px;\n}\n";
        let options = serde_json::json!({ "minify": true });
        let minified = StyleResolve.apply(css, &ctx(&options)).unwrap();
        assert!(minified.len() < css.len());
        assert!(!minified.contains('\n'));
    }

    #[test]
    fn dialect_and_inject_pass_through() {
        let options = serde_json::Value::Null;
        let css = "$accent: blue;";
        assert_eq!(StyleDialect.apply(css, &ctx(&options)).unwrap(), css);
        assert_eq!(StyleInject.apply(css, &ctx(&options)).unwrap(), css);
    }
}
