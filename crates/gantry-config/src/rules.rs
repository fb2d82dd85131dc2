//! The ordered file-type routing table.
//!
//! Every file the build touches is matched against the table top to
//! bottom and the first accepting rule wins. A rule pairs a [`Matcher`]
//! with a transform chain and an [`Emit`] policy; `one_of` sub-rules
//! let one file type branch on its resource query.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pattern::OutputPattern;

/// Predicate deciding whether a rule applies to a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Matcher {
    /// Extensions accepted, lowercase, without the leading dot.
    /// An empty list accepts every extension.
    pub extensions: Vec<String>,

    /// Reject any path containing this directory component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_dir: Option<String>,

    /// Require this marker token in the resource query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Matcher {
    pub fn for_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Check a path plus its resource query (without the leading `?`).
    pub fn matches(&self, path: &Path, query: Option<&str>) -> bool {
        if !self.extensions.is_empty() {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            match ext {
                Some(ext) if self.extensions.iter().any(|e| e == &ext) => {}
                _ => return false,
            }
        }

        if let Some(dir) = &self.exclude_dir {
            if path.components().any(|c| c.as_os_str() == dir.as_str()) {
                return false;
            }
        }

        if let Some(marker) = &self.query {
            let Some(query) = query else { return false };
            if !query.split('&').any(|token| token == marker) {
                return false;
            }
        }

        true
    }
}

/// One step of a transform chain: a registered transform name plus
/// options forwarded to it verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStep {
    pub transform: String,
    pub options: serde_json::Value,
}

impl TransformStep {
    pub fn new(transform: impl Into<String>) -> Self {
        Self {
            transform: transform.into(),
            options: serde_json::Value::Null,
        }
    }

    pub fn with_options(transform: impl Into<String>, options: serde_json::Value) -> Self {
        Self {
            transform: transform.into(),
            options,
        }
    }
}

// Manifests may write a step as a bare name or as a table with options.
#[derive(Deserialize)]
#[serde(untagged)]
enum StepRepr {
    Name(String),
    Full {
        transform: String,
        #[serde(default)]
        options: serde_json::Value,
    },
}

impl<'de> Deserialize<'de> for TransformStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match StepRepr::deserialize(deserializer)? {
            StepRepr::Name(transform) => Self::new(transform),
            StepRepr::Full { transform, options } => Self { transform, options },
        })
    }
}

impl Serialize for TransformStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.options.is_null() {
            serializer.serialize_str(&self.transform)
        } else {
            let mut map = serializer.serialize_map(Some(2))?;
            map.serialize_entry("transform", &self.transform)?;
            map.serialize_entry("options", &self.options)?;
            map.end()
        }
    }
}

/// What happens to a file's content once its chain has run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Emit {
    /// Publish at the same output-relative path, name untouched.
    CopyInPlace,

    /// Publish under a renamed path built from a pattern.
    Asset { pattern: OutputPattern },

    /// Append to the named stylesheet bundle instead of emitting alone.
    StyleBundle {
        #[serde(default = "default_style_group")]
        group: String,
    },

    /// Fold into the owning entry's script bundle.
    ScriptBundle,

    /// Render to an `.html` document at the output root.
    Page,

    /// Consumed by the chain with no direct artifact. Also the policy
    /// of gate-only rules whose sub-rules carry the real emits.
    #[default]
    Consumed,
}

fn default_style_group() -> String {
    "app".to_string()
}

/// One row of the routing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRule {
    /// Diagnostic label, unique within the table.
    pub name: String,

    #[serde(default)]
    pub matcher: Matcher,

    /// Sub-rules tried in order once the outer matcher accepts.
    /// When none accepts, routing falls through to later rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<TransformRule>,

    /// Ordered transform chain applied to the file content.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<TransformStep>,

    #[serde(default)]
    pub emit: Emit,
}

impl TransformRule {
    // Conservative: does this rule route every file its matcher accepts?
    fn consumes_all_matches(&self) -> bool {
        if self.one_of.is_empty() {
            return true;
        }
        self.one_of
            .iter()
            .any(|sub| sub.matcher.extensions.is_empty() && sub.matcher.query.is_none())
    }
}

/// A routing decision: the top-level rule that claimed the file and the
/// resolved rule carrying the effective chain and emit policy.
#[derive(Debug, Clone, Copy)]
pub struct RouteMatch<'a> {
    pub rule: &'a TransformRule,
    pub resolved: &'a TransformRule,
}

impl<'a> RouteMatch<'a> {
    pub fn chain(&self) -> &'a [TransformStep] {
        &self.resolved.chain
    }

    pub fn emit(&self) -> &'a Emit {
        &self.resolved.emit
    }
}

/// A rule that can never fire because an earlier rule accepts every
/// file it would accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    pub rule: String,
    pub shadowed_by: String,
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule '{}' can never match: every file it accepts is claimed by earlier rule '{}'",
            self.rule, self.shadowed_by
        )
    }
}

/// Ordered routing table. First match wins, top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<TransformRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<TransformRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TransformRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Route a file through the table. Returns `None` when no rule
    /// accepts it, in which case the file is published verbatim.
    pub fn route(&self, path: &Path, query: Option<&str>) -> Option<RouteMatch<'_>> {
        for rule in &self.rules {
            if !rule.matcher.matches(path, query) {
                continue;
            }
            if rule.one_of.is_empty() {
                return Some(RouteMatch {
                    rule,
                    resolved: rule,
                });
            }
            if let Some(sub) = rule.one_of.iter().find(|s| s.matcher.matches(path, query)) {
                return Some(RouteMatch {
                    rule,
                    resolved: sub,
                });
            }
            // No sub-rule claimed it; later rules may still.
        }
        None
    }

    /// Names of all rules, for duplicate detection.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// Flag rules that are fully shadowed by an earlier rule.
    ///
    /// The check is conservative: it only reports a rule when every
    /// extension it names is also named by an earlier, unconditional
    /// rule. Partially overlapping rules stay silent since first-match
    /// ordering may be exactly what the author wants.
    pub fn lint(&self) -> Vec<LintWarning> {
        let mut warnings = Vec::new();
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.matcher.extensions.is_empty() {
                continue;
            }
            for earlier in &self.rules[..i] {
                if subsumes(earlier, rule) {
                    warnings.push(LintWarning {
                        rule: rule.name.clone(),
                        shadowed_by: earlier.name.clone(),
                    });
                    break;
                }
            }
        }
        warnings
    }
}

fn subsumes(earlier: &TransformRule, later: &TransformRule) -> bool {
    let a = &earlier.matcher;
    let b = &later.matcher;

    if a.query.is_some() || a.exclude_dir.is_some() {
        return false;
    }
    if !earlier.consumes_all_matches() {
        return false;
    }
    if a.extensions.is_empty() {
        return true;
    }
    let earlier_exts: HashSet<&str> = a.extensions.iter().map(String::as_str).collect();
    !b.extensions.is_empty()
        && b.extensions
            .iter()
            .all(|ext| earlier_exts.contains(ext.as_str()))
}

/// The built-in table, mirroring the conventional layout: scripts fold
/// into entry bundles, opaque media copies in place, page templates
/// branch on an `embed` query, styles group into one bundle, images
/// rename with a short hash, fonts keep name and query, and single-file
/// components feed the script bundle with their styles chained through
/// the stylesheet pipeline.
pub fn default_table(assets: &str, template_ext: &str, vendor_dir: &str) -> Result<RuleTable> {
    // The assets directory is spliced into patterns as a literal, so a
    // bracket in the configured path surfaces as a pattern error here.
    let assets = assets.trim_end_matches('/');
    let image_pattern = OutputPattern::parse(&format!("{assets}/img/[name].[hash:8][ext]"))?;
    let font_pattern = OutputPattern::parse(&format!("{assets}/fonts/[name][ext][query]"))?;

    Ok(RuleTable::new(vec![
        TransformRule {
            name: "scripts".to_string(),
            matcher: Matcher {
                extensions: vec!["js".to_string()],
                exclude_dir: Some(vendor_dir.to_string()),
                query: None,
            },
            one_of: Vec::new(),
            chain: vec![TransformStep::new("script:target")],
            emit: Emit::ScriptBundle,
        },
        TransformRule {
            name: "media".to_string(),
            matcher: Matcher::for_extensions(["svg", "gif", "mp3", "ico"]),
            one_of: Vec::new(),
            chain: Vec::new(),
            emit: Emit::CopyInPlace,
        },
        TransformRule {
            name: "templates".to_string(),
            matcher: Matcher::for_extensions([template_ext]),
            one_of: vec![
                TransformRule {
                    name: "templates:embedded".to_string(),
                    matcher: Matcher {
                        extensions: Vec::new(),
                        exclude_dir: None,
                        query: Some("embed".to_string()),
                    },
                    one_of: Vec::new(),
                    chain: vec![TransformStep::new("template:plain")],
                    emit: Emit::Consumed,
                },
                TransformRule {
                    name: "templates:pages".to_string(),
                    matcher: Matcher::default(),
                    one_of: Vec::new(),
                    chain: vec![TransformStep::new("template:render")],
                    emit: Emit::Page,
                },
            ],
            chain: Vec::new(),
            emit: Emit::Consumed,
        },
        TransformRule {
            name: "styles".to_string(),
            matcher: Matcher::for_extensions(["css", "sass", "scss"]),
            one_of: Vec::new(),
            chain: vec![
                TransformStep::new("style:dialect"),
                TransformStep::new("style:resolve"),
            ],
            emit: Emit::StyleBundle {
                group: default_style_group(),
            },
        },
        TransformRule {
            name: "images".to_string(),
            matcher: Matcher::for_extensions(["png", "jpg", "jpeg"]),
            one_of: Vec::new(),
            chain: Vec::new(),
            emit: Emit::Asset {
                pattern: image_pattern,
            },
        },
        TransformRule {
            name: "fonts".to_string(),
            matcher: Matcher::for_extensions(["woff", "woff2", "eot", "ttf", "otf"]),
            one_of: Vec::new(),
            chain: Vec::new(),
            emit: Emit::Asset {
                pattern: font_pattern,
            },
        },
        TransformRule {
            name: "components".to_string(),
            matcher: Matcher::for_extensions(["vue"]),
            one_of: Vec::new(),
            chain: vec![TransformStep::with_options(
                "component",
                serde_json::json!({
                    "styles": ["style:dialect", "style:inject", "style:resolve"],
                }),
            )],
            emit: Emit::ScriptBundle,
        },
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RuleTable {
        default_table("assets", "jinja", "vendor").unwrap()
    }

    #[test]
    fn first_matching_rule_wins() {
        let table = table();
        let hit = table.route(Path::new("src/img/banner.png"), None).unwrap();
        assert_eq!(hit.rule.name, "images");
        assert!(matches!(hit.emit(), Emit::Asset { .. }));
    }

    #[test]
    fn earlier_rule_claims_overlapping_extension() {
        // Two rules both naming "png": the earlier one must win even
        // though the later one also accepts the file.
        let table = RuleTable::new(vec![
            TransformRule {
                name: "opaque".to_string(),
                matcher: Matcher::for_extensions(["png", "ico"]),
                one_of: Vec::new(),
                chain: Vec::new(),
                emit: Emit::CopyInPlace,
            },
            TransformRule {
                name: "hashed".to_string(),
                matcher: Matcher::for_extensions(["png", "jpg"]),
                one_of: Vec::new(),
                chain: Vec::new(),
                emit: Emit::Asset {
                    pattern: OutputPattern::parse("assets/img/[name].[hash:8][ext]").unwrap(),
                },
            },
        ]);

        let png = table.route(Path::new("logo.png"), None).unwrap();
        assert_eq!(png.rule.name, "opaque");
        assert!(matches!(png.emit(), Emit::CopyInPlace));

        let jpg = table.route(Path::new("photo.jpg"), None).unwrap();
        assert_eq!(jpg.rule.name, "hashed");
    }

    #[test]
    fn ico_routes_to_opaque_media() {
        let table = table();
        let hit = table.route(Path::new("src/favicon.ico"), None).unwrap();
        assert_eq!(hit.rule.name, "media");
        assert!(matches!(hit.emit(), Emit::CopyInPlace));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let table = table();
        let hit = table.route(Path::new("photo.JPG"), None).unwrap();
        assert_eq!(hit.rule.name, "images");
    }

    #[test]
    fn vendor_scripts_fall_through() {
        let table = table();
        assert_eq!(
            table
                .route(Path::new("src/js/main.js"), None)
                .unwrap()
                .rule
                .name,
            "scripts"
        );
        assert!(table.route(Path::new("src/vendor/lib.js"), None).is_none());
    }

    #[test]
    fn template_query_selects_sub_rule() {
        let table = table();

        let page = table.route(Path::new("src/pages/index.jinja"), None).unwrap();
        assert_eq!(page.rule.name, "templates");
        assert_eq!(page.resolved.name, "templates:pages");
        assert!(matches!(page.emit(), Emit::Page));

        let embedded = table
            .route(Path::new("src/parts/card.jinja"), Some("embed"))
            .unwrap();
        assert_eq!(embedded.resolved.name, "templates:embedded");
        assert!(matches!(embedded.emit(), Emit::Consumed));
    }

    #[test]
    fn query_marker_matches_amp_separated_tokens() {
        let matcher = Matcher {
            query: Some("embed".to_string()),
            ..Matcher::default()
        };
        assert!(matcher.matches(Path::new("a.jinja"), Some("embed")));
        assert!(matcher.matches(Path::new("a.jinja"), Some("v=2&embed")));
        assert!(!matcher.matches(Path::new("a.jinja"), Some("embedded")));
        assert!(!matcher.matches(Path::new("a.jinja"), None));
    }

    #[test]
    fn unmatched_sub_rules_fall_through_to_later_rules() {
        let table = RuleTable::new(vec![
            TransformRule {
                name: "gate".to_string(),
                matcher: Matcher::for_extensions(["css"]),
                one_of: vec![TransformRule {
                    name: "gate:marked".to_string(),
                    matcher: Matcher {
                        query: Some("inline".to_string()),
                        ..Matcher::default()
                    },
                    one_of: Vec::new(),
                    chain: Vec::new(),
                    emit: Emit::Consumed,
                }],
                chain: Vec::new(),
                emit: Emit::Consumed,
            },
            TransformRule {
                name: "styles".to_string(),
                matcher: Matcher::for_extensions(["css"]),
                one_of: Vec::new(),
                chain: Vec::new(),
                emit: Emit::StyleBundle {
                    group: "app".to_string(),
                },
            },
        ]);

        let plain = table.route(Path::new("a.css"), None).unwrap();
        assert_eq!(plain.rule.name, "styles");

        let marked = table.route(Path::new("a.css"), Some("inline")).unwrap();
        assert_eq!(marked.resolved.name, "gate:marked");
    }

    #[test]
    fn unknown_extensions_route_nowhere() {
        let table = table();
        assert!(table.route(Path::new("notes.txt"), None).is_none());
        assert!(table.route(Path::new("Makefile"), None).is_none());
    }

    #[test]
    fn lint_flags_fully_shadowed_rules() {
        let table = RuleTable::new(vec![
            TransformRule {
                name: "wide".to_string(),
                matcher: Matcher::for_extensions(["png", "jpg", "gif"]),
                one_of: Vec::new(),
                chain: Vec::new(),
                emit: Emit::CopyInPlace,
            },
            TransformRule {
                name: "narrow".to_string(),
                matcher: Matcher::for_extensions(["png", "jpg"]),
                one_of: Vec::new(),
                chain: Vec::new(),
                emit: Emit::CopyInPlace,
            },
            TransformRule {
                name: "partial".to_string(),
                matcher: Matcher::for_extensions(["jpg", "webp"]),
                one_of: Vec::new(),
                chain: Vec::new(),
                emit: Emit::CopyInPlace,
            },
        ]);

        let warnings = table.lint();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].rule, "narrow");
        assert_eq!(warnings[0].shadowed_by, "wide");
    }

    #[test]
    fn default_table_passes_its_own_lint() {
        assert!(table().lint().is_empty());
    }

    #[test]
    fn steps_deserialize_from_bare_names() {
        let rule: TransformRule = serde_json::from_value(serde_json::json!({
            "name": "styles",
            "matcher": { "extensions": ["css", "scss"] },
            "chain": ["style:dialect", { "transform": "style:resolve", "options": { "minify": true } }],
            "emit": { "kind": "style-bundle", "group": "site" },
        }))
        .unwrap();

        assert_eq!(rule.chain.len(), 2);
        assert_eq!(rule.chain[0], TransformStep::new("style:dialect"));
        assert_eq!(rule.chain[1].transform, "style:resolve");
        assert_eq!(rule.chain[1].options["minify"], serde_json::json!(true));
        assert_eq!(
            rule.emit,
            Emit::StyleBundle {
                group: "site".to_string()
            }
        );
    }

    #[test]
    fn style_bundle_group_defaults_to_app() {
        let emit: Emit = serde_json::from_value(serde_json::json!({ "kind": "style-bundle" })).unwrap();
        assert_eq!(
            emit,
            Emit::StyleBundle {
                group: "app".to_string()
            }
        );
    }
}
