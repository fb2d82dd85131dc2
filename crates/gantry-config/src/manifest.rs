//! Top-level build manifest and the finalized build plan.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dev::DevOptions;
use crate::entries::{resolve_entries, EntrySet, ResolvedEntry};
use crate::error::{ConfigError, Result};
use crate::pages::{discover_pages, PageDescriptor};
use crate::pattern::OutputPattern;
use crate::paths::ProjectPaths;
use crate::rules::{default_table, RuleTable, TransformRule};

/// Build mode. Production minifies grouped stylesheets; development
/// keeps them readable and enables the dev-server conveniences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn is_production(self) -> bool {
        matches!(self, Mode::Production)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

/// Filename patterns for generated bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Pattern for per-entry script bundles.
    pub scripts: OutputPattern,

    /// Pattern for grouped stylesheet bundles.
    pub styles: OutputPattern,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            scripts: OutputPattern::parse("assets/js/[name].[hash].js")
                .expect("built-in script pattern is valid"),
            styles: OutputPattern::parse("assets/css/[name].[hash].css")
                .expect("built-in style pattern is valid"),
        }
    }
}

/// Where page templates live and how they are recognized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    /// Pages directory, relative to the source root.
    pub dir: PathBuf,

    /// Template extension, without the leading dot.
    pub extension: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("pages"),
            extension: "jinja".to_string(),
        }
    }
}

/// A plugin name plus options forwarded to it verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginInvocation {
    pub plugin: String,
    pub options: serde_json::Value,
}

impl PluginInvocation {
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            options: serde_json::Value::Null,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PluginRepr {
    Name(String),
    Full {
        plugin: String,
        #[serde(default)]
        options: serde_json::Value,
    },
}

impl<'de> Deserialize<'de> for PluginInvocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match PluginRepr::deserialize(deserializer)? {
            PluginRepr::Name(plugin) => Self::new(plugin),
            PluginRepr::Full { plugin, options } => Self { plugin, options },
        })
    }
}

impl Serialize for PluginInvocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.options.is_null() {
            serializer.serialize_str(&self.plugin)
        } else {
            let mut map = serializer.serialize_map(Some(2))?;
            map.serialize_entry("plugin", &self.plugin)?;
            map.serialize_entry("options", &self.options)?;
            map.end()
        }
    }
}

/// Plugins applied when the manifest lists none, in invocation order.
pub const DEFAULT_PLUGINS: [&str; 4] = ["clean", "copy-static", "style-extract", "html-pages"];

/// The whole `gantry.toml`. Every table is optional; an empty file is a
/// valid manifest describing the conventional project layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub mode: Mode,
    pub paths: ProjectPaths,
    pub entries: EntrySet,

    /// Path aliases usable at the head of entry paths. `~` maps to the
    /// source root unless overridden.
    pub aliases: BTreeMap<String, PathBuf>,

    pub output: OutputOptions,
    pub pages: PageOptions,
    pub dev: DevOptions,

    /// Plugin invocations in order. Empty means [`DEFAULT_PLUGINS`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginInvocation>,

    /// Full replacement for the built-in routing table when non-empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<TransformRule>,
}

impl Manifest {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| ConfigError::invalid_value("manifest", e.to_string()))
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| ConfigError::invalid_value("manifest", e.to_string()))
    }

    /// The routing table in effect: the manifest's own rules, or the
    /// built-in table parameterized by this manifest's paths. Fails
    /// when the configured assets directory breaks the built-in
    /// patterns.
    pub fn rule_table(&self) -> Result<RuleTable> {
        if self.rules.is_empty() {
            default_table(
                &self.paths.assets,
                &self.pages.extension,
                &self.paths.vendor,
            )
        } else {
            Ok(RuleTable::new(self.rules.clone()))
        }
    }

    /// Plugin list in effect, falling back to [`DEFAULT_PLUGINS`].
    pub fn plugin_invocations(&self) -> Vec<PluginInvocation> {
        if self.plugins.is_empty() {
            DEFAULT_PLUGINS
                .iter()
                .map(|name| PluginInvocation::new(*name))
                .collect()
        } else {
            self.plugins.clone()
        }
    }

    /// Alias map with relative targets resolved against the project
    /// root and the implicit `~` → source root mapping applied.
    pub fn effective_aliases(
        &self,
        project_root: &Path,
        source_root: &Path,
    ) -> BTreeMap<String, PathBuf> {
        let mut out = BTreeMap::new();
        for (name, target) in &self.aliases {
            let target = if target.is_absolute() {
                target.clone()
            } else {
                project_root.join(target)
            };
            out.insert(name.clone(), target);
        }
        out.entry("~".to_string())
            .or_insert_with(|| source_root.to_path_buf());
        out
    }

    /// Resolve the manifest against a concrete project root.
    ///
    /// This is where page discovery runs: the derived document list is
    /// part of the plan, so an unreadable pages directory fails the
    /// whole finalization rather than producing a partial plan.
    pub fn finalize(&self, project_root: &Path) -> Result<BuildPlan> {
        let source_root = self.paths.source_root(project_root);
        let output_root = self.paths.output_root(project_root);
        let pages_dir = source_root.join(&self.pages.dir);

        let pages = discover_pages(&pages_dir, &self.pages.extension)?;
        debug!(
            pages = pages.len(),
            dir = %pages_dir.display(),
            "discovered page templates"
        );

        let aliases = self.effective_aliases(project_root, &source_root);
        let entries = resolve_entries(&self.entries, &source_root, &aliases);
        let rules = self.rule_table()?;

        Ok(BuildPlan {
            manifest: self.clone(),
            project_root: project_root.to_path_buf(),
            source_root,
            output_root,
            pages_dir,
            entries,
            pages,
            rules,
        })
    }
}

/// A manifest resolved against a project root. Everything downstream
/// steps need is computed up front: absolute roots, resolved entries,
/// the derived page list and the routing table.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub manifest: Manifest,
    pub project_root: PathBuf,
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub pages_dir: PathBuf,
    pub entries: Vec<ResolvedEntry>,
    pub pages: Vec<PageDescriptor>,
    pub rules: RuleTable,
}

impl BuildPlan {
    /// Output-relative paths of the documents this plan will generate.
    pub fn page_outputs(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.output.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    fn scaffold(tmp: &TempDir) -> PathBuf {
        let root = tmp.path().to_path_buf();
        fs::create_dir_all(root.join("src/pages")).unwrap();
        fs::write(root.join("src/index.js"), "export {}\n").unwrap();
        fs::write(root.join("src/pages/index.jinja"), "<html></html>\n").unwrap();
        root
    }

    #[test]
    fn empty_manifest_gets_full_defaults() {
        let manifest = Manifest::from_value(serde_json::json!({})).unwrap();
        assert_eq!(manifest.mode, Mode::Development);
        assert_eq!(manifest.paths.source, PathBuf::from("src"));
        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.pages.extension, "jinja");
        assert_eq!(manifest.rule_table().unwrap().rules().len(), 7);
        assert_eq!(manifest.plugin_invocations().len(), DEFAULT_PLUGINS.len());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Manifest::from_value(serde_json::json!({ "entires": {} })).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn explicit_rules_replace_the_built_in_table() {
        let manifest = Manifest::from_value(serde_json::json!({
            "rules": [{
                "name": "everything",
                "matcher": { "extensions": [] },
                "emit": { "kind": "copy-in-place" },
            }],
        }))
        .unwrap();
        let table = manifest.rule_table().unwrap();
        assert_eq!(table.rules().len(), 1);
        assert_eq!(table.rules()[0].name, "everything");
    }

    #[test]
    fn finalize_discovers_pages_and_entries() {
        let tmp = TempDir::new().unwrap();
        let root = scaffold(&tmp);

        let plan = Manifest::default().finalize(&root).unwrap();
        assert_eq!(plan.source_root, root.join("src"));
        assert_eq!(plan.output_root, root.join("dist"));
        assert_eq!(plan.pages.len(), 1);
        assert_eq!(plan.pages[0].output, "index.html");
        assert_eq!(plan.entries[0].source, root.join("src/index.js"));
    }

    #[test]
    fn finalize_fails_without_pages_directory() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();

        let err = Manifest::default().finalize(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::PagesDirUnreadable { .. }));
    }

    #[test]
    fn tilde_alias_defaults_to_source_root() {
        let manifest = Manifest::default();
        let aliases = manifest.effective_aliases(Path::new("/proj"), Path::new("/proj/src"));
        assert_eq!(aliases["~"], PathBuf::from("/proj/src"));
    }

    #[test]
    fn manifest_round_trips_through_value() {
        let manifest = Manifest::default();
        let value = manifest.to_value().unwrap();
        let back = Manifest::from_value(value).unwrap();
        assert_eq!(back, manifest);
    }
}
