//! Named entry points and their resolution against the source tree.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};

/// File a directory entry resolves to.
pub const DEFAULT_ENTRY_FILE: &str = "index.js";

/// Ordered map of entry names to source paths.
///
/// Paths are relative to the source root unless absolute or starting
/// with an alias. A path naming a directory resolves to its
/// `index.js`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntrySet {
    entries: IndexMap<String, PathBuf>,
}

impl Default for EntrySet {
    fn default() -> Self {
        let mut entries = IndexMap::new();
        entries.insert("app".to_string(), PathBuf::from("."));
        entries.insert("module".to_string(), PathBuf::from(DEFAULT_ENTRY_FILE));
        Self { entries }
    }
}

impl EntrySet {
    pub fn new(entries: IndexMap<String, PathBuf>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

/// An entry point with its source path fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    pub name: String,
    pub source: PathBuf,
}

/// Resolve every entry in declaration order.
///
/// Resolution substitutes a leading alias component, joins relative
/// paths onto the source root, and sends directories to their
/// [`DEFAULT_ENTRY_FILE`]. Whether the resolved file exists is checked
/// separately by filesystem validation.
pub fn resolve_entries(
    entries: &EntrySet,
    source_root: &Path,
    aliases: &BTreeMap<String, PathBuf>,
) -> Vec<ResolvedEntry> {
    entries
        .iter()
        .map(|(name, raw)| ResolvedEntry {
            name: name.to_string(),
            source: resolve_one(raw, source_root, aliases),
        })
        .collect()
}

fn resolve_one(raw: &Path, source_root: &Path, aliases: &BTreeMap<String, PathBuf>) -> PathBuf {
    let substituted = substitute_alias(raw, aliases);
    let joined = if substituted.is_absolute() {
        substituted
    } else {
        source_root.join(substituted)
    };
    let cleaned = joined.clean();
    if cleaned.is_dir() {
        cleaned.join(DEFAULT_ENTRY_FILE)
    } else {
        cleaned
    }
}

fn substitute_alias(raw: &Path, aliases: &BTreeMap<String, PathBuf>) -> PathBuf {
    let mut components = raw.components();
    if let Some(Component::Normal(first)) = components.next() {
        if let Some(target) = first.to_str().and_then(|s| aliases.get(s)) {
            let mut out = target.clone();
            out.extend(components);
            return out;
        }
    }
    raw.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn default_set_names_app_and_module_in_order() {
        let entries = EntrySet::default();
        let names: Vec<&str> = entries.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["app", "module"]);
    }

    #[test]
    fn directory_entries_resolve_to_index_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("index.js"), "export {}\n").unwrap();

        let resolved = resolve_entries(&EntrySet::default(), &src, &BTreeMap::new());
        assert_eq!(resolved.len(), 2);
        // "app" points at the source root itself, "module" at the file;
        // both land on the same index.js.
        assert_eq!(resolved[0].name, "app");
        assert_eq!(resolved[0].source, src.join("index.js"));
        assert_eq!(resolved[1].name, "module");
        assert_eq!(resolved[1].source, src.join("index.js"));
    }

    #[test]
    fn alias_component_substitutes_before_joining() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("js")).unwrap();
        fs::write(src.join("js/admin.js"), "").unwrap();

        let mut aliases = BTreeMap::new();
        aliases.insert("~".to_string(), src.clone());

        let mut entries = IndexMap::new();
        entries.insert("admin".to_string(), PathBuf::from("~/js/admin.js"));

        let resolved = resolve_entries(&EntrySet::new(entries), &src, &aliases);
        assert_eq!(resolved[0].source, src.join("js/admin.js"));
    }

    #[test]
    fn missing_paths_resolve_as_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");

        let mut entries = IndexMap::new();
        entries.insert("app".to_string(), PathBuf::from("missing.js"));

        let resolved = resolve_entries(&EntrySet::new(entries), &src, &BTreeMap::new());
        assert_eq!(resolved[0].source, src.join("missing.js"));
    }
}
