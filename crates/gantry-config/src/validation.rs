//! Manifest validation, split into schema checks and filesystem checks.
//!
//! Schema validation needs nothing but the manifest and is safe to run
//! anywhere, including against generated manifests in tests.
//! Filesystem validation resolves the manifest against a project root
//! and confirms the paths it references actually exist.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::manifest::Manifest;
use crate::pattern::OutputPattern;
use crate::rules::TransformRule;

pub trait ConfigValidator {
    fn validate(&self, manifest: &Manifest) -> Result<()>;
}

/// Structural checks with no filesystem access.
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, manifest: &Manifest) -> Result<()> {
        if manifest.entries.is_empty() {
            return Err(ConfigError::NoEntries);
        }

        check_bundle_pattern("output.scripts", &manifest.output.scripts)?;
        check_bundle_pattern("output.styles", &manifest.output.styles)?;

        if manifest.pages.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::invalid_value(
                "pages.extension",
                "template extension must not be empty",
            ));
        }

        let table = manifest.rule_table()?;
        let mut seen = HashSet::new();
        for rule in table.rules() {
            check_rule(rule, &mut seen)?;
        }

        for invocation in manifest.plugin_invocations() {
            if invocation.plugin.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "plugins",
                    "plugin names must not be empty",
                ));
            }
        }

        Ok(())
    }
}

// Bundle names must survive in the filename, and rebuild detection
// depends on the hash fragment being present.
fn check_bundle_pattern(field: &str, pattern: &OutputPattern) -> Result<()> {
    if !pattern.has_name() {
        return Err(ConfigError::invalid_value(
            field,
            format!("pattern '{pattern}' must contain [name]"),
        ));
    }
    if !pattern.needs_hash() {
        return Err(ConfigError::invalid_value(
            field,
            format!("pattern '{pattern}' must contain [hash] or [hash:N]"),
        ));
    }
    Ok(())
}

fn check_rule(rule: &TransformRule, seen: &mut HashSet<String>) -> Result<()> {
    if rule.name.trim().is_empty() {
        return Err(ConfigError::invalid_value(
            "rules",
            "rule names must not be empty",
        ));
    }
    if !seen.insert(rule.name.clone()) {
        return Err(ConfigError::DuplicateRule(rule.name.clone()));
    }
    for ext in &rule.matcher.extensions {
        if ext.starts_with('.') || ext.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::invalid_value(
                format!("rules.{}.matcher.extensions", rule.name),
                format!("write '{ext}' lowercase without the leading dot"),
            ));
        }
    }
    for sub in &rule.one_of {
        check_rule(sub, seen)?;
    }
    Ok(())
}

/// Checks that the paths a manifest references exist under a root.
pub struct FsValidator {
    root: PathBuf,
}

impl FsValidator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, manifest: &Manifest) -> Result<()> {
        let source_root = manifest.paths.source_root(&self.root);
        if !source_root.is_dir() {
            return Err(ConfigError::SourceNotFound(source_root));
        }

        // Finalization re-runs page discovery, so an unreadable pages
        // directory surfaces here as well.
        let plan = manifest.finalize(&self.root)?;

        for entry in &plan.entries {
            if !entry.source.is_file() {
                return Err(ConfigError::EntryNotFound {
                    name: entry.name.clone(),
                    path: entry.source.clone(),
                });
            }
        }

        Ok(())
    }
}

pub fn validate_schema(manifest: &Manifest) -> Result<()> {
    SchemaValidator.validate(manifest)
}

pub fn validate_fs(manifest: &Manifest, root: &Path) -> Result<()> {
    FsValidator::new(root).validate(manifest)
}
