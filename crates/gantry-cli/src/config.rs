//! Project loading with layered configuration.
//!
//! Precedence, lowest to highest: the manifest schema's own defaults,
//! `gantry.toml`, then `GANTRY_*` environment variables. Nested keys
//! use double underscores, so `GANTRY_DEV__PORT=8080` overrides
//! `[dev] port`. Command-line flags are applied by the individual
//! commands on top of the extracted manifest.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use gantry_config::{discovery, ConfigDiscovery, Manifest, MANIFEST_FILE};
use tracing::debug;

use crate::error::Result;

pub const ENV_PREFIX: &str = "GANTRY_";

/// A manifest extracted from its layers plus where it came from.
pub struct LoadedProject {
    pub manifest: Manifest,
    pub root: PathBuf,
    /// None when no `gantry.toml` exists and defaults are in effect.
    pub manifest_path: Option<PathBuf>,
}

/// Locate the project and extract its layered manifest.
///
/// A missing manifest file is not an error: the schema defaults
/// describe the conventional layout, so bare projects build without
/// any configuration.
pub fn load_project(cli_root: Option<&Path>) -> Result<LoadedProject> {
    let cwd = std::env::current_dir()?;

    let (root, manifest_path) = match cli_root {
        Some(root) => {
            let root = if root.is_absolute() {
                root.to_path_buf()
            } else {
                cwd.join(root)
            };
            let candidate = root.join(MANIFEST_FILE);
            let path = candidate.is_file().then_some(candidate);
            (root, path)
        }
        None => match ConfigDiscovery::new(&cwd).find_manifest() {
            Some(path) => {
                let root = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());
                (root, Some(path))
            }
            None => (cwd, None),
        },
    };

    let file_manifest = match &manifest_path {
        Some(path) => Some(discovery::load_file(path)?),
        None => None,
    };

    let mut figment = Figment::new();
    if let Some(path) = &manifest_path {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let mut manifest: Manifest = figment.extract()?;

    // Figment's value maps sort their keys, and entry order decides the
    // order of injected script tags. Restore the file's declaration
    // order unless the environment changed the entry set itself.
    if let Some(base) = file_manifest {
        if manifest.entries == base.entries {
            manifest.entries = base.entries;
        }
    }
    debug!(root = %root.display(), manifest = ?manifest_path, "loaded project");

    Ok(LoadedProject {
        manifest,
        root,
        manifest_path,
    })
}
