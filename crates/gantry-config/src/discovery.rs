//! Locating and loading `gantry.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::manifest::Manifest;

/// Manifest filename looked up during discovery.
pub const MANIFEST_FILE: &str = "gantry.toml";

/// Walks up from a starting directory until it finds a manifest.
pub struct ConfigDiscovery {
    start: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            start: start.into(),
        }
    }

    /// Nearest manifest at or above the starting directory.
    pub fn find_manifest(&self) -> Option<PathBuf> {
        self.start
            .ancestors()
            .map(|dir| dir.join(MANIFEST_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load the nearest manifest, returning it with its path so the
    /// caller knows the project root.
    pub fn discover(&self) -> Result<(Manifest, PathBuf)> {
        let path = self.find_manifest().ok_or(ConfigError::NotFound)?;
        let manifest = load_file(&path)?;
        debug!(path = %path.display(), "loaded manifest");
        Ok((manifest, path))
    }
}

/// Parse a manifest file.
///
/// Deserialization is direct, not via an intermediate value type, so
/// `[entries]` keys reach the manifest in document order.
pub fn load_file(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Discover relative to `dir`, the common CLI entry point.
pub fn discover_from(dir: &Path) -> Result<(Manifest, PathBuf)> {
    ConfigDiscovery::new(dir).discover()
}
