//! Project filesystem layout shared by every build step.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where a gantry project keeps its sources and where artifacts land.
///
/// Relative paths are resolved against the project root (the directory
/// holding `gantry.toml`) when the build plan is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectPaths {
    /// Source tree root. Everything under it is eligible for routing.
    pub source: PathBuf,

    /// Output directory. Cleared and regenerated on every build.
    pub output: PathBuf,

    /// Prefix inside the output directory where generated assets land.
    pub assets: String,

    /// Public base path prepended to generated URLs.
    pub public: String,

    /// Directory name excluded from script transformation.
    pub vendor: String,
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src"),
            output: PathBuf::from("dist"),
            assets: "assets".to_string(),
            public: "/".to_string(),
            vendor: "vendor".to_string(),
        }
    }
}

impl ProjectPaths {
    /// Absolute source root for a given project root.
    pub fn source_root(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.source)
    }

    /// Absolute output root for a given project root.
    pub fn output_root(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.output)
    }

    /// Build a public URL for an output-relative path.
    ///
    /// The public base and the relative path are joined with exactly one
    /// slash regardless of how either side is written.
    pub fn public_url(&self, relative: &str) -> String {
        let base = self.public.trim_end_matches('/');
        let rel = relative.trim_start_matches('/');
        format!("{base}/{rel}")
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
