//! Mutable state threaded through one build.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

/// A stylesheet collected for a grouped bundle, already pushed through
/// its transform chain.
#[derive(Debug, Clone)]
pub struct StylePiece {
    pub source: PathBuf,
    pub css: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleKind {
    Script,
    Style,
}

/// A generated bundle, recorded so documents can reference it.
#[derive(Debug, Clone, Serialize)]
pub struct Bundle {
    pub name: String,
    pub kind: BundleKind,
    /// Output-relative path after pattern rendering.
    pub output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Bundle,
    Asset,
    Document,
}

/// One file the build generated (verbatim copies are counted, not
/// listed).
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub output: String,
    pub bytes: u64,
    pub kind: ArtifactKind,
}

/// Accumulates across plugin stages; the report is derived from it.
#[derive(Debug, Default)]
pub struct BuildState {
    /// Style sources per bundle group, in collection order.
    pub style_groups: BTreeMap<String, Vec<StylePiece>>,

    /// Bundles generated so far, scripts first, then styles as the
    /// extract step records them.
    pub bundles: Vec<Bundle>,

    pub artifacts: Vec<Artifact>,

    /// Files copied verbatim from the source tree.
    pub copied: usize,
}

impl BuildState {
    pub fn record_artifact(&mut self, output: impl Into<String>, bytes: u64, kind: ArtifactKind) {
        self.artifacts.push(Artifact {
            output: output.into(),
            bytes,
            kind,
        });
    }

    pub fn record_bundle(&mut self, name: impl Into<String>, kind: BundleKind, output: impl Into<String>) {
        self.bundles.push(Bundle {
            name: name.into(),
            kind,
            output: output.into(),
        });
    }

    pub fn add_style_piece(&mut self, group: &str, source: PathBuf, css: String) {
        self.style_groups
            .entry(group.to_string())
            .or_default()
            .push(StylePiece { source, css });
    }

    pub fn bundles_of(&self, kind: BundleKind) -> impl Iterator<Item = &Bundle> {
        self.bundles.iter().filter(move |b| b.kind == kind)
    }
}
