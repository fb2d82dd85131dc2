//! Build outcome summary.

use std::time::Duration;

use gantry_config::Mode;
use serde::Serialize;

use crate::state::{Artifact, ArtifactKind, BuildState, Bundle};

/// Everything a completed build produced, for display and assertions.
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub mode: Mode,
    pub duration: Duration,
    pub artifacts: Vec<Artifact>,
    pub bundles: Vec<Bundle>,
    /// Files published verbatim from the source tree.
    pub copied: usize,
}

impl BuildReport {
    pub(crate) fn from_state(mode: Mode, duration: Duration, state: BuildState) -> Self {
        Self {
            mode,
            duration,
            artifacts: state.artifacts,
            bundles: state.bundles,
            copied: state.copied,
        }
    }

    pub fn documents(&self) -> usize {
        self.count(ArtifactKind::Document)
    }

    pub fn assets(&self) -> usize {
        self.count(ArtifactKind::Asset)
    }

    pub fn generated_bytes(&self) -> u64 {
        self.artifacts.iter().map(|a| a.bytes).sum()
    }

    /// First generated artifact the predicate accepts.
    pub fn find_artifact(&self, predicate: impl Fn(&Artifact) -> bool) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| predicate(a))
    }

    fn count(&self, kind: ArtifactKind) -> usize {
        self.artifacts.iter().filter(|a| a.kind == kind).count()
    }
}
