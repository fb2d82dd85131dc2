//! Filesystem watching with a debounce window.
//!
//! Raw notify events arrive in bursts (editors write, rename, and
//! touch metadata in quick succession), so changes are collected on a
//! dedicated thread until a quiet window passes, then handed to the
//! rebuild callback as one batch.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, trace};

use crate::error::Result;

/// What to watch and what to skip.
pub struct WatchConfig {
    pub source_root: PathBuf,
    /// Watched individually so manifest edits also trigger rebuilds.
    pub manifest: Option<PathBuf>,
    /// Never watched. Matters when it nests under the source root.
    pub output_root: PathBuf,
    pub debounce: Duration,
    /// Path substrings excluded from watching.
    pub ignore: Vec<String>,
}

/// Keeps the underlying notify watcher alive; dropping it stops
/// watching.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch the source tree and manifest, invoking `on_change` with
    /// the batch of paths collected during each quiet window. The
    /// callback runs on its own thread, so it may block (rebuilds do).
    pub fn spawn<F>(config: WatchConfig, mut on_change: F) -> Result<Self>
    where
        F: FnMut(Vec<PathBuf>) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PathBuf>();

        let filter = ChangeFilter {
            source_root: config.source_root.clone(),
            manifest: config.manifest.clone(),
            output_root: config.output_root.clone(),
            ignore: config.ignore.clone(),
        };

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    debug!(error = %err, "watch event error");
                    return;
                }
            };
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                return;
            }
            for path in event.paths {
                if filter.is_relevant(&path) {
                    let _ = tx.send(path);
                }
            }
        })?;

        watcher.watch(&config.source_root, RecursiveMode::Recursive)?;
        if let Some(manifest) = &config.manifest {
            watcher.watch(manifest, RecursiveMode::NonRecursive)?;
        }

        let debounce = config.debounce;
        thread::Builder::new()
            .name("gantry-watch".to_string())
            .spawn(move || loop {
                // Blocks until something changes; the channel closing
                // means the watcher was dropped.
                let first = match rx.recv() {
                    Ok(path) => path,
                    Err(_) => break,
                };
                let mut changed = vec![first];
                while let Ok(path) = rx.recv_timeout(debounce) {
                    changed.push(path);
                }
                changed.sort();
                changed.dedup();
                trace!(count = changed.len(), "change batch");
                on_change(changed);
            })?;

        Ok(Self { _watcher: watcher })
    }
}

struct ChangeFilter {
    source_root: PathBuf,
    manifest: Option<PathBuf>,
    output_root: PathBuf,
    ignore: Vec<String>,
}

impl ChangeFilter {
    fn is_relevant(&self, path: &Path) -> bool {
        if self.manifest.as_deref() == Some(path) {
            return true;
        }
        if path.starts_with(&self.output_root) {
            return false;
        }
        let rel = match path.strip_prefix(&self.source_root) {
            Ok(rel) => rel,
            Err(_) => return false,
        };
        let hidden = rel.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
        });
        if hidden {
            return false;
        }
        let rel = rel.to_string_lossy().replace('\\', "/");
        !self.ignore.iter().any(|pattern| rel.contains(pattern.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ChangeFilter {
        ChangeFilter {
            source_root: PathBuf::from("/project/src"),
            manifest: Some(PathBuf::from("/project/gantry.toml")),
            output_root: PathBuf::from("/project/dist"),
            ignore: vec!["drafts".to_string()],
        }
    }

    #[test]
    fn source_files_are_relevant() {
        let filter = filter();
        assert!(filter.is_relevant(Path::new("/project/src/pages/index.jinja")));
        assert!(filter.is_relevant(Path::new("/project/src/styles/app.css")));
    }

    #[test]
    fn the_manifest_is_always_relevant() {
        let filter = filter();
        assert!(filter.is_relevant(Path::new("/project/gantry.toml")));
    }

    #[test]
    fn the_output_tree_is_never_relevant() {
        let mut filter = filter();
        filter.output_root = PathBuf::from("/project/src/dist");
        assert!(!filter.is_relevant(Path::new("/project/src/dist/index.html")));
    }

    #[test]
    fn hidden_and_ignored_paths_are_skipped() {
        let filter = filter();
        assert!(!filter.is_relevant(Path::new("/project/src/.cache/tmp.js")));
        assert!(!filter.is_relevant(Path::new("/project/src/pages/drafts/wip.jinja")));
    }

    #[test]
    fn paths_outside_the_source_root_are_skipped() {
        let filter = filter();
        assert!(!filter.is_relevant(Path::new("/project/node_modules/x/index.js")));
        assert!(!filter.is_relevant(Path::new("/somewhere/else.js")));
    }
}
