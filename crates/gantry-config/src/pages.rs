//! Page discovery: one HTML document per template in the pages directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ConfigError, Result};

/// A page template paired with the document it renders to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDescriptor {
    /// Absolute path of the template source.
    pub source: PathBuf,

    /// Output path relative to the output root, always `<stem>.html`.
    pub output: String,
}

impl PageDescriptor {
    /// Template stem, used as the page name in render contexts.
    pub fn name(&self) -> &str {
        self.output.strip_suffix(".html").unwrap_or(&self.output)
    }
}

/// Scan `dir` for page templates carrying `extension`.
///
/// The scan is non-recursive and ignores everything that is not a
/// regular file with the wanted extension. Results come back sorted by
/// output name so the derived document list is stable across platforms
/// and readdir orderings. An empty directory yields an empty list; a
/// directory that cannot be read is an error, since the rest of the
/// build plan depends on the page list.
pub fn discover_pages(dir: &Path, extension: &str) -> Result<Vec<PageDescriptor>> {
    let unreadable = |source: std::io::Error| ConfigError::PagesDirUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let mut pages = Vec::new();

    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stem) = file_name.strip_suffix(&suffix) else {
            continue;
        };
        if stem.is_empty() {
            continue;
        }
        let output = format!("{stem}.html");
        pages.push(PageDescriptor {
            source: path,
            output,
        });
    }

    pages.sort_by(|a, b| a.output.cmp(&b.output));
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn derives_one_document_per_template() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.jinja");
        touch(tmp.path(), "a.jinja");
        touch(tmp.path(), "notes.txt");

        let pages = discover_pages(tmp.path(), "jinja").unwrap();
        let outputs: Vec<&str> = pages.iter().map(|p| p.output.as_str()).collect();
        assert_eq!(outputs, ["a.html", "b.html"]);
        assert_eq!(pages[0].name(), "a");
        assert_eq!(pages[0].source, tmp.path().join("a.jinja"));
    }

    #[test]
    fn scan_is_not_recursive() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "index.jinja");
        fs::create_dir(tmp.path().join("nested")).unwrap();
        touch(&tmp.path().join("nested"), "hidden.jinja");

        let pages = discover_pages(tmp.path(), "jinja").unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].output, "index.html");
    }

    #[test]
    fn empty_directory_yields_no_pages() {
        let tmp = TempDir::new().unwrap();
        assert!(discover_pages(tmp.path(), "jinja").unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does-not-exist");
        let err = discover_pages(&missing, "jinja").unwrap_err();
        assert!(matches!(err, ConfigError::PagesDirUnreadable { path, .. } if path == missing));
    }

    #[test]
    fn extension_accepts_optional_leading_dot() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "home.jinja");
        let pages = discover_pages(tmp.path(), ".jinja").unwrap();
        assert_eq!(pages.len(), 1);
    }
}
