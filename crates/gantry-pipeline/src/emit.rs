//! Writing artifacts into the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use tracing::trace;

use crate::error::{PipelineError, Result};

/// Join an output-relative path onto the output root, rejecting
/// anything that would land outside it.
pub fn validate_output_path(output_root: &Path, relative: &str) -> Result<PathBuf> {
    let candidate = output_root.join(relative).clean();
    if !candidate.starts_with(output_root) {
        return Err(PipelineError::UnsafeOutputPath(relative.to_string()));
    }
    Ok(candidate)
}

/// Write bytes at an output-relative path, creating parent directories.
pub fn write_bytes(output_root: &Path, relative: &str, bytes: &[u8]) -> Result<PathBuf> {
    let target = validate_output_path(output_root, relative)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    fs::write(&target, bytes).map_err(|e| PipelineError::io(&target, e))?;
    trace!(path = %target.display(), bytes = bytes.len(), "wrote artifact");
    Ok(target)
}

/// Copy a source file to an output-relative path, creating parents.
pub fn copy_file(source: &Path, output_root: &Path, relative: &str) -> Result<u64> {
    let target = validate_output_path(output_root, relative)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let bytes = fs::copy(source, &target).map_err(|e| PipelineError::io(source, e))?;
    trace!(from = %source.display(), to = %target.display(), "copied file");
    Ok(bytes)
}
