//! Resolving configured source paths.
//!
//! An entry is either a plain path or a glob pattern (`*`, `?`, `[...]`,
//! in any component), e.g. `statements/*/Statement *.csv`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const GLOB_CHARS: [char; 3] = ['*', '?', '['];

/// Expand one configured entry into existing files, sorted by path.
///
/// A plain path is returned as-is even when it does not exist; the parser
/// reports the missing file with its own context.
pub fn expand_pattern(pattern: &Path) -> Result<Vec<PathBuf>> {
    let Some(text) = pattern.to_str().filter(|t| t.contains(GLOB_CHARS)) else {
        return Ok(vec![pattern.to_path_buf()]);
    };

    let mut out = Vec::new();
    for entry in glob::glob(text).with_context(|| format!("invalid pattern '{text}'"))? {
        let path = entry.with_context(|| format!("listing matches of '{text}'"))?;
        if path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Expand every entry, dropping duplicates while keeping first-seen order.
pub fn expand_all<P: AsRef<Path>>(patterns: &[P]) -> Result<Vec<PathBuf>> {
    let mut out: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        for path in expand_pattern(pattern.as_ref())? {
            if !out.contains(&path) {
                out.push(path);
            }
        }
    }
    Ok(out)
}
