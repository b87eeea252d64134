//! Locating `.pol` source files under a scan root.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{PoolError, PoolResult};

/// Extension of pool data files (compared case-insensitively).
pub const POL_EXTENSION: &str = "pol";

/// Directory names never scanned.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".github",
    "Meta_data",
    "__pycache__",
    ".venv",
    "venv",
    "node_modules",
    "etl",
    "target",
];

/// Returns the default excluded directory set as owned strings.
pub fn default_excluded_dirs() -> BTreeSet<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}

/// Recursively find `.pol` files under `root`, skipping excluded directories. Sorted by path.
pub fn find_pol_files(root: impl AsRef<Path>, excluded: &BTreeSet<String>) -> PoolResult<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut out = Vec::new();

    let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|e| {
        // Never filter the root itself, even if its name is in the excluded set.
        e.depth() == 0 || !(e.file_type().is_dir() && is_excluded_name(&e.file_name().to_string_lossy(), excluded))
    });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && has_pol_extension(entry.path()) {
            out.push(entry.into_path());
        }
    }

    out.sort();
    info!(root = %root.display(), files = out.len(), "discovered pool files");
    Ok(out)
}

/// Find `.pol` files matching a glob `pattern` interpreted relative to `root`. Sorted by path.
pub fn find_pol_files_matching(
    root: impl AsRef<Path>,
    pattern: &str,
    excluded: &BTreeSet<String>,
) -> PoolResult<Vec<PathBuf>> {
    let root = root.as_ref();
    let full = root.join(pattern);
    let mut out = Vec::new();

    for entry in glob::glob(&full.to_string_lossy())? {
        match entry {
            Ok(path) => {
                if path.is_file() && has_pol_extension(&path) && !is_excluded_path(root, &path, excluded) {
                    out.push(path);
                }
            }
            Err(e) => warn!(error = %e, "unreadable glob match"),
        }
    }

    out.sort();
    Ok(out)
}

/// `.pol` files changed between `base` and `head` according to `git diff --name-only`.
///
/// `root` may be a subdirectory of the repository: `--relative` limits the listing to it and
/// prints paths relative to it. Deleted files and excluded directories are dropped.
pub fn changed_pol_files(
    root: impl AsRef<Path>,
    base: &str,
    head: &str,
    excluded: &BTreeSet<String>,
) -> PoolResult<Vec<PathBuf>> {
    let root = root.as_ref();
    let output = Command::new("git")
        .args(["diff", "--name-only", "--relative", base, head])
        .current_dir(root)
        .output()?;

    if !output.status.success() {
        return Err(PoolError::Git {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let changed = filter_changed_paths(root, &stdout, excluded);
    info!(base, head, files = changed.len(), "changed pool files");
    Ok(changed)
}

/// Keep the `.pol` entries of a `git diff --name-only` listing that still exist on disk.
pub fn filter_changed_paths(root: &Path, listing: &str, excluded: &BTreeSet<String>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for line in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let path = root.join(line);
        if !has_pol_extension(&path) {
            continue;
        }
        if is_excluded_path(root, &path, excluded) {
            continue;
        }
        if !path.is_file() {
            debug!(path = line, "skipping deleted file");
            continue;
        }
        out.push(path);
    }
    out.sort();
    out.dedup();
    out
}

fn has_pol_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(POL_EXTENSION))
}

fn is_excluded_name(name: &str, excluded: &BTreeSet<String>) -> bool {
    excluded.contains(name)
}

fn is_excluded_path(root: &Path, path: &Path, excluded: &BTreeSet<String>) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .any(|c| is_excluded_name(&c.as_os_str().to_string_lossy(), excluded))
}
