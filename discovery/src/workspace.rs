//! Bazel workspace root lookup.

use std::path::{Path, PathBuf};

/// Files whose presence marks a directory as a Bazel workspace root,
/// in lookup order.
pub const WORKSPACE_MARKERS: &[&str] = &["MODULE.bazel", "REPO.bazel", "WORKSPACE.bazel", "WORKSPACE"];

/// Walks upward from `start` looking for a workspace marker file.
///
/// Returns the first directory containing one, or `None` when the walk
/// reaches the filesystem root.
pub fn locate_workspace_root(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(candidate) = dir {
        if is_workspace_root(candidate) {
            return Some(candidate.to_path_buf());
        }
        dir = candidate.parent();
    }
    None
}

/// Like [`locate_workspace_root`], starting from the current directory.
pub fn locate_workspace_root_from_cwd() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    locate_workspace_root(&cwd)
}

fn is_workspace_root(dir: &Path) -> bool {
    WORKSPACE_MARKERS
        .iter()
        .any(|marker| dir.join(marker).is_file())
}
