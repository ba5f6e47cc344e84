//! Path arithmetic shared by the emitters.
//!
//! Every item path is kept relative to the process working directory, while
//! the generated artifacts live at arbitrary depths. Links inside an artifact
//! therefore need to climb back out of the artifact's directory before
//! descending into the item tree; [`directions`] computes that route without
//! touching the filesystem.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `segment/..` components without consulting the
/// filesystem. An empty result becomes `.`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.into_iter().collect()
}

/// Relative route from `from_file` (a file path relative to the cwd) to
/// `target`: one `..` per directory component of the emitting file, then
/// the target path, normalized.
pub fn directions(from_file: &Path, target: &Path) -> PathBuf {
    let from = normalize(from_file);
    if from == Path::new(".") {
        return normalize(target);
    }
    let ups = from.components().count().saturating_sub(1);
    let mut route = PathBuf::new();
    for _ in 0..ups {
        route.push("..");
    }
    route.push(target);
    normalize(&route)
}

/// Create the parent directory of `path` when it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}
