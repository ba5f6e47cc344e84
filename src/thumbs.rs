//! Thumbnail generation via the external `convert` tool (ImageMagick).
//!
//! Thumbs live in `<base>/.thumb/<hook>/<filename>.jpg` and are regenerated
//! only when the cover is newer than the existing thumb (or a rebuild is
//! forced). Invocations run strictly sequentially; a failing resize is an
//! operator warning, not a fatal error.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

use crate::item::Item;
use crate::paths;
use crate::store::ItemStore;

pub const THUMB_DIR: &str = ".thumb";

/// `.thumb/<hook>/<filename>.jpg`, relative to the base dir. `None` for
/// items without a cover.
pub fn thumb_path(item: &Item) -> Option<PathBuf> {
    item.cover.as_ref()?;
    let stem = item.filename.strip_suffix("md").unwrap_or(&item.filename);
    Some(
        PathBuf::from(THUMB_DIR)
            .join(&item.hook)
            .join(format!("{}jpg", stem)),
    )
}

/// Same path prefixed with the base dir.
pub fn thumb_path_full(item: &Item) -> Option<PathBuf> {
    Some(item.base.join(thumb_path(item)?))
}

pub fn generate(store: &ItemStore, width: u32, height: u32, rebuild: bool) -> Result<()> {
    let mut items: Vec<&Item> = store.items.iter().collect();
    items.sort_by(|a, b| a.hook.cmp(&b.hook));
    for item in items {
        make(item, width, height, rebuild)?;
    }
    Ok(())
}

fn make(item: &Item, width: u32, height: u32, rebuild: bool) -> Result<()> {
    let (cover, thumb_full) = match (&item.cover, thumb_path_full(item)) {
        (Some(cover), Some(thumb_full)) => (cover, thumb_full),
        _ => {
            eprintln!(
                "  warning: thumb skipped, missing cover on {}",
                item.path.display()
            );
            return Ok(());
        }
    };
    let cover_full = item.base.join(&item.hook).join(cover);

    if !rebuild && thumb_full.is_file() && !newer_than(&cover_full, &thumb_full)? {
        return Ok(());
    }

    println!("  making thumb for {}", item.path.display());
    paths::ensure_parent_dir(&thumb_full)?;
    let status = Command::new("convert")
        .arg(&cover_full)
        .arg("-resize")
        // The trailing `>` means shrink-only: never upscale small covers.
        .arg(format!("{}x{}>", width, height))
        .arg(&thumb_full)
        .status()
        .context("failed to run convert (is ImageMagick installed?)")?;
    if !status.success() {
        eprintln!(
            "  warning: convert exited with {} for {}",
            status,
            cover_full.display()
        );
    }
    Ok(())
}

fn newer_than(a: &Path, b: &Path) -> Result<bool> {
    Ok(mtime(a)? > mtime(b)?)
}

fn mtime(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("failed to stat {}", path.display()))
}
