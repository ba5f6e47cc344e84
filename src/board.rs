//! Board manifest: a hand-editable side channel for bulk title edits.
//!
//! One line per item, three colon-separated and column-padded fields: a
//! markdown link to the item file, the canonical title line, and the
//! description. Editing the middle or right column and feeding the file back
//! through [`update_titles`] pushes the changes into the item headers.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::group::{group_by, GroupKey};
use crate::item::Item;
use crate::paths;
use crate::store::ItemStore;

/// Emit the board manifest at `board_file`, items flattened out of the
/// grouped order.
pub fn generate(
    store: &mut ItemStore,
    board_file: &Path,
    sort_by: GroupKey,
    reverse: bool,
) -> Result<()> {
    let groups = group_by(&store.items, sort_by, &mut store.labels, reverse);
    let ordered: Vec<&Item> = groups.into_iter().flat_map(|(_, members)| members).collect();

    let mut rows: Vec<(String, &str, &str)> = Vec::new();
    for item in ordered {
        let link = format!("[]({})", paths::directions(board_file, &item.path).display());
        rows.push((link, item.full_title.as_str(), item.description.as_str()));
    }
    let link_width = rows.iter().map(|row| row.0.chars().count()).max().unwrap_or(0);
    let title_width = rows.iter().map(|row| row.1.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (link, full_title, description) in &rows {
        out.push_str(&format!(
            "{:<lw$} : {:<tw$} : {}\n",
            link,
            full_title,
            description,
            lw = link_width,
            tw = title_width
        ));
    }

    paths::ensure_parent_dir(board_file)?;
    std::fs::write(board_file, out)
        .with_context(|| format!("failed to write board {}", board_file.display()))?;
    Ok(())
}

/// Push title/description edits from a board manifest back into the item
/// files under `root` (the directory the pipeline runs from). Runs
/// standalone, before any folder is loaded: the next load pass
/// re-canonicalizes whatever was written here.
pub fn update_titles(board_file: &Path, root: &Path) -> Result<()> {
    let text = std::fs::read_to_string(board_file)
        .with_context(|| format!("failed to read board {}", board_file.display()))?;

    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() < 3 {
            bail!("malformed board line (expected three ':' fields): {}", line);
        }
        let link = parts[0].trim();
        let inner = link
            .strip_prefix("[](")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| anyhow::anyhow!("malformed board link: {}", link))?;
        let full_title = parts[1].trim();
        let description = parts[2].trim();

        let path = root.join(item_path_from_link(inner)?);
        if !path.is_file() {
            eprintln!("  warning: file {} not found, creating", path.display());
            paths::ensure_parent_dir(&path)?;
            std::fs::write(&path, format!("{} #empty\n{}\n", full_title, description))
                .with_context(|| format!("failed to create {}", path.display()))?;
            continue;
        }

        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let lines: Vec<&str> = data.split_inclusive('\n').collect();
        let old_first = lines.first().copied().unwrap_or("");
        let old_second = lines.get(1).copied().unwrap_or("");
        let new_first = format!("{}\n", full_title);
        let new_second = format!("{}\n", description);
        if old_first != new_first || old_second != new_second {
            let body: String = if lines.len() > 2 {
                lines[2..].concat()
            } else {
                String::new()
            };
            std::fs::write(&path, format!("{}{}{}", new_first, new_second, body))
                .with_context(|| format!("failed to rewrite {}", path.display()))?;
        }
    }
    Ok(())
}

/// The board links items relative to its own location; strip that prefix by
/// keeping the last three path components (`base/hook/filename`).
fn item_path_from_link(link_target: &str) -> Result<PathBuf> {
    let comps: Vec<&str> = link_target.split('/').collect();
    let n = comps.len();
    if n < 2 {
        bail!("board link does not point into an item folder: {}", link_target);
    }
    let mut path = PathBuf::new();
    for comp in &comps[n.saturating_sub(3)..] {
        path.push(comp);
    }
    Ok(paths::normalize(&path))
}
