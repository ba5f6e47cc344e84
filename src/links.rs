//! Link-stub emission: one `<title>.md` file per item, each containing a
//! single relative `[LINK](...)` line. The stub directory is disposable and
//! rebuilt from scratch on every run.

use anyhow::{Context, Result};
use std::path::Path;

use crate::paths;
use crate::store::ItemStore;

pub fn generate(store: &ItemStore, links_dir: &Path) -> Result<()> {
    if links_dir.is_dir() {
        // Best effort: a half-removed tree is rebuilt below anyway.
        let _ = std::fs::remove_dir_all(links_dir);
    }
    std::fs::create_dir_all(links_dir)
        .with_context(|| format!("failed to create {}", links_dir.display()))?;

    for item in &store.items {
        let stub = links_dir.join(format!("{}.md", item.title.trim()));
        let target = paths::directions(&stub, &item.path);
        std::fs::write(&stub, format!("[LINK]({})\n", target.display()))
            .with_context(|| format!("failed to write link stub {}", stub.display()))?;
    }
    Ok(())
}
