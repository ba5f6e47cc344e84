//! Item collection loading.
//!
//! [`ItemStore::load`] walks the base directory exactly one level deep,
//! loads every qualifying markdown file as an [`Item`] (self-healing each
//! file on the way in), then reconciles the category label registry against
//! the loaded set. The walk itself is the pure function
//! [`list_candidate_item_paths`], testable against any directory tree.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::item::Item;
use crate::labels::LabelRegistry;
use crate::symbols::{self, Symbols};

const SYMBOLS_FILE: &str = ".symbols.json";
const CATEGORIES_FILE: &str = ".categories.csv";

#[derive(Debug)]
pub struct ItemStore {
    pub base: PathBuf,
    pub symbols: Symbols,
    pub items: Vec<Item>,
    pub labels: LabelRegistry,
}

impl ItemStore {
    pub fn load(base: &Path) -> Result<ItemStore> {
        let base = crate::paths::normalize(base);
        if !base.is_dir() {
            bail!("base directory is missing: {}", base.display());
        }
        let symbols = symbols::load_symbols(&base.join(SYMBOLS_FILE))?;

        let mut items = Vec::new();
        for path in list_candidate_item_paths(&base)? {
            items.push(Item::load(&symbols, &base, &path)?);
        }

        let mut labels = LabelRegistry::load(&base.join(CATEGORIES_FILE))?;
        labels.reconcile_and_save(&items)?;

        Ok(ItemStore {
            base,
            symbols,
            items,
            labels,
        })
    }
}

/// Every path that qualifies as an item file: exactly one directory below
/// `base`, skipping `_`/`.`-prefixed folders, keeping `*.md` files whose
/// name does not start with `_` or `>`. Sorted for deterministic ordering.
pub fn list_candidate_item_paths(base: &Path) -> Result<Vec<PathBuf>> {
    let include = build_globset(&["*.md"])?;
    let exclude = build_globset(&["_*", ">*", ".*"])?;

    let walker = WalkDir::new(base)
        .min_depth(1)
        .max_depth(2)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 1 && entry.file_type().is_dir() {
                let name = entry.file_name().to_string_lossy();
                return !(name.starts_with('_') || name.starts_with('.'));
            }
            true
        });

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.depth() != 2 || !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let name: &str = &name;
        if !include.is_match(name) || exclude.is_match(name) {
            continue;
        }
        paths.push(entry.into_path());
    }
    paths.sort();
    Ok(paths)
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_walk_skips_special_folders_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("base");
        touch(&base.join("000/Readme.md"), "# A\n\n");
        touch(&base.join("001/Readme.md"), "# B\n\n");
        touch(&base.join("001/notes.md"), "# B2\n\n");
        touch(&base.join("001/_draft.md"), "# skipped\n\n");
        touch(&base.join("001/>generated.md"), "# skipped\n\n");
        touch(&base.join("001/.hidden.md"), "# skipped\n\n");
        touch(&base.join("001/image.png"), "");
        touch(&base.join("_archive/Readme.md"), "# skipped\n\n");
        touch(&base.join(".cache/Readme.md"), "# skipped\n\n");
        // Too deep: two levels below a hook folder.
        touch(&base.join("001/sub/Readme.md"), "# skipped\n\n");
        // Top-level files are not items.
        touch(&base.join("Readme.md"), "# skipped\n\n");

        let paths = list_candidate_item_paths(&base).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.strip_prefix(&base).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["000/Readme.md", "001/Readme.md", "001/notes.md"]);
    }

    #[test]
    fn test_missing_base_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ItemStore::load(&tmp.path().join("nope")).unwrap_err().to_string();
        assert!(err.contains("base directory is missing"), "{}", err);
    }

    #[test]
    fn test_load_builds_store_and_registry() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("base");
        touch(&base.join("000/Readme.md"), "# \u{00a9}core First\nd1\n\n");
        touch(&base.join("001/Readme.md"), "# Second\nd2\n\n");

        let store = ItemStore::load(&base).unwrap();
        assert_eq!(store.items.len(), 2);
        // Defaults were written next to the items.
        assert!(base.join(".symbols.json").is_file());
        // The registry was reconciled: core plus the orphan sentinel.
        let table = fs::read_to_string(base.join(".categories.csv")).unwrap();
        assert!(table.contains("1,core,core,core"), "{}", table);
        assert!(table.contains("1,__orphan__,__orphan__,__orphan__"), "{}", table);
    }
}
