//! Category label registry persisted as `<base>/.categories.csv`.
//!
//! Rows are `(usage_count, key, display_label, description)`. The count
//! column is a derived cache recomputed on every run; only the key order,
//! display label and description are hand-edited. Row position in the file
//! defines the canonical sort index. Keys discovered in items but missing
//! from the file are appended at [`UNREGISTERED_INDEX`], so unregistered
//! categories still sort deterministically after every registered one.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::item::Item;

/// Sentinel meaning "no value was present" for a multi-valued field.
pub const ORPHAN: &str = "__orphan__";

/// Sort index given to labels that are not in the persisted table.
pub const UNREGISTERED_INDEX: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Canonical sort position; lower sorts first.
    pub index: u32,
    /// Machine identifier matching an item's category string.
    pub key: String,
    /// Human display text.
    pub label: String,
    pub description: String,
}

impl Label {
    fn from_key(key: &str) -> Self {
        Self {
            index: UNREGISTERED_INDEX,
            key: key.to_string(),
            label: key.to_string(),
            description: key.to_string(),
        }
    }
}

/// One categorical dimension's key → label table.
///
/// Lookups through [`LabelRegistry::get_label`] auto-create default entries
/// for unknown keys and remember them for the rest of the run, so later
/// saves and sorts see a consistent view.
#[derive(Debug)]
pub struct LabelRegistry {
    source: PathBuf,
    labels: Vec<Label>,
    by_key: HashMap<String, usize>,
}

impl LabelRegistry {
    /// Read the persisted table. A missing file is an empty registry, not an
    /// error: the table is (re)written by [`LabelRegistry::reconcile_and_save`].
    pub fn load(source: &Path) -> Result<Self> {
        let mut registry = Self {
            source: source.to_path_buf(),
            labels: Vec::new(),
            by_key: HashMap::new(),
        };
        if !source.is_file() {
            return Ok(registry);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(source)
            .with_context(|| format!("failed to read {}", source.display()))?;

        for (row, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("{}: malformed row {}", source.display(), row + 1))?;
            if record.len() != 4 {
                bail!(
                    "{}: row {} has {} fields, expected (count, key, label, description)",
                    source.display(),
                    row + 1,
                    record.len()
                );
            }
            // Column 0 is the cached usage count; it is recomputed from the
            // live item set, never trusted from storage.
            registry.insert(Label {
                index: row as u32,
                key: record[1].to_string(),
                label: record[2].to_string(),
                description: record[3].to_string(),
            });
        }
        Ok(registry)
    }

    fn insert(&mut self, label: Label) {
        match self.by_key.get(&label.key) {
            Some(&pos) => self.labels[pos] = label,
            None => {
                self.by_key.insert(label.key.clone(), self.labels.len());
                self.labels.push(label);
            }
        }
    }

    /// Label for `key`, auto-creating (and remembering) a default entry at
    /// the sentinel index when the key is unknown.
    pub fn get_label(&mut self, key: &str) -> &Label {
        if !self.by_key.contains_key(key) {
            self.insert(Label::from_key(key));
        }
        &self.labels[self.by_key[key]]
    }

    pub fn get_index(&mut self, key: &str) -> u32 {
        self.get_label(key).index
    }

    /// Non-registering index lookup, usable inside sort comparators.
    pub fn index_of(&self, key: &str) -> u32 {
        self.by_key
            .get(key)
            .map(|&pos| self.labels[pos].index)
            .unwrap_or(UNREGISTERED_INDEX)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Recompute usage counts from every item's category set, register any
    /// key the table does not know yet, zero the registered-but-unused ones,
    /// and rewrite the table sorted by index ascending (insertion order on
    /// ties) with the fresh count as leading column.
    pub fn reconcile_and_save(&mut self, items: &[Item]) -> Result<()> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for item in items {
            for category in &item.categories {
                *counts.entry(category.clone()).or_insert(0) += 1;
                if !self.by_key.contains_key(category.as_str()) {
                    self.insert(Label::from_key(category));
                }
            }
        }
        for label in &self.labels {
            counts.entry(label.key.clone()).or_insert(0);
        }

        let mut ordered: Vec<&Label> = self.labels.iter().collect();
        ordered.sort_by_key(|label| label.index);

        let mut writer = csv::Writer::from_path(&self.source)
            .with_context(|| format!("failed to write {}", self.source.display()))?;
        for label in ordered {
            let count = counts[&label.key].to_string();
            writer.write_record([
                count.as_str(),
                label.key.as_str(),
                label.label.as_str(),
                label.description.as_str(),
            ])?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to write {}", self.source.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_categories(hook: &str, categories: &[&str]) -> Item {
        Item {
            path: PathBuf::from(format!("base/{}/Readme.md", hook)),
            base: PathBuf::from("base"),
            hook: hook.to_string(),
            filename: "Readme.md".to_string(),
            level: Some("#".to_string()),
            date: None,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            tags: vec![ORPHAN.to_string()],
            authors: vec![ORPHAN.to_string()],
            title: hook.to_string(),
            description: String::new(),
            content: String::new(),
            cover: None,
            full_title: format!("# {}", hook),
        }
    }

    #[test]
    fn test_missing_file_is_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LabelRegistry::load(&dir.path().join(".categories.csv")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_row_position_defines_index() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join(".categories.csv");
        std::fs::write(&source, "3,core,Core,The core\n0,misc,Misc,Everything else\n").unwrap();
        let registry = LabelRegistry::load(&source).unwrap();
        assert_eq!(registry.index_of("core"), 0);
        assert_eq!(registry.index_of("misc"), 1);
        assert_eq!(registry.index_of("unknown"), UNREGISTERED_INDEX);
    }

    #[test]
    fn test_get_label_auto_creates_and_remembers() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = LabelRegistry::load(&dir.path().join(".categories.csv")).unwrap();
        let label = registry.get_label("fresh").clone();
        assert_eq!(label.index, UNREGISTERED_INDEX);
        assert_eq!(label.label, "fresh");
        assert_eq!(registry.len(), 1);
        registry.get_label("fresh");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reconcile_counts_and_inserts() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join(".categories.csv");
        std::fs::write(&source, "9,core,Core,The core\n9,misc,Misc,Everything else\n").unwrap();

        let items = vec![
            item_with_categories("000", &["core"]),
            item_with_categories("001", &["core", "experimental"]),
        ];
        let mut registry = LabelRegistry::load(&source).unwrap();
        registry.reconcile_and_save(&items).unwrap();

        // New key registered at the sentinel index, sorted after the table.
        assert_eq!(registry.index_of("experimental"), UNREGISTERED_INDEX);

        let saved = std::fs::read_to_string(&source).unwrap();
        let rows: Vec<&str> = saved.lines().collect();
        assert_eq!(rows[0], "2,core,Core,The core");
        assert_eq!(rows[1], "0,misc,Misc,Everything else");
        assert_eq!(rows[2], "1,experimental,experimental,experimental");
    }

    #[test]
    fn test_registered_index_stable_across_reconcile() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join(".categories.csv");
        std::fs::write(&source, "0,core,Core,d1\n0,tools,Tools,d2\n").unwrap();

        let items = vec![item_with_categories("000", &["tools"])];
        let mut registry = LabelRegistry::load(&source).unwrap();
        let before = registry.get_index("tools");
        registry.reconcile_and_save(&items).unwrap();
        assert_eq!(registry.get_index("tools"), before);

        // Reloading the rewritten file preserves the ordering too.
        let reloaded = LabelRegistry::load(&source).unwrap();
        assert_eq!(reloaded.index_of("core"), 0);
        assert_eq!(reloaded.index_of("tools"), 1);
    }

    #[test]
    fn test_embedded_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join(".categories.csv");
        std::fs::write(&source, "0,core,Core,\"big, round, and heavy\"\n").unwrap();

        let mut registry = LabelRegistry::load(&source).unwrap();
        assert_eq!(registry.get_label("core").description, "big, round, and heavy");

        registry.reconcile_and_save(&[]).unwrap();
        let reloaded = LabelRegistry::load(&source).unwrap();
        assert_eq!(reloaded.index_of("core"), 0);
        let saved = std::fs::read_to_string(&source).unwrap();
        assert!(saved.contains("\"big, round, and heavy\""), "{}", saved);
    }

    #[test]
    fn test_short_row_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join(".categories.csv");
        std::fs::write(&source, "0,core,Core\n").unwrap();
        assert!(LabelRegistry::load(&source).is_err());
    }
}
