//! One markdown item and its self-healing load path.
//!
//! An item is `<base>/<hook>/<file>.md`: line 1 the encoded title, line 2 a
//! one-line description, the rest free body text. Loading is split in two
//! phases so parsing and repair stay separately testable:
//!
//! 1. [`load_raw`] — pure read; structural fixes (missing lines, missing
//!    trailing newlines) are computed in memory, nothing is written.
//! 2. [`Item::normalize_if_needed`] — explicit rewrite, performed only when
//!    the canonical serialization differs from the bytes that were on disk.

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::symbols::Symbols;
use crate::title;

#[derive(Debug, Clone)]
pub struct Item {
    /// Full relative path, e.g. `base/000/Readme.md`.
    pub path: PathBuf,
    /// The collection root the item was loaded from.
    pub base: PathBuf,
    /// Folder name; the item's stable identifier.
    pub hook: String,
    pub filename: String,
    pub level: Option<String>,
    pub date: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
    pub title: String,
    pub description: String,
    pub content: String,
    /// Relative image path from the first markdown image reference in the
    /// body, verified to exist on disk.
    pub cover: Option<String>,
    /// Canonical re-serialization of the title line; doubles as the sort key.
    pub full_title: String,
}

/// First two lines plus remaining body, with structural fixes applied in
/// memory, alongside the untouched on-disk bytes for drift comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParts {
    pub title_line: String,
    pub description: String,
    pub content: String,
    pub on_disk: String,
}

/// Matches `![alt](path)` where the path carries no `:` (i.e. is relative,
/// not a URL).
fn cover_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!\[(.*?)\]\(([^:]*?)\)").unwrap())
}

/// Read and structurally repair an item file without writing anything back.
/// An empty file becomes a placeholder item; every line is newline-terminated
/// and a description line is guaranteed to exist.
pub fn load_raw(path: &Path) -> Result<RawParts> {
    let on_disk = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read item file {}", path.display()))?;

    let mut lines: Vec<String> = on_disk.split_inclusive('\n').map(str::to_string).collect();
    if lines.is_empty() {
        eprintln!("  warning: filling empty item {}", path.display());
        lines.push("# Empty #empty\n".to_string());
        lines.push("\n".to_string());
    }
    if lines.len() == 1 {
        lines.push("\n".to_string());
    }
    for line in &mut lines {
        if !line.ends_with('\n') {
            line.push('\n');
        }
    }

    let strip = |line: &str| line.strip_suffix('\n').unwrap_or(line).to_string();
    Ok(RawParts {
        title_line: strip(&lines[0]),
        description: strip(&lines[1]),
        content: lines[2..].concat(),
        on_disk,
    })
}

fn find_cover(base: &Path, hook: &str, item_path: &Path, content: &str) -> Result<Option<String>> {
    let Some(caps) = cover_regex().captures(content) else {
        return Ok(None);
    };
    let image = crate::paths::normalize(Path::new(&caps[2]));
    let full = base.join(hook).join(&image);
    if !full.is_file() {
        bail!(
            "cover image {} not found for {}",
            full.display(),
            item_path.display()
        );
    }
    Ok(Some(image.to_string_lossy().into_owned()))
}

impl Item {
    /// Parse already-read file parts into an item. Pure except for the
    /// cover-image existence check, which fails fast at parse time rather
    /// than when an emitter dereferences the path.
    pub fn parse(symbols: &Symbols, base: &Path, path: &Path, parts: &RawParts) -> Result<Item> {
        let parsed = title::decode(&parts.title_line, symbols);
        let path = crate::paths::normalize(path);
        let hook = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let cover = find_cover(base, &hook, &path, &parts.content)?;
        let full_title = title::encode(&parsed, symbols);

        Ok(Item {
            path,
            base: base.to_path_buf(),
            hook,
            filename,
            level: parsed.level,
            date: parsed.date,
            categories: parsed.categories,
            tags: parsed.tags,
            authors: parsed.authors,
            title: parsed.title,
            description: parts.description.clone(),
            content: parts.content.clone(),
            cover,
            full_title,
        })
    }

    /// The canonical on-disk serialization of this item.
    pub fn canonical_text(&self) -> String {
        format!("{}\n{}\n{}", self.full_title, self.description, self.content)
    }

    /// Rewrite the file when the canonical serialization differs from what
    /// was read. Returns whether a write happened.
    pub fn normalize_if_needed(&self, parts: &RawParts) -> Result<bool> {
        let canonical = self.canonical_text();
        if canonical == parts.on_disk {
            return Ok(false);
        }
        std::fs::write(&self.path, &canonical)
            .with_context(|| format!("failed to rewrite {}", self.path.display()))?;
        Ok(true)
    }

    /// Load one item, self-healing the file on disk when its header drifted
    /// from the canonical form.
    pub fn load(symbols: &Symbols, base: &Path, path: &Path) -> Result<Item> {
        let parts = load_raw(path)?;
        let item = Item::parse(symbols, base, path, &parts)?;
        item.normalize_if_needed(&parts)?;
        Ok(item)
    }
}
