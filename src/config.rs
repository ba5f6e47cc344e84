//! Pipeline configuration (`.mdx.json`).
//!
//! The config file is a JSON object with an `execute` array; each entry
//! names an action plus its parameters. Unknown actions, unknown keys and
//! missing required keys are all rejected while the file is parsed, before
//! any filesystem work starts.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::group::GroupKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub execute: Vec<Action>,
}

/// One pipeline step. The `action` tag selects the variant; every other key
/// is variant-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Action {
    /// Run external commands, e.g. fetchers that populate the base dir.
    Run { cmds: Vec<Vec<String>> },

    /// Load the item folder; prerequisite for every action below.
    LoadFolder { dir: PathBuf },

    /// Emit the hand-editable board manifest.
    Board {
        file: PathBuf,
        #[serde(default = "default_group_key")]
        sort_by: GroupKey,
        #[serde(default)]
        reverse_sort: bool,
    },

    /// Regenerate one link-stub file per item.
    Links { dir: PathBuf },

    /// Generate missing or stale thumbnails for item covers.
    Thumbs { width: u32, height: u32 },

    /// Emit a grouped table of contents with per-item links.
    Index {
        file: PathBuf,
        #[serde(default)]
        intro: Option<PathBuf>,
        #[serde(default = "default_group_key")]
        group_by: GroupKey,
        #[serde(default)]
        reverse_sort: bool,
    },

    /// Emit one hook-list section per group.
    Summary {
        file: PathBuf,
        #[serde(default)]
        intro: Option<PathBuf>,
        #[serde(default = "default_group_key")]
        group_by: GroupKey,
    },

    /// Emit the thumbnail-grid photo board.
    View {
        file: PathBuf,
        #[serde(default)]
        intro: Option<PathBuf>,
        #[serde(default = "default_group_key")]
        group_by: GroupKey,
        #[serde(default)]
        reverse_sort: bool,
        #[serde(default = "default_posts_per_row")]
        posts_per_row: usize,
        #[serde(default)]
        empty_fig: Option<String>,
    },

    /// Emit blog-style posts plus per-category pages.
    Posts {
        dir: PathBuf,
        base_raw_remote: String,
        categories_dir: PathBuf,
        #[serde(default)]
        file_linker: Option<PathBuf>,
        #[serde(default)]
        default_date: Option<String>,
    },
}

fn default_group_key() -> GroupKey {
    GroupKey::Categories
}

fn default_posts_per_row() -> usize {
    4
}

impl Config {
    /// The scaffold written by `mdx init`.
    pub fn default_config() -> Config {
        Config {
            execute: vec![
                Action::LoadFolder { dir: "base".into() },
                Action::Board {
                    file: ".mdx/board.md".into(),
                    sort_by: GroupKey::Categories,
                    reverse_sort: false,
                },
                Action::Links { dir: ".mdx/links".into() },
                Action::Thumbs { width: 320, height: 180 },
                Action::Index {
                    file: ".mdx/cat_index.md".into(),
                    intro: None,
                    group_by: GroupKey::Categories,
                    reverse_sort: false,
                },
                Action::View {
                    file: ".mdx/cat_view.md".into(),
                    intro: None,
                    group_by: GroupKey::Categories,
                    reverse_sort: false,
                    posts_per_row: 3,
                    empty_fig: None,
                },
            ],
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| {
        format!(
            "failed to read config file {} (run `mdx init` to create one)",
            path.display()
        )
    })?;
    let config: Config = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    for action in &config.execute {
        match action {
            Action::Run { cmds } => {
                if cmds.iter().any(|cmd| cmd.is_empty()) {
                    bail!("run.cmds entries must not be empty");
                }
            }
            Action::Thumbs { width, height } => {
                if *width == 0 || *height == 0 {
                    bail!("thumbs.width and thumbs.height must be > 0");
                }
            }
            Action::View { posts_per_row, .. } => {
                if *posts_per_row == 0 {
                    bail!("view.posts_per_row must be > 0");
                }
            }
            Action::Posts {
                default_date: Some(date),
                ..
            } => {
                chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").with_context(|| {
                    format!("posts.default_date must be YYYY-MM-DD, got '{}'", date)
                })?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// `mdx init` — write the default pipeline configuration.
pub fn write_default_config(path: &Path) -> Result<()> {
    let mut text = serde_json::to_string_pretty(&Config::default_config())?;
    text.push('\n');
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}
