//! Action pipeline execution.
//!
//! Runs the configured `execute` list in order, threading the loaded
//! [`ItemStore`] from the `load_folder` action into every action after it.
//! Each action's file writes are independent: there is no cross-file
//! atomicity, and a mid-run failure leaves earlier artifacts in place.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Command;

use crate::board;
use crate::config::{Action, Config};
use crate::index;
use crate::links;
use crate::posts::{self, PostsOptions};
use crate::store::ItemStore;
use crate::summary;
use crate::thumbs;
use crate::view::{self, ViewOptions};

/// Execute every configured action. `rebuild` forces thumbnail and post
/// regeneration regardless of modification times.
pub fn execute(config: &Config, rebuild: bool) -> Result<()> {
    let mut store: Option<ItemStore> = None;

    for action in &config.execute {
        match action {
            Action::Run { cmds } => {
                println!("Running scripts");
                run_commands(cmds)?;
            }
            Action::LoadFolder { dir } => {
                println!("Loading folder");
                store = Some(ItemStore::load(dir)?);
            }
            Action::Board {
                file,
                sort_by,
                reverse_sort,
            } => {
                println!("Generating board");
                board::generate(require_store(&mut store)?, file, *sort_by, *reverse_sort)?;
            }
            Action::Links { dir } => {
                println!("Generating links");
                links::generate(require_store(&mut store)?, dir)?;
            }
            Action::Thumbs { width, height } => {
                println!("Generating thumbs");
                thumbs::generate(require_store(&mut store)?, *width, *height, rebuild)?;
            }
            Action::Index {
                file,
                intro,
                group_by,
                reverse_sort,
            } => {
                println!("Generating index");
                let text =
                    index::generate(require_store(&mut store)?, file, *group_by, *reverse_sort);
                save_with_intro(intro.as_deref(), file, &text)?;
            }
            Action::Summary {
                file,
                intro,
                group_by,
            } => {
                println!("Generating summary");
                let text = summary::generate(require_store(&mut store)?, *group_by);
                save_with_intro(intro.as_deref(), file, &text)?;
            }
            Action::View {
                file,
                intro,
                group_by,
                reverse_sort,
                posts_per_row,
                empty_fig,
            } => {
                println!("Generating photo board");
                let options = ViewOptions {
                    group_by: *group_by,
                    reverse: *reverse_sort,
                    posts_per_row: *posts_per_row,
                    empty_fig: empty_fig.as_deref(),
                };
                let text = view::generate(require_store(&mut store)?, file, &options);
                save_with_intro(intro.as_deref(), file, &text)?;
            }
            Action::Posts {
                dir,
                base_raw_remote,
                categories_dir,
                file_linker,
                default_date,
            } => {
                println!("Generating posts");
                let options = PostsOptions {
                    dir,
                    remote: base_raw_remote,
                    default_date: default_date.as_deref(),
                    categories_dir,
                    file_linker: file_linker.as_deref(),
                    rebuild,
                };
                posts::generate(require_store(&mut store)?, &options)?;
            }
        }
    }
    Ok(())
}

fn require_store(store: &mut Option<ItemStore>) -> Result<&mut ItemStore> {
    store
        .as_mut()
        .ok_or_else(|| anyhow!("no item folder loaded; put a load_folder action before this one"))
}

fn run_commands(cmds: &[Vec<String>]) -> Result<()> {
    for cmd in cmds {
        println!("$ {}", cmd.join(" "));
        let status = Command::new(&cmd[0])
            .args(&cmd[1..])
            .status()
            .with_context(|| format!("failed to run {}", cmd[0]))?;
        if !status.success() {
            eprintln!("  warning: command exited with {}", status);
        }
    }
    Ok(())
}

/// Write generated text to `out_file`, prepending the `intro` file's content
/// when configured. A configured-but-missing intro file is fatal.
pub fn save_with_intro(intro: Option<&Path>, out_file: &Path, text: &str) -> Result<()> {
    let mut output = String::new();
    if let Some(intro) = intro {
        output = std::fs::read_to_string(intro)
            .with_context(|| format!("intro file not found: {}", intro.display()))?;
    }
    output.push_str(text);
    crate::paths::ensure_parent_dir(out_file)?;
    std::fs::write(out_file, output)
        .with_context(|| format!("failed to write {}", out_file.display()))?;
    Ok(())
}
