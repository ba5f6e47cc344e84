//! # mdindex CLI (`mdx`)
//!
//! The `mdx` binary maintains a folder-per-item markdown collection and
//! regenerates its derived artifacts: the board manifest, link stubs,
//! grouped indexes, the thumbnail photo board, and blog-style posts.
//!
//! ## Usage
//!
//! ```bash
//! mdx --config ./.mdx.json <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mdx init` | Write a default `.mdx.json` pipeline configuration |
//! | `mdx run` | Execute the configured action pipeline |
//! | `mdx run --board <file>` | Push board edits into item files, then run |
//! | `mdx run --rebuild` | Force thumbnail and post regeneration |
//!
//! ## Examples
//!
//! ```bash
//! # Scaffold a configuration
//! mdx init
//!
//! # Normalize items and regenerate every artifact
//! mdx run
//!
//! # Bulk-edit titles: edit .mdx/board.md, then push the edits back
//! mdx run --board .mdx/board.md
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use mdindex::{board, config, pipeline};

/// mdindex CLI — a folder-per-item markdown collection indexer.
///
/// All commands accept a `--config` flag pointing to a JSON pipeline
/// configuration. Run `mdx init` to scaffold one.
#[derive(Parser)]
#[command(
    name = "mdx",
    about = "mdindex — a folder-per-item markdown collection indexer",
    version,
    long_about = "mdindex maintains a directory of markdown items whose first line encodes \
    structured metadata (title, date, categories, tags, authors) via sigil prefixes, and \
    regenerates derived artifacts from it: a hand-editable board manifest, category/tag \
    indexes, link stubs, thumbnails, and blog-style posts."
)]
struct Cli {
    /// Path to the pipeline configuration file (JSON).
    #[arg(long, global = true, default_value = "./.mdx.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Write a default pipeline configuration.
    ///
    /// The scaffold loads `base/`, then emits the board, link stubs,
    /// thumbnails, a category index and the photo board. Edit it to taste.
    Init,

    /// Execute the configured action pipeline.
    ///
    /// Loading the item folder normalizes drifted title lines in place;
    /// every artifact is then regenerated from the normalized collection.
    Run {
        /// Push title/description edits from a board manifest back into the
        /// item files before the pipeline runs.
        #[arg(long)]
        board: Option<PathBuf>,

        /// Regenerate thumbnails and posts even when they look current.
        #[arg(long)]
        rebuild: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            config::write_default_config(&cli.config)?;
        }
        Commands::Run {
            board: board_file,
            rebuild,
        } => {
            let cfg = config::load_config(&cli.config)?;
            if let Some(board_file) = board_file {
                println!("Updating titles from board");
                board::update_titles(&board_file, Path::new("."))?;
            }
            pipeline::execute(&cfg, rebuild)?;
            println!("All done!");
        }
    }

    Ok(())
}
