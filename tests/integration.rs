//! End-to-end tests driving the compiled `mdx` binary against a temporary
//! collection tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn mdx_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("mdx");
    path
}

/// Build a collection with two categorized items and one orphan, plus a
/// pipeline config covering board, links, index, summary and view.
fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let base = root.join("base");
    for (hook, text) in [
        (
            "000",
            "# \u{00a9}rust Ownership Basics #memory\nMoves and borrows.\n\nBody text.\n",
        ),
        (
            "001",
            "# \u{00a9}rust \u{00a9}async Pinning #memory #async\nWhy Pin exists.\n\nMore body.\n",
        ),
        ("002", "# Loose Notes\nUncategorized scribbles.\n\n"),
    ] {
        fs::create_dir_all(base.join(hook)).unwrap();
        fs::write(base.join(hook).join("Readme.md"), text).unwrap();
    }
    fs::write(
        base.join(".categories.csv"),
        "0,rust,Rust,The language\n0,async,Async,Concurrency\n",
    )
    .unwrap();

    let config = r#"{
  "execute": [
    { "action": "load_folder", "dir": "base" },
    { "action": "board", "file": ".mdx/board.md" },
    { "action": "links", "dir": ".mdx/links" },
    { "action": "index", "file": ".mdx/cat_index.md" },
    { "action": "index", "file": ".mdx/tag_index.md", "group_by": "tags" },
    { "action": "summary", "file": ".mdx/summary.md" },
    { "action": "view", "file": ".mdx/view.md", "posts_per_row": 2 }
  ]
}
"#;
    let config_path = root.join(".mdx.json");
    fs::write(&config_path, config).unwrap();

    (tmp, config_path)
}

fn run_mdx(root: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = mdx_binary();
    let output = Command::new(&binary)
        .current_dir(root)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run mdx binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_scaffolds_config() {
    let tmp = TempDir::new().unwrap();
    let (stdout, _stderr, ok) = run_mdx(tmp.path(), &["init"]);
    assert!(ok, "{}", stdout);
    let text = fs::read_to_string(tmp.path().join(".mdx.json")).unwrap();
    assert!(text.contains("\"action\": \"load_folder\""), "{}", text);
}

#[test]
fn test_run_generates_artifacts() {
    let (tmp, _config) = setup_test_env();
    let (stdout, stderr, ok) = run_mdx(tmp.path(), &["run"]);
    assert!(ok, "stdout: {}\nstderr: {}", stdout, stderr);
    assert!(stdout.contains("All done!"), "{}", stdout);

    // Board: one padded line per item, aligned columns.
    let board = fs::read_to_string(tmp.path().join(".mdx/board.md")).unwrap();
    assert_eq!(board.lines().count(), 3, "{}", board);
    assert!(board.contains("[](../base/000/Readme.md)"), "{}", board);
    assert!(board.contains("Moves and borrows."), "{}", board);

    // Category index: registry order (rust before async), orphan last.
    let index = fs::read_to_string(tmp.path().join(".mdx/cat_index.md")).unwrap();
    let rust_at = index.find("## Rust").unwrap();
    let async_at = index.find("## Async").unwrap();
    let orphan_at = index.find("## __orphan__").unwrap();
    assert!(rust_at < async_at && async_at < orphan_at, "{}", index);

    // Tag index: lexicographic tag order.
    let tags = fs::read_to_string(tmp.path().join(".mdx/tag_index.md")).unwrap();
    let async_tag = tags.find("## async").unwrap();
    let memory_tag = tags.find("## memory").unwrap();
    assert!(async_tag < memory_tag, "{}", tags);

    // Links: one stub per item, pointing back at the source.
    let stub = fs::read_to_string(tmp.path().join(".mdx/links/Ownership Basics.md")).unwrap();
    assert_eq!(stub, "[LINK](../../base/000/Readme.md)\n");

    // Summary lists hooks under each category.
    let summary = fs::read_to_string(tmp.path().join(".mdx/summary.md")).unwrap();
    assert!(summary.contains("## Rust"), "{}", summary);
    assert!(summary.contains("000"), "{}", summary);

    // View has a table with two posts per row.
    let view = fs::read_to_string(tmp.path().join(".mdx/view.md")).unwrap();
    assert!(view.contains("-|-"), "{}", view);
}

#[test]
fn test_run_normalizes_drifted_titles() {
    let (tmp, _config) = setup_test_env();
    // Write a drifted header: tag first, category after the title.
    let item = tmp.path().join("base/000/Readme.md");
    fs::write(
        &item,
        "# #memory Ownership Basics \u{00a9}rust\nMoves and borrows.\n\nBody text.\n",
    )
    .unwrap();

    let (_stdout, stderr, ok) = run_mdx(tmp.path(), &["run"]);
    assert!(ok, "{}", stderr);
    let healed = fs::read_to_string(&item).unwrap();
    assert!(
        healed.starts_with("# \u{00a9}rust Ownership Basics #memory\n"),
        "{}",
        healed
    );

    // A second run leaves the file byte-identical.
    run_mdx(tmp.path(), &["run"]);
    assert_eq!(fs::read_to_string(&item).unwrap(), healed);
}

#[test]
fn test_registry_reconciled_with_counts() {
    let (tmp, _config) = setup_test_env();
    let (_stdout, _stderr, ok) = run_mdx(tmp.path(), &["run"]);
    assert!(ok);

    let table = fs::read_to_string(tmp.path().join("base/.categories.csv")).unwrap();
    let rows: Vec<&str> = table.lines().collect();
    // Registered keys keep file order; counts are recomputed; the orphan
    // sentinel was appended at the high index.
    assert_eq!(rows[0], "2,rust,Rust,The language");
    assert_eq!(rows[1], "1,async,Async,Concurrency");
    assert_eq!(rows[2], "1,__orphan__,__orphan__,__orphan__");
}

#[test]
fn test_board_edits_push_back() {
    let (tmp, _config) = setup_test_env();
    run_mdx(tmp.path(), &["run"]);

    // Edit the orphan item's title and description on the board.
    let board_path = tmp.path().join(".mdx/board.md");
    let board = fs::read_to_string(&board_path).unwrap();
    let edited: String = board
        .lines()
        .map(|line| {
            if line.contains("base/002/Readme.md") {
                "[](../base/002/Readme.md) : # Loose Notes \u{00a9}notes : A better description\n"
                    .to_string()
            } else {
                format!("{}\n", line)
            }
        })
        .collect();
    fs::write(&board_path, edited).unwrap();

    let (_stdout, stderr, ok) = run_mdx(tmp.path(), &["run", "--board", ".mdx/board.md"]);
    assert!(ok, "{}", stderr);

    let item = fs::read_to_string(tmp.path().join("base/002/Readme.md")).unwrap();
    assert!(item.starts_with("# \u{00a9}notes Loose Notes\n"), "{}", item);
    assert!(item.contains("A better description"), "{}", item);

    // The new category reached the registry at the sentinel position.
    let table = fs::read_to_string(tmp.path().join("base/.categories.csv")).unwrap();
    assert!(
        table.lines().any(|row| row.starts_with("1,notes,")),
        "{}",
        table
    );
}

#[test]
fn test_unknown_action_fails_before_any_io() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".mdx.json"),
        r#"{"execute": [{"action": "frobnicate"}]}"#,
    )
    .unwrap();
    let (_stdout, stderr, ok) = run_mdx(tmp.path(), &["run"]);
    assert!(!ok);
    assert!(stderr.contains("parse"), "{}", stderr);
}

#[test]
fn test_missing_base_dir_is_fatal() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".mdx.json"),
        r#"{"execute": [{"action": "load_folder", "dir": "missing"}]}"#,
    )
    .unwrap();
    let (_stdout, stderr, ok) = run_mdx(tmp.path(), &["run"]);
    assert!(!ok);
    assert!(stderr.contains("base directory is missing"), "{}", stderr);
}

#[test]
fn test_empty_item_file_filled_with_placeholder() {
    let (tmp, _config) = setup_test_env();
    let empty = tmp.path().join("base/003");
    fs::create_dir_all(&empty).unwrap();
    fs::write(empty.join("Readme.md"), "").unwrap();

    let (_stdout, stderr, ok) = run_mdx(tmp.path(), &["run"]);
    assert!(ok, "{}", stderr);
    let healed = fs::read_to_string(empty.join("Readme.md")).unwrap();
    assert_eq!(healed, "# Empty #empty\n\n");
    assert!(stderr.contains("warning: filling empty item"), "{}", stderr);
}
