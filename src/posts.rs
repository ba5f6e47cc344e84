//! Blog-style post emission for a Jekyll-like static site.
//!
//! Every dated, covered item becomes one post file with YAML front matter;
//! relative links inside the body are rewritten against a raw-content remote
//! so the post renders outside the repository. A category page stub is
//! emitted per non-empty category, and an optional layout file gets its
//! `<!--BEGIN-->`/`<!--END-->` block replaced with the category link list.
//!
//! Front matter and post filenames use the item's **first** category only;
//! grouping and the category pages use every category.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;

use crate::group::{group_by, GroupKey};
use crate::item::Item;
use crate::labels::{Label, LabelRegistry, ORPHAN};
use crate::store::ItemStore;
use crate::thumbs;
use crate::title;

pub struct PostsOptions<'a> {
    pub dir: &'a Path,
    /// Raw-content base URL, e.g. `https://raw.githubusercontent.com/u/r/master/base`.
    pub remote: &'a str,
    pub default_date: Option<&'a str>,
    pub categories_dir: &'a Path,
    pub file_linker: Option<&'a Path>,
    pub rebuild: bool,
}

fn image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!\[(.*?)\]\(([^:]*?)\)").unwrap())
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*?)\]\(([^:]*?)\)").unwrap())
}

fn img_src_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<img src="([^:]*?)""#).unwrap())
}

pub fn generate(store: &mut ItemStore, options: &PostsOptions) -> Result<()> {
    std::fs::create_dir_all(options.dir)
        .with_context(|| format!("failed to create {}", options.dir.display()))?;
    for item in &store.items {
        remove_stale_posts(item, options.dir, options.rebuild)?;
        write_post(item, &mut store.labels, options)?;
    }
    generate_category_pages(store, options.categories_dir, options.file_linker)?;
    Ok(())
}

fn write_post(item: &Item, labels: &mut LabelRegistry, options: &PostsOptions) -> Result<()> {
    let Some(date) = item.date.as_deref().or(options.default_date) else {
        eprintln!(
            "  warning: date missing on {}, skipping post",
            item.path.display()
        );
        return Ok(());
    };
    let Some(cover) = item.cover.as_deref() else {
        eprintln!(
            "  warning: cover missing on {}, skipping post",
            item.path.display()
        );
        return Ok(());
    };
    let remote = options.remote.trim_end_matches('/');
    let category = labels.get_label(&item.categories[0]).clone();

    let mut out = String::new();
    out.push_str("---\nlayout: post\n");
    out.push_str(&format!("title: {}\n", item.title));
    out.push_str(&format!("image: {}/{}/{}\n", remote, item.hook, cover));
    if let Some(thumb) = thumbs::thumb_path(item) {
        out.push_str(&format!("optimized_image: {}/{}\n", remote, thumb.display()));
    }
    if !item.description.is_empty() {
        let description = title::strip_heading_marker(&item.description);
        out.push_str(&format!("subtitle: {}\n", description));
        out.push_str(&format!("description: {}\n", description));
    }
    out.push_str(&format!("category: {}\n", category.key));
    if !item.tags.iter().any(|tag| tag == ORPHAN) {
        out.push_str("tags:\n");
        for tag in &item.tags {
            out.push_str(&format!("  - {}\n", tag));
        }
    }
    for author in &item.authors {
        if author != ORPHAN {
            out.push_str(&format!("author: {}\n", author));
        }
    }
    out.push_str("---\n");
    for _ in 0..5 {
        out.push_str("<!-- DON'T EDIT THIS FILE, GENERATED BY SCRIPT -->\n");
    }
    out.push_str(&item.content);
    out.push_str(&tests_link(item));

    // The cover reference is dropped (the front matter already carries it);
    // every other relative link and <img src> is rewritten against the remote.
    let text = image_regex().replace(&out, "");
    let text = link_regex().replace_all(&text, |caps: &regex::Captures| {
        format!("[{}]({}/{}/{})", &caps[1], remote, item.hook, &caps[2])
    });
    let text = img_src_regex().replace_all(&text, |caps: &regex::Captures| {
        format!("<img src=\"{}/{}/{}\"", remote, item.hook, &caps[1])
    });

    let path = options.dir.join(post_filename(item, &category, date));
    std::fs::write(&path, text.as_bytes())
        .with_context(|| format!("failed to write post {}", path.display()))?;
    Ok(())
}

/// `slug(date-cNN-categorykey-title)-@<hook>.md`, `--` runs collapsed.
fn post_filename(item: &Item, category: &Label, date: &str) -> String {
    let stem = format!(
        "{}-c{:02}-{}-{}",
        date, category.index, category.key, item.title
    );
    let mut name = format!("{}-@{}.md", title::anchor_slug(&stem), item.hook);
    while name.contains("--") {
        name = name.replace("--", "-");
    }
    name
}

fn tests_link(item: &Item) -> String {
    let test_path = item.base.join(&item.hook).join("t.tio");
    if test_path.is_file() {
        "\n## Tests\n[DOWNLOAD](t.tio)\n\n".to_string()
    } else {
        String::new()
    }
}

/// Delete previously generated posts for this hook when the source item is
/// newer (or a rebuild is forced); the post is then rewritten under its
/// current name, so renames do not leave stale files behind.
fn remove_stale_posts(item: &Item, posts_dir: &Path, rebuild: bool) -> Result<()> {
    let suffix = format!("-@{}.md", item.hook);
    let source_mtime = mtime(&item.path)?;
    for entry in std::fs::read_dir(posts_dir)
        .with_context(|| format!("failed to read {}", posts_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(&suffix) {
            continue;
        }
        if rebuild || source_mtime > mtime(&path)? {
            println!("  replacing post {}", path.display());
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}

fn mtime(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("failed to stat {}", path.display()))
}

fn generate_category_pages(
    store: &mut ItemStore,
    categories_dir: &Path,
    file_linker: Option<&Path>,
) -> Result<()> {
    let categories_dir = crate::paths::normalize(categories_dir);
    if categories_dir.is_dir() {
        let _ = std::fs::remove_dir_all(&categories_dir);
    }
    std::fs::create_dir_all(&categories_dir)
        .with_context(|| format!("failed to create {}", categories_dir.display()))?;

    let groups = group_by(&store.items, GroupKey::Categories, &mut store.labels, false);
    let mut link_entries: Vec<String> = Vec::new();
    for (bucket_key, members) in &groups {
        if members.is_empty() {
            continue;
        }
        let label = store.labels.get_label(bucket_key).clone();
        link_entries.push(format!(
            "<li><a href=\"/category/{}\">{{{{ \"{}\" }}}}</a></li>\n",
            label.key, label.label
        ));
        let page = format!(
            "---\nlayout: category\ntitle: {}\nslug: {}\ndescription: {}\n---\n",
            label.label, label.key, label.description
        );
        let page_path = categories_dir.join(format!("{}.md", label.key));
        std::fs::write(&page_path, page)
            .with_context(|| format!("failed to write {}", page_path.display()))?;
    }

    if let Some(linker) = file_linker {
        let text = std::fs::read_to_string(linker)
            .with_context(|| format!("failed to read linker file {}", linker.display()))?;
        static LINKER_RE: OnceLock<Regex> = OnceLock::new();
        let re = LINKER_RE.get_or_init(|| {
            Regex::new(r"(?ms)<!--BEGIN-->\n(.*?)^\s*<!--END-->").unwrap()
        });
        let joined = link_entries.concat();
        let replaced = re.replace_all(&text, |_caps: &regex::Captures| {
            format!("<!--BEGIN-->\n{}<!--END-->", joined)
        });
        std::fs::write(linker, replaced.as_bytes())
            .with_context(|| format!("failed to write linker file {}", linker.display()))?;
    }
    Ok(())
}
