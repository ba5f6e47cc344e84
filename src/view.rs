//! Photo-board emission: markdown tables of thumbnail links, a fixed number
//! of posts per row, grouped the same way as the index.

use std::path::Path;

use crate::group::{display_name, group_by, GroupKey};
use crate::item::Item;
use crate::paths;
use crate::store::ItemStore;
use crate::thumbs;
use crate::title;

/// Shown when an item has no cover and no `empty_fig` is configured.
const PLACEHOLDER_FIG: &str = "https://placekitten.com/320/181";

pub struct ViewOptions<'a> {
    pub group_by: GroupKey,
    pub reverse: bool,
    pub posts_per_row: usize,
    pub empty_fig: Option<&'a str>,
}

pub fn generate(store: &mut ItemStore, out_file: &Path, options: &ViewOptions) -> String {
    let groups = group_by(&store.items, options.group_by, &mut store.labels, options.reverse);

    let mut out = String::new();
    out.push_str("\n## Links\n");
    for (bucket_key, _) in &groups {
        let label = display_name(bucket_key, options.group_by, &mut store.labels);
        out.push_str(&format!("- [{}](#{})\n", label, title::anchor_slug(&label)));
    }
    for (bucket_key, members) in &groups {
        let label = display_name(bucket_key, options.group_by, &mut store.labels);
        out.push_str(&format!("\n## {}\n\n", label));
        out.push_str(&table_for(members, out_file, options));
    }
    out
}

fn table_for(members: &[&Item], out_file: &Path, options: &ViewOptions) -> String {
    let mut cells: Vec<(String, String)> = Vec::new();
    for item in members {
        let thumb = match thumbs::thumb_path_full(item) {
            Some(thumb) => paths::directions(out_file, &thumb).display().to_string(),
            None => match options.empty_fig {
                Some(fig) => paths::directions(out_file, Path::new(fig)).display().to_string(),
                None => PLACEHOLDER_FIG.to_string(),
            },
        };
        let target = format!(
            "{}#{}",
            item.path.display(),
            title::anchor_slug(&item.full_title)
        );
        let link = paths::directions(out_file, Path::new(&target));
        let entry = format!("[![]({})]({})", thumb, link.display());
        let caption = match &item.date {
            Some(date) => format!("@{}<br>{}", date, item.title),
            None => format!("@{}<br>{}", item.hook, item.title),
        };
        cells.push((entry, caption));
    }

    // Pad the last row so every table row has the same column count.
    while !cells.is_empty() && cells.len() % options.posts_per_row != 0 {
        match options.empty_fig {
            Some(fig) => cells.push((format!("![]({})", fig), " ".to_string())),
            None => cells.push(("-".to_string(), "*".to_string())),
        }
    }

    let mut out = String::new();
    for row in cells.chunks(options.posts_per_row) {
        let entries: Vec<&str> = row.iter().map(|cell| cell.0.as_str()).collect();
        let captions: Vec<&str> = row.iter().map(|cell| cell.1.as_str()).collect();
        out.push_str(&entries.join("|"));
        out.push('\n');
        out.push_str(&vec!["-"; row.len()].join("|"));
        out.push('\n');
        out.push_str(&captions.join("|"));
        out.push_str("\n\n\n");
    }
    out
}
