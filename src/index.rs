//! Grouped index emission: a "## Links" table of contents followed by one
//! section per group, each listing `[title](path#anchor)` entries.

use std::path::Path;

use crate::group::{display_name, group_by, GroupKey};
use crate::paths;
use crate::store::ItemStore;
use crate::title;

pub fn generate(
    store: &mut ItemStore,
    out_file: &Path,
    group_key: GroupKey,
    reverse: bool,
) -> String {
    let groups = group_by(&store.items, group_key, &mut store.labels, reverse);

    let mut out = String::new();
    out.push_str("\n## Links\n");
    for (bucket_key, _) in &groups {
        let label = display_name(bucket_key, group_key, &mut store.labels);
        out.push_str(&format!("- [{}](#{})\n", label, title::anchor_slug(&label)));
    }
    for (bucket_key, members) in &groups {
        let label = display_name(bucket_key, group_key, &mut store.labels);
        out.push_str(&format!("\n## {}\n\n", label));
        for item in members {
            let target = format!(
                "{}#{}",
                item.path.display(),
                title::anchor_slug(&item.full_title)
            );
            out.push_str(&format!(
                "- [{}]({})\n",
                item.title.trim(),
                paths::directions(out_file, Path::new(&target)).display()
            ));
        }
    }
    out
}
