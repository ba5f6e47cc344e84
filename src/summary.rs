//! Summary emission: one section per group, listing member hooks.

use crate::group::{display_name, group_by, GroupKey};
use crate::store::ItemStore;

pub fn generate(store: &mut ItemStore, group_key: GroupKey) -> String {
    let groups = group_by(&store.items, group_key, &mut store.labels, false);

    let mut out = String::new();
    for (bucket_key, members) in &groups {
        let label = display_name(bucket_key, group_key, &mut store.labels);
        out.push_str(&format!("\n## {}\n\n", label));
        for item in members {
            out.push_str(&item.hook);
            out.push(' ');
        }
        out.push_str("\n\n");
    }
    out
}
