//! Grouping and ordering of items along one attribute.
//!
//! Grouping is multi-membership: an item with three tags appears in three
//! tag buckets. Bucket contents always sort by canonical title ascending;
//! the `reverse` flag inverts bucket order only.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::item::Item;
use crate::labels::{LabelRegistry, ORPHAN};

/// The closed set of attributes items can be grouped by. Config strings
/// parse straight into this enum, so an unsupported attribute fails when the
/// configuration is validated instead of mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Title,
    FullTitle,
    Hook,
    Date,
    Categories,
    Tags,
    Authors,
}

impl GroupKey {
    /// The attribute's values for one item. Multi-valued attributes yield
    /// every element; absent single values yield nothing (which lands the
    /// item in the orphan bucket).
    pub fn values<'a>(self, item: &'a Item) -> Vec<&'a str> {
        match self {
            GroupKey::Title => vec![item.title.as_str()],
            GroupKey::FullTitle => vec![item.full_title.as_str()],
            GroupKey::Hook => vec![item.hook.as_str()],
            GroupKey::Date => item.date.as_deref().into_iter().collect(),
            GroupKey::Categories => item.categories.iter().map(String::as_str).collect(),
            GroupKey::Tags => item.tags.iter().map(String::as_str).collect(),
            GroupKey::Authors => item.authors.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupKey::Title => "title",
            GroupKey::FullTitle => "fulltitle",
            GroupKey::Hook => "hook",
            GroupKey::Date => "date",
            GroupKey::Categories => "categories",
            GroupKey::Tags => "tags",
            GroupKey::Authors => "authors",
        };
        f.write_str(name)
    }
}

/// Group `items` by `key` into ordered `(bucket key, items)` pairs.
///
/// Buckets grouped by the registry-backed dimension order by registry index;
/// any other attribute orders lexicographically. Ties keep first-appearance
/// order in both directions, so `reverse` is a stable descending sort, not a
/// flip of the ascending result.
pub fn group_by<'a>(
    items: &'a [Item],
    key: GroupKey,
    labels: &mut LabelRegistry,
    reverse: bool,
) -> Vec<(String, Vec<&'a Item>)> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<&Item>> = HashMap::new();
    let mut push = |order: &mut Vec<String>, bucket_key: &str, item: &'a Item| {
        if !buckets.contains_key(bucket_key) {
            order.push(bucket_key.to_string());
        }
        buckets.entry(bucket_key.to_string()).or_default().push(item);
    };

    for item in items {
        let values = key.values(item);
        if values.is_empty() {
            push(&mut order, ORPHAN, item);
        } else {
            for value in values {
                push(&mut order, value, item);
            }
        }
    }

    let mut out: Vec<(String, Vec<&Item>)> = order
        .into_iter()
        .map(|bucket_key| {
            let mut members = buckets.remove(&bucket_key).unwrap_or_default();
            members.sort_by(|a, b| a.full_title.cmp(&b.full_title));
            (bucket_key, members)
        })
        .collect();

    if key == GroupKey::Categories {
        for (bucket_key, _) in &out {
            labels.get_label(bucket_key);
        }
        if reverse {
            out.sort_by(|a, b| labels.index_of(&b.0).cmp(&labels.index_of(&a.0)));
        } else {
            out.sort_by(|a, b| labels.index_of(&a.0).cmp(&labels.index_of(&b.0)));
        }
    } else if reverse {
        out.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        out.sort_by(|a, b| a.0.cmp(&b.0));
    }
    out
}

/// Display text for a bucket key: the registry label for the categorical
/// dimension, the raw key for everything else.
pub fn display_name(bucket_key: &str, key: GroupKey, labels: &mut LabelRegistry) -> String {
    if key == GroupKey::Categories {
        labels.get_label(bucket_key).label.clone()
    } else {
        bucket_key.to_string()
    }
}
