//! Title-line micro-format codec.
//!
//! Line 1 of every item packs typed metadata into one free-text line using
//! sigil prefixes, e.g. with the default symbols:
//!
//! ```text
//! ## ð2023-05-01 ©rust Fearless Concurrency #async æalice
//! ```
//!
//! Decoding tolerates hand-edited drift: stray marker tokens are discarded,
//! repeated dates keep the first, unsigiled tokens fall into the title.
//! Encoding is a pure function of the parsed fields and the configured field
//! order, so decode → encode → decode is stable and repeated normalization
//! passes leave a file untouched.

use crate::labels::ORPHAN;
use crate::symbols::Symbols;

/// The decoded form of one title line.
///
/// `categories`, `tags` and `authors` are never empty: absence is the
/// single-element `[ORPHAN]` list, which [`encode`] never re-serializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    /// Heading marker token (`#`, `##`, ...), when the line starts with one.
    pub level: Option<String>,
    pub date: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
    pub title: String,
}

/// True for tokens made only of the heading marker character. The empty
/// token qualifies, which also drops the artifacts of doubled spaces.
pub(crate) fn only_hashtags(token: &str) -> bool {
    token.chars().all(|c| c == '#')
}

/// Remove every token starting with `sigil` from `words`, returning the
/// values with the sigil stripped, in order of appearance.
fn drain_sigil(words: &mut Vec<String>, sigil: char) -> Vec<String> {
    let mut taken = Vec::new();
    words.retain(|word| match word.strip_prefix(sigil) {
        Some(value) => {
            taken.push(value.to_string());
            false
        }
        None => true,
    });
    taken
}

fn or_orphan(values: Vec<String>) -> Vec<String> {
    if values.is_empty() {
        vec![ORPHAN.to_string()]
    } else {
        values
    }
}

/// Decode one title line.
///
/// Extraction order is fixed (tags, categories, authors, date) so the result
/// is deterministic; sigils are guaranteed distinct by
/// [`Symbols::validate`], so each token is consumed by at most one field.
pub fn decode(line: &str, symbols: &Symbols) -> ParsedTitle {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let mut words: Vec<String> = line.split(' ').map(str::to_string).collect();

    let mut level = None;
    if let Some(first) = words.first() {
        if !first.is_empty() && only_hashtags(first) {
            level = Some(words.remove(0));
        }
    }
    words.retain(|word| !only_hashtags(word));

    let tags = drain_sigil(&mut words, symbols.tag);
    let categories = drain_sigil(&mut words, symbols.category);
    let authors = drain_sigil(&mut words, symbols.author);
    let mut dates = drain_sigil(&mut words, symbols.date);

    let title = words.join(" ").trim().to_string();
    // Several date tokens is malformed input, not an error: first wins.
    let date = if dates.is_empty() {
        None
    } else {
        Some(dates.remove(0))
    };

    ParsedTitle {
        level,
        date,
        categories: or_orphan(categories),
        tags: or_orphan(tags),
        authors: or_orphan(authors),
        title,
    }
}

/// Re-serialize a parsed title in the field order carried by `symbols.order`
/// (a permutation of `dcTta`). The level token, when present, always comes
/// first; `ORPHAN` placeholders and empty date/title are skipped.
pub fn encode(parsed: &ParsedTitle, symbols: &Symbols) -> String {
    let mut out: Vec<String> = Vec::new();
    if let Some(level) = &parsed.level {
        if !level.is_empty() {
            out.push(level.clone());
        }
    }
    for slot in symbols.order.chars() {
        match slot {
            'd' => {
                if let Some(date) = &parsed.date {
                    if !date.is_empty() {
                        out.push(format!("{}{}", symbols.date, date));
                    }
                }
            }
            'c' => {
                for category in &parsed.categories {
                    if category != ORPHAN {
                        out.push(format!("{}{}", symbols.category, category));
                    }
                }
            }
            'T' => {
                if !parsed.title.is_empty() {
                    out.push(parsed.title.clone());
                }
            }
            't' => {
                for tag in &parsed.tags {
                    if tag != ORPHAN {
                        out.push(format!("{}{}", symbols.tag, tag));
                    }
                }
            }
            'a' => {
                for author in &parsed.authors {
                    if author != ORPHAN {
                        out.push(format!("{}{}", symbols.author, author));
                    }
                }
            }
            _ => {}
        }
    }
    out.join(" ")
}

/// Drop a leading run-of-`#` token (the heading marker) from a title line.
/// Tokenization is preserved, so interior spacing survives.
pub fn strip_heading_marker(line: &str) -> String {
    let line = line.strip_suffix('\n').unwrap_or(line);
    if line.is_empty() {
        return String::new();
    }
    let words: Vec<&str> = line.split(' ').collect();
    if only_hashtags(words[0]) {
        words[1..].join(" ")
    } else {
        words.join(" ")
    }
}

/// Anchor slug for a heading line, matching how markdown renderers link
/// `## Some Title` as `#some-title`: lowercase, spaces and dashes become
/// `-`, underscores survive, everything else non-alphanumeric is dropped.
pub fn anchor_slug(title: &str) -> String {
    let title = strip_heading_marker(title).to_lowercase();
    let mut out = String::new();
    for c in title.chars() {
        match c {
            ' ' | '-' => out.push('-'),
            '_' => out.push('_'),
            c if c.is_alphanumeric() => out.push(c),
            _ => {}
        }
    }
    out
}
