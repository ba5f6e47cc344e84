//! Sigil configuration for the title-line micro-format.
//!
//! Each typed field is marked by a single-character sigil prefix on a token
//! of the title line; the `order` string is a permutation of [`ORDER_ALPHABET`]
//! (`d`ate, `c`ategory, `T`itle, `t`ag, `a`uthor) controlling how decoded
//! titles re-serialize. The configuration lives in `<base>/.symbols.json`
//! and is written out with defaults the first time a collection is indexed.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The five serialization slots, in default order.
pub const ORDER_ALPHABET: &str = "dcTta";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Symbols {
    pub tag: char,
    pub category: char,
    pub date: char,
    pub author: char,
    pub order: String,
}

impl Default for Symbols {
    fn default() -> Self {
        Self {
            tag: '#',
            category: '\u{00a9}',
            date: '\u{00f0}',
            author: '\u{00e6}',
            order: ORDER_ALPHABET.to_string(),
        }
    }
}

impl Symbols {
    /// Reject ambiguous configurations: two fields sharing a sigil would make
    /// decoding order-dependent, and an `order` string that is not an anagram
    /// of [`ORDER_ALPHABET`] would silently drop fields on encode.
    pub fn validate(&self) -> Result<()> {
        let sigils = [
            ("tag", self.tag),
            ("category", self.category),
            ("date", self.date),
            ("author", self.author),
        ];
        for (i, (name_a, sigil_a)) in sigils.iter().enumerate() {
            for (name_b, sigil_b) in &sigils[i + 1..] {
                if sigil_a == sigil_b {
                    bail!(
                        "symbols: '{}' and '{}' share the sigil '{}'",
                        name_a,
                        name_b,
                        sigil_a
                    );
                }
            }
        }

        let mut want: Vec<char> = ORDER_ALPHABET.chars().collect();
        let mut got: Vec<char> = self.order.chars().collect();
        want.sort_unstable();
        got.sort_unstable();
        if got != want {
            bail!(
                "symbols: 'order' must be an anagram of '{}', got '{}'",
                ORDER_ALPHABET,
                self.order
            );
        }
        Ok(())
    }
}

/// Load the symbol configuration, writing defaults when the file is missing.
pub fn load_symbols(path: &Path) -> Result<Symbols> {
    if !path.is_file() {
        eprintln!(
            "  warning: {} not found, writing default symbols",
            path.display()
        );
        let symbols = Symbols::default();
        let mut text = serde_json::to_string_pretty(&symbols)?;
        text.push('\n');
        std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        return Ok(symbols);
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let symbols: Symbols = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    symbols.validate()?;
    Ok(symbols)
}
