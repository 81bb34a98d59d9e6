//! Per-interface detail block extraction.
//!
//! The detail dump is a sequence of blocks, normally separated by blank
//! lines. A block opens with any line that starts with the interface name
//! (for example `GE1/0/1 current state : UP`); its body is every following
//! line up to the next blank line. The opening line itself is not part of
//! the body.
//!
//! A name only matches when followed by whitespace or end-of-line, so
//! `GE1/0/1` never picks up the block of `GE1/0/10`.

use std::collections::{HashMap, HashSet};

use crate::util::starts_with_name;

/// Extracts the detail block body for `interface` by scanning the dump.
///
/// Returns an empty string when the interface never appears. Lines inside
/// the block that start with the interface name again are skipped.
///
/// # Examples
///
/// ```
/// use portwatch_parser::detail::extract_detail_block;
///
/// let dump = "\
/// GE1/0/1 current state : UP
/// Line protocol current state : UP
/// Description: uplink
///
/// GE1/0/10 current state : DOWN
/// Line protocol current state : DOWN
/// ";
///
/// assert_eq!(
///     extract_detail_block(dump, "GE1/0/1"),
///     "Line protocol current state : UP\nDescription: uplink"
/// );
/// assert_eq!(extract_detail_block(dump, "GE1/0/2"), "");
/// ```
pub fn extract_detail_block(dump: &str, interface: &str) -> String {
    let mut collected: Vec<&str> = Vec::new();
    let mut collecting = false;

    for line in dump.lines() {
        if starts_with_name(line, interface) {
            collecting = true;
        } else if collecting && line.trim().is_empty() {
            break;
        } else if collecting {
            collected.push(line);
        }
    }

    collected.join("\n")
}

/// Detail blocks for a set of interfaces, built with one pass over the dump.
///
/// Every entry equals what [`extract_detail_block`] returns for that name:
/// a block opens on any line that starts with a wanted interface name, runs
/// to the next blank line, and the first block for a name wins. Blocks may
/// overlap when the dump has no blank line between them. Names that never
/// open a block are absent from the index.
#[derive(Debug, Clone, Default)]
pub struct DetailIndex {
    blocks: HashMap<String, String>,
}

impl DetailIndex {
    /// Indexes the blocks of `interfaces` found in the dump.
    pub fn build<'n, I>(dump: &str, interfaces: I) -> Self
    where
        I: IntoIterator<Item = &'n str>,
    {
        let wanted: HashSet<&str> = interfaces.into_iter().collect();
        let mut blocks: HashMap<String, String> = HashMap::new();
        let mut open: Vec<(&str, Vec<&str>)> = Vec::new();

        for line in dump.lines() {
            if line.trim().is_empty() {
                for (name, body) in open.drain(..) {
                    blocks.insert(name.to_string(), body.join("\n"));
                }
                continue;
            }

            let header = line
                .split_whitespace()
                .next()
                .filter(|name| starts_with_name(line, name))
                .filter(|name| wanted.contains(name) && !blocks.contains_key(*name));

            for (name, body) in &mut open {
                if header != Some(*name) {
                    body.push(line);
                }
            }
            if let Some(name) = header {
                if !open.iter().any(|(open_name, _)| *open_name == name) {
                    open.push((name, Vec::new()));
                }
            }
        }

        for (name, body) in open {
            blocks.insert(name.to_string(), body.join("\n"));
        }

        Self { blocks }
    }

    /// Returns the block body for `interface`, if the dump had one.
    pub fn get(&self, interface: &str) -> Option<&str> {
        self.blocks.get(interface).map(String::as_str)
    }

    pub fn contains(&self, interface: &str) -> bool {
        self.blocks.contains_key(interface)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates indexed interface names in no particular order.
    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }
}
