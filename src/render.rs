//! Plain-text views of accounts, posts and comment threads.

use std::collections::HashSet;
use std::fmt::Write as _;

use once_cell::sync::Lazy;

use crate::models::{AccountSummary, Id, Post, TOMBSTONE_MESSAGE};

const INDENT: &str = "    ";
const BRANCH: &str = "| > ";

/// `-` rule as wide as the tombstone text.
static TOMBSTONE_RULE: Lazy<String> = Lazy::new(|| "-".repeat(TOMBSTONE_MESSAGE.chars().count()));

pub fn account(a: &AccountSummary) -> String {
    format!(
        "ID: {}\nHandle: {}\nDescription: {}\nPost count: {}\nEndorse count: {}",
        a.id, a.handle, a.description, a.post_count, a.endorsement_count
    )
}

pub fn post(p: &Post, handle: Option<&str>) -> String {
    if p.deleted {
        let rule = TOMBSTONE_RULE.as_str();
        return format!("{rule}\n{TOMBSTONE_MESSAGE}\n{rule}");
    }
    format!(
        "ID: {}\nAccount: {}\nNo. endorsements: {} | No. comments: {}\n{}",
        p.id,
        handle.unwrap_or_default(),
        p.endorsements.len(),
        p.comments.len(),
        p.message
    )
}

/// Pre-order walk of `root` and every comment below it, tombstones included.
///
/// Each level is indented by four spaces; a child's first line hangs off a
/// `| > ` branch at its parent's indentation, and a lone `|` line separates a
/// parent from its first child. Ids already rendered are skipped.
pub fn thread<'a, F>(root: Id, lookup: F) -> String
where
    F: Fn(Id) -> Option<(&'a Post, Option<&'a str>)>,
{
    let mut out = String::new();
    let mut visited = HashSet::new();
    // (id, depth, first child of its parent)
    let mut stack = vec![(root, 0usize, false)];

    while let Some((id, depth, first)) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some((node, handle)) = lookup(id) else { continue };
        let parent_pad = INDENT.repeat(depth.saturating_sub(1));
        if first {
            let _ = writeln!(out, "{parent_pad}|");
        }
        for (i, line) in post(node, handle).lines().enumerate() {
            match (depth, i) {
                (0, _) => { let _ = writeln!(out, "{line}"); }
                (_, 0) => { let _ = writeln!(out, "{parent_pad}{BRANCH}{line}"); }
                _ => { let _ = writeln!(out, "{}{line}", INDENT.repeat(depth)); }
            }
        }
        for (i, child) in node.comments.iter().enumerate().rev() {
            stack.push((*child, depth + 1, i == 0));
        }
    }

    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out
}
