//! Selection of added lines from parsed hunks.

use crate::diff::{Hunk, LineKind};
use bstr::{BStr, BString};

/// Rule for deciding which `+` lines count as added content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdditionFilter {
    /// Drop `+` lines whose second character is also `+`.
    ///
    /// A `+++ b/path` file header misread as a hunk line looks exactly like
    /// that, so such lines are never treated as content.
    #[default]
    ExcludeHeaderArtifacts,
    /// Keep every `+` line, including content that itself starts with `+`
    AllAdditions,
}

impl AdditionFilter {
    /// Whether an added line, marker already stripped, counts as content
    pub fn keeps(self, added: &[u8]) -> bool {
        match self {
            AdditionFilter::ExcludeHeaderArtifacts => !added.starts_with(b"+"),
            AdditionFilter::AllAdditions => true,
        }
    }
}

/// Collect the added lines of `hunks`, marker stripped, in diff order.
///
/// Deletions, context lines and `\ No newline` markers are dropped.
pub fn added_lines(hunks: &[Hunk], filter: AdditionFilter) -> Vec<&BStr> {
    hunks
        .iter()
        .flat_map(Hunk::classified)
        .filter_map(|line| match line {
            LineKind::Added(content) if filter.keeps(content) => Some(content),
            _ => None,
        })
        .collect()
}

/// Join extracted lines into file content: one `\n` between lines, none after the last
pub fn join_lines(lines: &[&BStr]) -> BString {
    BString::from(bstr::join("\n", lines))
}
