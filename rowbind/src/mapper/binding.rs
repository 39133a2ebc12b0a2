//! Fuzzy column to member binding shared by the object and constructor mappers.

use crate::error::ConvertError;
use crate::types::TypeInfo;
use crate::value::{convert, Value};
use std::borrow::Cow;
use std::collections::HashMap;

/// Removes underscores between the first and last non-underscore characters.
/// Leading and trailing underscores are kept.
pub fn strip_interior_underscores(name: &str) -> Cow<'_, str> {
    let core = name.trim_matches('_');
    if core.is_empty() || !core.contains('_') {
        return Cow::Borrowed(name);
    }
    let lead = name.len() - name.trim_start_matches('_').len();
    let trail = name.len() - name.trim_end_matches('_').len();
    let mut out = String::with_capacity(name.len());
    out.push_str(&name[..lead]);
    out.extend(core.chars().filter(|c| *c != '_'));
    out.push_str(&name[name.len() - trail..]);
    Cow::Owned(out)
}

/// Bucket key: interior underscores stripped, case folded.
pub fn underlying_name(name: &str) -> String {
    strip_interior_underscores(name).to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchPass {
    Exact,
    IgnoreCase,
    Underscore,
}

impl MatchPass {
    pub const ALL: [MatchPass; 3] = [MatchPass::Exact, MatchPass::IgnoreCase, MatchPass::Underscore];

    fn matches(self, column: &str, candidate: &str) -> bool {
        match self {
            MatchPass::Exact => column == candidate,
            MatchPass::IgnoreCase => column.to_lowercase() == candidate.to_lowercase(),
            // bucket key equality already implies this
            MatchPass::Underscore => underlying_name(column) == underlying_name(candidate),
        }
    }
}

/// One claimed (column, candidate) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMatch {
    pub column: usize,
    pub candidate: usize,
    pub pass: MatchPass,
}

/// Binds columns to candidate names in three passes. A column or candidate
/// claimed by an earlier pass is never reconsidered; within a bucket the
/// earliest unclaimed candidate wins. Result is ordered by column.
pub fn match_columns<C: AsRef<str>>(columns: &[C], candidates: &[&str]) -> Vec<ColumnMatch> {
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, name) in candidates.iter().enumerate() {
        buckets.entry(underlying_name(name)).or_default().push(i);
    }
    let keys: Vec<String> = columns.iter().map(|c| underlying_name(c.as_ref())).collect();
    let mut claimed = vec![false; columns.len()];
    let mut matches = Vec::with_capacity(columns.len().min(candidates.len()));

    for pass in MatchPass::ALL {
        for (column, name) in columns.iter().enumerate() {
            if claimed[column] {
                continue;
            }
            let Some(bucket) = buckets.get_mut(&keys[column]) else {
                continue;
            };
            if let Some(pos) = bucket.iter().position(|&c| pass.matches(name.as_ref(), candidates[c])) {
                let candidate = bucket.remove(pos);
                claimed[column] = true;
                matches.push(ColumnMatch { column, candidate, pass });
            }
        }
    }
    matches.sort_by_key(|m| m.column);
    matches
}

/// Brings a non-null column value to the representation a member setter expects.
pub(crate) fn coerce(value: Value, target: &TypeInfo, needs_conversion: bool) -> Result<Value, ConvertError> {
    match target.enumeration {
        Some(info) => info.to_underlying(value),
        None if needs_conversion => convert(value, target.kind),
        None => Ok(value),
    }
}
