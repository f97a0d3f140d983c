use std::collections::HashSet;

use super::Session;

/// Merge two session lists with `primary` taking precedence.
///
/// Every entry of `primary` is kept in order; entries of `secondary` are
/// appended in their own order unless `primary` already has that name. Pass
/// the live tmux listing as `primary` so live topology beats a stale copy.
pub fn combine(primary: Vec<Session>, secondary: Vec<Session>) -> Vec<Session> {
    let taken: HashSet<String> = primary.iter().map(|s| s.name.clone()).collect();

    let mut merged = primary;
    merged.extend(secondary.into_iter().filter(|s| !taken.contains(&s.name)));
    merged
}
