use std::collections::HashSet;

use crate::core::model::ClassEntry;

/// Drops exact duplicates, keeping the first occurrence of each entry.
pub fn dedup_entries(entries: Vec<ClassEntry>) -> Vec<ClassEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}
