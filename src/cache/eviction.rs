//! Eviction Module
//!
//! Least-frequently-used victim selection with a least-recently-used tiebreak.

use crate::cache::CacheEntry;

// == Select Victim ==
/// Picks the entry to evict when inserting a new key at capacity.
///
/// The victim has the lowest access count; among equal counts, the oldest
/// last-access time; among full ties, the smallest key, so the choice does
/// not depend on map iteration order. Scans every entry once.
///
/// Returns None if there are no entries.
pub fn select_victim<'a, V, I>(entries: I) -> Option<&'a str>
where
    V: 'a,
    I: IntoIterator<Item = (&'a String, &'a CacheEntry<V>)>,
{
    entries
        .into_iter()
        .min_by(|(key_a, a), (key_b, b)| {
            a.access_count
                .cmp(&b.access_count)
                .then(a.last_accessed.cmp(&b.last_accessed))
                .then(key_a.cmp(key_b))
        })
        .map(|(key, _)| key.as_str())
}
