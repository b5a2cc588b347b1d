// src/util.rs

use std::cmp::Ordering;

/// Stable descending sort on an f64 key. Incomparable values (NaN slips in
/// from garbled numeric cells) compare equal so ranking stays total instead
/// of panicking.
pub fn sort_desc_by<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
}
