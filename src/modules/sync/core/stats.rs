// Derived Statistics: single-pass reductions over a collection.
//
// Never stored. An empty collection yields 0 (or None for "latest"), never NaN.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub fn compute_stats<E, R>(items: &[E], init: R, step: impl FnMut(R, &E) -> R) -> R {
    items.iter().fold(init, step)
}

pub fn count<E>(items: &[E], predicate: impl Fn(&E) -> bool) -> usize {
    items.iter().filter(|item| predicate(item)).count()
}

/// Non-finite values are skipped so one bad row cannot poison the total.
pub fn sum_by<E>(items: &[E], value: impl Fn(&E) -> f64) -> f64 {
    compute_stats(items, 0.0, |total, item| {
        let value = value(item);
        if value.is_finite() { total + value } else { total }
    })
}

pub fn average_by<E>(items: &[E], value: impl Fn(&E) -> f64) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    sum_by(items, value) / items.len() as f64
}

pub fn count_by<E, K: Ord>(items: &[E], key: impl Fn(&E) -> K) -> BTreeMap<K, usize> {
    compute_stats(items, BTreeMap::new(), |mut counts, item| {
        *counts.entry(key(item)).or_insert(0) += 1;
        counts
    })
}

pub fn latest_by<E>(
    items: &[E],
    timestamp: impl Fn(&E) -> Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    items.iter().filter_map(timestamp).max()
}
