//! Incremental substring search over a listing, bidirectional with
//! wraparound.

use crate::fs_utils::Item;

/// Find the next entry matching `query` (case-insensitive) after `from`,
/// wrapping around. `from` itself is checked last, so a match elsewhere is
/// preferred over the starting item, but a single self-matching item still
/// counts.
pub fn find_forward(items: &[Item], query: &str, from: usize) -> Option<usize> {
    if query.is_empty() || items.is_empty() {
        return None;
    }
    let q = query.to_lowercase();
    let total = items.len();
    for i in 1..=total {
        let idx = (from + i) % total;
        if items[idx].name.to_lowercase().contains(&q) {
            return Some(idx);
        }
    }
    None
}

/// Mirror of [`find_forward`]: scan backward, wrapping from the end.
pub fn find_backward(items: &[Item], query: &str, from: usize) -> Option<usize> {
    if query.is_empty() || items.is_empty() {
        return None;
    }
    let q = query.to_lowercase();
    let total = items.len();
    for i in 1..=total {
        let idx = (from + total - i) % total;
        if items[idx].name.to_lowercase().contains(&q) {
            return Some(idx);
        }
    }
    None
}

/// Apply the single-step search `count` times. Once the index returns to the
/// first match found, the remaining count is reduced modulo the cycle length
/// so a large count over a few matches terminates without rescanning.
pub fn find_repeated(
    items: &[Item],
    query: &str,
    from: usize,
    count: usize,
    reverse: bool,
) -> Option<usize> {
    let step: fn(&[Item], &str, usize) -> Option<usize> =
        if reverse { find_backward } else { find_forward };

    let mut remaining = count.max(1);
    let mut pos = from;
    let mut first: Option<usize> = None;
    let mut steps_since_first = 0usize;

    while remaining > 0 {
        pos = step(items, query, pos)?;
        remaining -= 1;

        match first {
            None => first = Some(pos),
            Some(f) => {
                steps_since_first += 1;
                if pos == f {
                    remaining %= steps_since_first;
                    steps_since_first = 0;
                }
            }
        }
    }
    Some(pos)
}
