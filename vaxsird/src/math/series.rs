//! Window helpers over daily count series (oldest first).

/// `None` when the total does not fit in a `u64`.
pub fn checked_sum(xs: &[u64]) -> Option<u64> {
    xs.iter().try_fold(0u64, |acc, &x| acc.checked_add(x))
}

/// Sum of the most recent `window` entries, or the whole series if it is shorter.
pub fn tail_sum(xs: &[u64], window: usize) -> Option<u64> {
    checked_sum(&xs[xs.len().saturating_sub(window)..])
}

/// Sum of every entry older than the most recent `window` entries.
pub fn head_sum(xs: &[u64], window: usize) -> Option<u64> {
    checked_sum(&xs[..xs.len().saturating_sub(window)])
}

/// Round a modelled count to the nearest integer, halves away from zero.
pub fn round_count(v: f64) -> i64 {
    v.round() as i64
}
