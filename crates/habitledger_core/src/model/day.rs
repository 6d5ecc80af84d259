//! Epoch-day bucketing arithmetic.
//!
//! # Responsibility
//! - Map absolute millisecond timestamps to canonical day ids.
//! - Provide the day constants shared by the streak algorithm.
//!
//! # Invariants
//! - `day_id(ts) <= ts` and `day_id(ts) % MS_PER_DAY == 0` for every input.
//! - Two timestamps belong to the same day iff their day ids are equal.

/// Milliseconds per epoch-aligned day bucket.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Returns the start-of-day timestamp for `timestamp_ms`.
///
/// Buckets by absolute epoch day, not by any local calendar or timezone;
/// callers in every timezone share the same boundaries. `rem_euclid` keeps
/// the bucket start at-or-before the timestamp for pre-epoch inputs too.
pub fn day_id(timestamp_ms: i64) -> i64 {
    timestamp_ms - timestamp_ms.rem_euclid(MS_PER_DAY)
}

/// Returns whether two timestamps fall into the same day bucket.
pub fn same_day(a_ms: i64, b_ms: i64) -> bool {
    day_id(a_ms) == day_id(b_ms)
}

/// Whole day buckets from `from_ms` to `to_ms`, clamped to 0 when `to_ms`
/// buckets before `from_ms`.
pub fn days_between(from_ms: i64, to_ms: i64) -> u64 {
    let from_day = day_id(from_ms);
    let to_day = day_id(to_ms);
    if to_day <= from_day {
        return 0;
    }
    ((to_day - from_day) / MS_PER_DAY) as u64
}
