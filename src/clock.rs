//! Clock Module
//!
//! Single source of wall-clock millisecond timestamps. Timeline scores, feed
//! cursors, cache expiries and rate windows all use this unit.

use chrono::Utc;

/// Returns the current Unix timestamp in milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_recent() {
        // 2020-01-01 as a sanity floor
        assert!(now_ms() > 1_577_836_800_000);
    }

    #[test]
    fn test_now_ms_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }
}
