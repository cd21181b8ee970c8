//! UTC time helpers for day buckets and historical snapshot offsets.

use chrono::{DateTime, Utc};

pub const ONE_HOUR_SECS: i64 = 60 * 60;
pub const ONE_DAY_SECS: i64 = 24 * ONE_HOUR_SECS;
pub const ONE_WEEK_SECS: i64 = 7 * ONE_DAY_SECS;

/// Day index of a unix timestamp: `round(ts / 86400)`, half away from zero.
#[inline]
pub fn day_index(timestamp: i64) -> i64 {
    (timestamp as f64 / ONE_DAY_SECS as f64).round() as i64
}

/// Timestamps 24h, 48h, 7d and 14d before `now`, truncated to the minute.
pub fn delta_timestamps(now: DateTime<Utc>) -> DeltaTimestamps {
    let now = now.timestamp();
    let at = |offset: i64| {
        let t = now - offset;
        t - t.rem_euclid(60)
    };

    DeltaTimestamps {
        one_day: at(ONE_DAY_SECS),
        two_days: at(2 * ONE_DAY_SECS),
        one_week: at(ONE_WEEK_SECS),
        two_weeks: at(2 * ONE_WEEK_SECS),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaTimestamps {
    pub one_day: i64,
    pub two_days: i64,
    pub one_week: i64,
    pub two_weeks: i64,
}

impl DeltaTimestamps {
    pub fn as_array(&self) -> [i64; 4] {
        [self.one_day, self.two_days, self.one_week, self.two_weeks]
    }
}

/// Evenly spaced sample times from `start` up to and including `end`.
pub fn sample_timestamps(start: i64, end: i64, interval: i64) -> Vec<i64> {
    if interval <= 0 || start > end {
        return Vec::new();
    }
    (start..=end).step_by(interval as usize).collect()
}
