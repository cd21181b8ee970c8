use std::collections::BTreeMap;

use crate::models::DayBucket;
use crate::utils::{day_index, ONE_DAY_SECS};

/// Turn sparse day rows into one bucket per UTC day up to yesterday.
///
/// Rows are keyed by [`day_index`], later rows overwriting earlier ones for
/// the same day. Days without a row get zero volume and the liquidity of the
/// closest earlier day. The walk starts at the earliest row, or at
/// `start_timestamp` when there are none, and stops at the last day
/// strictly before `now - 1 day`.
///
/// Running it again on its own output returns the same series.
pub fn normalize_day_buckets<I>(rows: I, start_timestamp: i64, now: i64) -> Vec<DayBucket>
where
    I: IntoIterator<Item = DayBucket>,
{
    let mut by_day: BTreeMap<i64, DayBucket> = BTreeMap::new();
    for bucket in rows {
        by_day.insert(day_index(bucket.date), bucket);
    }

    let (mut timestamp, mut latest_liquidity) = match by_day.values().next() {
        Some(first) => (first.date, first.liquidity_usd),
        None => (start_timestamp, 0.0),
    };

    while timestamp < now - ONE_DAY_SECS {
        let next = timestamp + ONE_DAY_SECS;
        let key = day_index(next);

        match by_day.get(&key) {
            Some(existing) => latest_liquidity = existing.liquidity_usd,
            None => {
                by_day.insert(key, DayBucket::new(next, 0.0, latest_liquidity));
            },
        }
        timestamp = next;
    }

    by_day.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: i64 = 1_700_006_400; // 2023-11-15 00:00:00 UTC

    #[test]
    fn test_fills_missing_days() {
        let rows = vec![DayBucket::new(D, 5.0, 100.0)];
        let series = normalize_day_buckets(rows, 0, D + 3 * ONE_DAY_SECS);

        assert_eq!(
            series,
            vec![
                DayBucket::new(D, 5.0, 100.0),
                DayBucket::new(D + ONE_DAY_SECS, 0.0, 100.0),
                DayBucket::new(D + 2 * ONE_DAY_SECS, 0.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_liquidity_carries_from_latest_real_day() {
        let rows = vec![
            DayBucket::new(D, 5.0, 100.0),
            DayBucket::new(D + 2 * ONE_DAY_SECS, 7.0, 300.0),
        ];
        let series = normalize_day_buckets(rows, 0, D + 5 * ONE_DAY_SECS);

        let liquidity: Vec<f64> = series.iter().map(|b| b.liquidity_usd).collect();
        let volume: Vec<f64> = series.iter().map(|b| b.volume_usd).collect();
        assert_eq!(liquidity, vec![100.0, 100.0, 300.0, 300.0, 300.0]);
        assert_eq!(volume, vec![5.0, 0.0, 7.0, 0.0, 0.0]);
    }

    #[test]
    fn test_same_day_rows_keep_the_last() {
        let rows = vec![
            DayBucket::new(D, 1.0, 10.0),
            DayBucket::new(D + 60, 2.0, 20.0),
        ];
        let series = normalize_day_buckets(rows, 0, D + ONE_DAY_SECS);
        assert_eq!(series, vec![DayBucket::new(D + 60, 2.0, 20.0)]);
    }

    #[test]
    fn test_empty_rows_start_at_start_timestamp() {
        let series = normalize_day_buckets(Vec::new(), D, D + 3 * ONE_DAY_SECS);
        assert_eq!(
            series,
            vec![
                DayBucket::new(D + ONE_DAY_SECS, 0.0, 0.0),
                DayBucket::new(D + 2 * ONE_DAY_SECS, 0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_is_idempotent() {
        let rows = vec![
            DayBucket::new(D, 5.0, 100.0),
            DayBucket::new(D + 4 * ONE_DAY_SECS, 1.0, 50.0),
        ];
        let now = D + 9 * ONE_DAY_SECS;

        let once = normalize_day_buckets(rows, 0, now);
        let twice = normalize_day_buckets(once.clone(), 0, now);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 9);
    }
}
