//! Period-over-period change calculations.
//!
//! Subgraph cumulative counters (total volume, total transactions) only tell
//! us how much happened since genesis. Sampling them at several block heights
//! and differencing gives per-period figures:
//!
//! - [`amount_change`] - how much changed between two samples
//! - [`percent_change`] - plain relative change between two samples
//! - [`change_for_period`] - amount for the latest period plus how that amount
//!   compares to the period before it
//!
//! Missing, zero and NaN inputs never produce NaN or infinity; they degrade to 0.

/// A sample counts as present when it is defined, nonzero and not NaN.
#[inline]
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Standard percent change between two values.
///
/// Returns 0 when either value is missing, zero or NaN.
pub fn percent_change(now: Option<f64>, before: Option<f64>) -> f64 {
    match (present(now), present(before)) {
        (Some(now), Some(before)) => finite_or_zero((now - before) / before * 100.0),
        _ => 0.0,
    }
}

/// Increase or decrease of a value compared to an earlier sample.
///
/// When the earlier sample is missing the entity did not exist yet, so the
/// whole current value counts as new.
pub fn amount_change(now: Option<f64>, before: Option<f64>) -> f64 {
    match (present(now), present(before)) {
        (Some(now), Some(before)) => now - before,
        (Some(now), None) => now,
        _ => 0.0,
    }
}

/// Amount change for the latest period and its percent change relative to
/// the previous period.
///
/// `one_period_ago` and `two_periods_ago` must use the same period unit
/// (1d/2d or 7d/14d). The percentage is the change of the change: it tells
/// whether activity is accelerating, not how far the counter moved.
pub fn change_for_period(
    now: Option<f64>,
    one_period_ago: Option<f64>,
    two_periods_ago: Option<f64>,
) -> (f64, f64) {
    let current_period = amount_change(now, one_period_ago);
    let previous_period = amount_change(one_period_ago, two_periods_ago);
    let percent = percent_change(Some(current_period), Some(previous_period));
    (current_period, percent)
}

/// Two-day change without the missing-sample fallbacks.
///
/// All three samples are required. Matches [`change_for_period`] whenever
/// every input is nonzero.
pub fn two_day_change(now: f64, one_day_ago: f64, two_days_ago: f64) -> (f64, f64) {
    let current_change = now - one_day_ago;
    let previous_change = one_day_ago - two_days_ago;
    let adjusted = (current_change - previous_change) / previous_change * 100.0;
    (current_change, finite_or_zero(adjusted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_basic() {
        assert_eq!(percent_change(Some(150.0), Some(100.0)), 50.0);
        assert_eq!(percent_change(Some(50.0), Some(200.0)), -75.0);
    }

    #[test]
    fn test_percent_change_degrades_to_zero() {
        assert_eq!(percent_change(Some(100.0), Some(0.0)), 0.0);
        assert_eq!(percent_change(Some(0.0), Some(100.0)), 0.0);
        assert_eq!(percent_change(None, Some(100.0)), 0.0);
        assert_eq!(percent_change(Some(100.0), None), 0.0);
        assert_eq!(percent_change(Some(f64::NAN), Some(100.0)), 0.0);
        assert_eq!(percent_change(Some(100.0), Some(f64::NAN)), 0.0);
    }

    #[test]
    fn test_percent_change_never_infinite() {
        let result = percent_change(Some(f64::MAX), Some(f64::MIN_POSITIVE));
        assert!(result.is_finite());
    }

    #[test]
    fn test_amount_change_rules() {
        assert_eq!(amount_change(Some(100.0), Some(40.0)), 60.0);
        assert_eq!(amount_change(Some(100.0), None), 100.0);
        assert_eq!(amount_change(None, Some(40.0)), 0.0);
        assert_eq!(amount_change(None, None), 0.0);
    }

    #[test]
    fn test_change_for_period_steady_growth() {
        assert_eq!(change_for_period(Some(100.0), Some(80.0), Some(60.0)), (20.0, 0.0));
    }

    #[test]
    fn test_change_for_period_missing_two_periods_ago() {
        // previous period falls back to the whole 80
        assert_eq!(change_for_period(Some(100.0), Some(80.0), None), (20.0, -75.0));
    }

    #[test]
    fn test_change_for_period_flat_previous_period() {
        // previous period amount is zero, percent must stay defined
        let (amount, percent) = change_for_period(Some(100.0), Some(80.0), Some(80.0));
        assert_eq!(amount, 20.0);
        assert_eq!(percent, 0.0);
    }

    #[test]
    fn test_change_for_period_only_now() {
        assert_eq!(change_for_period(Some(100.0), None, None), (100.0, 0.0));
    }

    #[test]
    fn test_change_for_period_is_not_direct_percent() {
        // a direct percent would be 25%, the period comparison is 100%
        let (amount, percent) = change_for_period(Some(100.0), Some(80.0), Some(70.0));
        assert_eq!(amount, 20.0);
        assert_eq!(percent, 100.0);
    }

    #[test]
    fn test_two_day_change_matches_period_change() {
        assert_eq!(
            two_day_change(100.0, 80.0, 70.0),
            change_for_period(Some(100.0), Some(80.0), Some(70.0))
        );
        assert_eq!(two_day_change(100.0, 80.0, 80.0), (20.0, 0.0));
    }
}
