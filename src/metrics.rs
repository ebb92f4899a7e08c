// Derived metrics over extracted series: trailing sums and year-over-year change
use crate::table::DataPoint;

/// Periods in a trailing twelve month window (quarterly cadence)
pub const TTM_PERIODS: usize = 4;

/// Default TTM divisor, sheets report in thousands
pub const DEFAULT_TTM_DIVISOR: f64 = 1000.0;

/// Sum of the last `n` items; missing or non-finite values count as 0.
/// Fewer than `n` items sums what is there.
pub fn sum_last_n<T, F>(items: &[T], n: usize, value: F) -> f64
where
    F: Fn(&T) -> Option<f64>,
{
    items[items.len().saturating_sub(n)..]
        .iter()
        .map(|item| value(item).filter(|v| v.is_finite()).unwrap_or(0.0))
        .sum()
}

/// Trailing twelve months: sum of the last four values divided by `divisor`.
/// A zero or non-finite divisor is treated as 1.
pub fn ttm_sum(points: &[DataPoint], divisor: f64) -> f64 {
    let divisor = if divisor == 0.0 || !divisor.is_finite() {
        1.0
    } else {
        divisor
    };
    sum_last_n(points, TTM_PERIODS, |p| Some(p.value)) / divisor
}

/// Year-over-year % change for the last four periods, oldest first
///
/// Each value is compared with the one four periods earlier. Fewer than eight
/// values gives four `None`s; a zero or non-finite base yields `None` for that slot.
pub fn compute_yoy_last4(values: &[f64]) -> [Option<f64>; 4] {
    let mut result = [None; 4];
    if values.len() < 2 * TTM_PERIODS {
        return result;
    }

    let window = &values[values.len() - 2 * TTM_PERIODS..];
    for (slot, out) in result.iter_mut().enumerate() {
        let prev = window[slot];
        let curr = window[slot + TTM_PERIODS];
        if prev.is_finite() && curr.is_finite() && prev != 0.0 {
            *out = Some((curr - prev) / prev * 100.0);
        }
    }
    result
}
