//! Rolling window functions.
//!
//! Windows shrink at the sequence boundaries instead of dropping days, so every
//! position gets a value as long as `min_periods` observations are available.

/// Half-open index range covered by the window at position `i`.
///
/// A centered window of size `w` spans `w / 2` points before `i` and
/// `w - w / 2 - 1` points after it, matching the usual convention for even
/// sizes (one more point on the left).
pub fn window_bounds(i: usize, n: usize, window: usize, center: bool) -> (usize, usize) {
    if center {
        let half = window / 2;
        let start = i.saturating_sub(half);
        let end = (i + window - half).min(n);
        (start, end)
    } else {
        let start = (i + 1).saturating_sub(window);
        (start, (i + 1).min(n))
    }
}

/// Compute rolling mean (moving average).
///
/// # Arguments
/// * `series` - Input values
/// * `window` - Window size
/// * `center` - Center the window on each position instead of trailing it
/// * `min_periods` - Minimum number of observations required; positions with
///   fewer available points are NaN
pub fn rolling_mean(series: &[f64], window: usize, center: bool, min_periods: usize) -> Vec<f64> {
    rolling_apply(series, window, center, min_periods, |s| {
        s.iter().sum::<f64>() / s.len() as f64
    })
}

/// Generic rolling window application.
fn rolling_apply<F>(series: &[f64], window: usize, center: bool, min_periods: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    if series.is_empty() || window == 0 {
        return vec![f64::NAN; series.len()];
    }

    let n = series.len();
    let min_periods = min_periods.max(1);

    (0..n)
        .map(|i| {
            let (start, end) = window_bounds(i, n, window, center);
            if end - start >= min_periods {
                f(&series[start..end])
            } else {
                f64::NAN
            }
        })
        .collect()
}
