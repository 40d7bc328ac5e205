//! Recent-trend estimation.

/// Mean per-step change over the last `window` samples of `series`.
///
/// Returns 0.0 when fewer than two samples fall inside the window, so an
/// empty or single-point series yields a flat trend rather than a division
/// by zero.
pub fn estimate_trend(series: &[f64], window: usize) -> f64 {
    let recent = &series[series.len().saturating_sub(window)..];
    if recent.len() < 2 {
        return 0.0;
    }

    let total_change: f64 = recent.windows(2).map(|pair| pair[1] - pair[0]).sum();
    total_change / (recent.len() - 1) as f64
}
