//! Scaling of raw metric series into `[0, 1]`.
//!
//! A series is `&[Option<f64>]`: `None` (and any non-finite value) means the
//! metric is missing for that row. The two policies deliberately disagree on
//! degenerate input:
//!
//! | input                 | `minmax`      | `winsorized_minmax` |
//! |-----------------------|---------------|---------------------|
//! | all missing           | all `0.0`     | all `0.0`           |
//! | constant (max == min) | all `1.0`     | all `0.0`           |
//! | otherwise             | missing stays missing in both            |

/// Added to the winsorized denominator to keep near-zero ranges stable.
const WINSOR_EPS: f64 = 1e-9;

fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

fn present_values(series: &[Option<f64>]) -> Vec<f64> {
    series.iter().copied().filter_map(present).collect()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Plain min-max scaling.
///
/// A constant series maps to all `1.0`: the metric is present everywhere, just
/// without spread.
pub fn minmax(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let values = present_values(series);
    if values.is_empty() {
        return vec![Some(0.0); series.len()];
    }

    let (min, max) = min_max(&values);
    let range = max - min;
    if range == 0.0 {
        return vec![Some(1.0); series.len()];
    }

    series
        .iter()
        .map(|v| present(*v).map(|x| (x - min) / range))
        .collect()
}

/// `minmax` for a series with no missing entries.
pub fn minmax_dense(values: &[f64]) -> Vec<f64> {
    let series: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    minmax(&series)
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect()
}

/// Min-max after clipping to the `[low_q, high_q]` empirical quantiles.
///
/// Quantiles use linear interpolation between order statistics. A zero (or
/// not-a-number) clipped range maps to all `0.0`.
pub fn winsorized_minmax(series: &[Option<f64>], low_q: f64, high_q: f64) -> Vec<Option<f64>> {
    let mut values = present_values(series);
    if values.is_empty() {
        return vec![Some(0.0); series.len()];
    }
    values.sort_by(f64::total_cmp);

    let ql = quantile(&values, low_q);
    let qh = quantile(&values, high_q);
    let clip = |x: f64| x.max(ql).min(qh);

    let clipped: Vec<f64> = values.iter().map(|&x| clip(x)).collect();
    let (min, max) = min_max(&clipped);
    let denom = max - min;
    if denom == 0.0 || denom.is_nan() {
        return vec![Some(0.0); series.len()];
    }

    series
        .iter()
        .map(|v| present(*v).map(|x| (clip(x) - min) / (denom + WINSOR_EPS)))
        .collect()
}

/// Empirical quantile of an ascending-sorted, non-empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
