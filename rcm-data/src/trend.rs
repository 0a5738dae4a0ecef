//! Trendlines drawn over the scatter points of a panel.
//!
//! Points are `(x, y)` pairs where x is a day number
//! (see [`rcm_utils::dates::day_number`]). Both fits sort by x first.

use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

/// Rows on each side of the centre row in the rolling mean window.
pub const ROLLING_MEAN_HALF_WINDOW: usize = 5;

/// Fraction of points used for each local LOESS fit.
pub const LOESS_BANDWIDTH: f64 = 0.3;

/// Number of reweighting passes after the first LOESS fit.
pub const LOESS_ROBUSTNESS_ITERATIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trendline {
    #[default]
    None,
    Loess,
    RollingMean,
}

impl Trendline {
    /// Fitted trend points, empty for [`Trendline::None`].
    pub fn fit(&self, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        match self {
            Trendline::None => Vec::new(),
            Trendline::Loess => loess(points, LOESS_BANDWIDTH),
            Trendline::RollingMean => rolling_mean(points, ROLLING_MEAN_HALF_WINDOW),
        }
    }
}

impl FromStr for Trendline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "none" => Ok(Trendline::None),
            "loess" => Ok(Trendline::Loess),
            "rolling-mean" => Ok(Trendline::RollingMean),
            other => Err(format!(
                "unknown trendline '{}' (expected none, loess or rolling-mean)",
                other
            )),
        }
    }
}

fn sorted_by_x(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    sorted
}

/// Centred moving average over `half_window` rows on each side.
///
/// The window is truncated at both ends of the series.
pub fn rolling_mean(points: &[(f64, f64)], half_window: usize) -> Vec<(f64, f64)> {
    let sorted = sorted_by_x(points);
    let n = sorted.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half_window);
            let hi = (i + half_window).min(n - 1);
            let window = &sorted[lo..=hi];
            let mean = window.iter().map(|p| p.1).sum::<f64>() / window.len() as f64;
            (sorted[i].0, mean)
        })
        .collect()
}

fn tricube(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        let t = 1.0 - u * u * u;
        t * t * t
    }
}

fn bisquare(u: f64) -> f64 {
    if u.abs() >= 1.0 {
        0.0
    } else {
        let t = 1.0 - u * u;
        t * t
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Weighted least squares line through `points`, evaluated at `x0`.
///
/// Falls back to the weighted mean when the x values carry no spread, and
/// to `None` when every weight is zero.
fn weighted_linear_at(points: &[(f64, f64)], weights: &[f64], x0: f64) -> Option<f64> {
    let sum_w: f64 = weights.iter().sum();
    if sum_w <= f64::EPSILON {
        return None;
    }
    let mean_x = points.iter().zip(weights).map(|(p, w)| p.0 * w).sum::<f64>() / sum_w;
    let mean_y = points.iter().zip(weights).map(|(p, w)| p.1 * w).sum::<f64>() / sum_w;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (p, w) in points.iter().zip(weights) {
        let dx = p.0 - mean_x;
        sxy += w * dx * (p.1 - mean_y);
        sxx += w * dx * dx;
    }
    let slope = if sxx.abs() < 1e-12 { 0.0 } else { sxy / sxx };
    Some(mean_y + slope * (x0 - mean_x))
}

/// Locally weighted linear regression (LOESS).
///
/// Each point is fitted from its `bandwidth * n` nearest neighbours (at
/// least two) using tricube distance weights; the fit is then repeated
/// [`LOESS_ROBUSTNESS_ITERATIONS`] times with bisquare weights on the
/// residuals to damp outliers. Returns one fitted value per input point,
/// sorted by x.
pub fn loess(points: &[(f64, f64)], bandwidth: f64) -> Vec<(f64, f64)> {
    let sorted = sorted_by_x(points);
    let n = sorted.len();
    if n < 2 {
        return sorted;
    }
    let span = ((bandwidth * n as f64).floor() as usize).clamp(2, n);

    let mut robustness = vec![1.0; n];
    let mut fitted = vec![0.0; n];

    for iteration in 0..=LOESS_ROBUSTNESS_ITERATIONS {
        let (mut left, mut right) = (0usize, span - 1);
        for i in 0..n {
            let x0 = sorted[i].0;
            // Slide the window right while that brings it closer to x0.
            while right + 1 < n && sorted[right + 1].0 - x0 < x0 - sorted[left].0 {
                left += 1;
                right += 1;
            }
            let window = &sorted[left..=right];
            let max_dist = (x0 - sorted[left].0).max(sorted[right].0 - x0);
            let weights: Vec<f64> = window
                .iter()
                .zip(&robustness[left..=right])
                .map(|(p, r)| {
                    let u = if max_dist > 0.0 {
                        (p.0 - x0).abs() / (max_dist * 1.000_001)
                    } else {
                        0.0
                    };
                    tricube(u) * r
                })
                .collect();
            fitted[i] = weighted_linear_at(window, &weights, x0).unwrap_or(sorted[i].1);
        }

        if iteration == LOESS_ROBUSTNESS_ITERATIONS {
            break;
        }
        let residuals: Vec<f64> = sorted.iter().zip(&fitted).map(|(p, f)| p.1 - f).collect();
        let mut abs: Vec<f64> = residuals.iter().map(|r| r.abs()).collect();
        let scale = median(&mut abs);
        if scale < 1e-12 {
            break;
        }
        for (r, res) in robustness.iter_mut().zip(&residuals) {
            *r = bisquare(res / (6.0 * scale));
        }
    }

    sorted.iter().zip(fitted).map(|(p, f)| (p.0, f)).collect()
}
