//! Value clipping and curve densification

use ndarray::ArrayView2;

use crate::error::{PlotError, PlotResult};

/// Fraction of the value range covered by one interpolation sub-step
const INTERP_RESOLUTION: f64 = 0.01;

/// `p`-th percentile of the finite values, linearly interpolated
pub fn percentile(values: &[f64], p: f64) -> PlotResult<f64> {
    if !(0.0..=100.0).contains(&p) {
        return Err(PlotError::InvalidPercentile(p));
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return Err(PlotError::EmptyData);
    }
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Color limits keeping values between the `p`-th and `(100 - p)`-th percentiles
pub fn clip_limits(matrix: ArrayView2<'_, f64>, p: f64) -> PlotResult<(f64, f64)> {
    let values: Vec<f64> = matrix.iter().copied().collect();
    Ok((percentile(&values, p)?, percentile(&values, 100.0 - p)?))
}

/// Densify `y` sampled at `0, 1, 2, ...` for color-coded drawing
///
/// Each segment is split into enough linear sub-steps that no step changes
/// the value by more than one percent of the total range.
pub fn interp_y(y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let (min, max) = y
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let step = (max - min) * INTERP_RESOLUTION;

    let mut xs = Vec::with_capacity(y.len());
    let mut ys = Vec::with_capacity(y.len());
    for (i, pair) in y.windows(2).enumerate() {
        let (y0, y1) = (pair[0], pair[1]);
        let substeps = if step > 0.0 && (y1 - y0).is_finite() {
            ((y1 - y0).abs() / step).ceil().max(1.0) as usize
        } else {
            1
        };
        for k in 0..substeps {
            let t = k as f64 / substeps as f64;
            xs.push(i as f64 + t);
            ys.push(y0 + (y1 - y0) * t);
        }
    }
    if let Some(&last) = y.last() {
        xs.push((y.len() - 1) as f64);
        ys.push(last);
    }
    (xs, ys)
}

/// Insert NaN gaps after every jump larger than one in `x`
pub fn add_breaks(x: &[f64], y: &[f64]) -> PlotResult<(Vec<f64>, Vec<f64>)> {
    if x.len() != y.len() {
        return Err(PlotError::LengthMismatch {
            expected: x.len(),
            found: y.len(),
        });
    }

    let mut xs = Vec::with_capacity(x.len());
    let mut ys = Vec::with_capacity(y.len());
    for i in 0..x.len() {
        xs.push(x[i]);
        ys.push(y[i]);
        if i + 1 < x.len() && x[i + 1] - x[i] > 1.0 {
            xs.push(f64::NAN);
            ys.push(f64::NAN);
        }
    }
    Ok((xs, ys))
}

/// Split parallel coordinate lists into runs without NaN
pub fn finite_runs(x: &[f64], y: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = vec![];
    let mut current = vec![];
    for (&xv, &yv) in x.iter().zip(y) {
        if xv.is_nan() || yv.is_nan() {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        } else {
            current.push((xv, yv));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
