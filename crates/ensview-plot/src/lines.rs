//! Line plots with optional variance bands

use ndarray::{ArrayView2, ArrayViewD, Axis};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::Color as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::TickLabels;
use crate::chart::{finite_range, pad, Frame};
use crate::colormap::{cycle_color, Color};
use crate::error::{PlotError, PlotResult};
use crate::scale::{add_breaks, finite_runs};

/// Options for [`show_lines`]
#[derive(Clone, Debug)]
pub struct LinesOptions<'a> {
    /// Half-width of a band drawn around each line, 1-D (shared) or 2-D (per line)
    pub dy: Option<ArrayViewD<'a, f64>>,
    /// Band opacity
    pub alpha: f64,
    /// Break lines and bands where `x` jumps by more than one
    pub gap: bool,
    /// Labels for x ticks, looked up by index
    pub ticklabels: Option<Vec<String>>,
    pub show_axes: bool,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Line colors; the default cycle is used when empty
    pub colors: Vec<Color>,
    pub line_width: u32,
}

impl Default for LinesOptions<'_> {
    fn default() -> Self {
        Self {
            dy: None,
            alpha: 0.5,
            gap: false,
            ticklabels: None,
            show_axes: true,
            x_label: None,
            y_label: None,
            colors: Vec::new(),
            line_width: 1,
        }
    }
}

/// A drawn line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineHandle {
    pub color: Color,
    /// Data points, not counting inserted gaps
    pub points: usize,
    /// Continuous pieces the line was drawn in
    pub segments: usize,
}

/// A drawn variance band
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandHandle {
    pub color: Color,
    pub alpha: f64,
    pub segments: usize,
}

/// Everything [`show_lines`] drew
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinesPlot {
    pub lines: Vec<LineHandle>,
    pub bands: Vec<BandHandle>,
}

struct Band<'a> {
    dy: ArrayViewD<'a, f64>,
    shared: bool,
}

impl Band<'_> {
    fn column(&self, line: usize) -> Vec<f64> {
        if self.shared {
            self.dy.iter().copied().collect()
        } else {
            self.dy.index_axis(Axis(1), line).iter().copied().collect()
        }
    }
}

fn validate_band<'a>(
    dy: &ArrayViewD<'a, f64>,
    points: usize,
    lines: usize,
) -> PlotResult<Band<'a>> {
    let (rows, cols) = match dy.shape() {
        [n] => (*n, 1),
        [n, m] => (*n, *m),
        _ => return Err(PlotError::InvalidBandDimensions { ndim: dy.ndim() }),
    };
    if (cols != 1 && cols != lines) || rows != points {
        return Err(PlotError::BandShapeMismatch {
            rows,
            cols,
            points,
            lines,
        });
    }
    Ok(Band {
        dy: dy.clone(),
        shared: dy.ndim() == 1 || cols == 1,
    })
}

/// Plot each column of `y` as a line against `x` (default `0, 1, 2, ...`)
pub fn show_lines<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    x: Option<&[f64]>,
    y: ArrayView2<'_, f64>,
    options: &LinesOptions<'_>,
) -> PlotResult<LinesPlot> {
    let (points, count) = y.dim();
    if points == 0 || count == 0 {
        return Err(PlotError::EmptyData);
    }
    let x: Vec<f64> = match x {
        Some(x) if x.len() != points => {
            return Err(PlotError::LengthMismatch {
                expected: points,
                found: x.len(),
            })
        }
        Some(x) => x.to_vec(),
        None => (0..points).map(|i| i as f64).collect(),
    };
    let band = options
        .dy
        .as_ref()
        .map(|dy| validate_band(dy, points, count))
        .transpose()?;

    // (x, y, dy) per line after optional gap insertion
    let mut series = Vec::with_capacity(count);
    for line in 0..count {
        let values: Vec<f64> = y.column(line).to_vec();
        let spread = band.as_ref().map(|band| band.column(line));
        if options.gap {
            let (xs, ys) = add_breaks(&x, &values)?;
            let spread = spread.map(|dy| add_breaks(&x, &dy).map(|(_, dy)| dy)).transpose()?;
            series.push((xs, ys, spread));
        } else {
            series.push((x.clone(), values, spread));
        }
    }

    let x_range = finite_range(&x);
    let mut y_range = finite_range(y.iter());
    for (_, ys, spread) in &series {
        if let Some(dy) = spread {
            for (value, d) in ys.iter().zip(dy) {
                y_range.0 = y_range.0.min(value - d.abs());
                y_range.1 = y_range.1.max(value + d.abs());
            }
        }
    }

    let mut frame = Frame::new(x_range, pad(y_range, 0.05));
    frame.show_axes = options.show_axes;
    frame.x_labels = TickLabels::from_labels(options.ticklabels.as_deref());
    frame.x_desc = options.x_label.clone();
    frame.y_desc = options.y_label.clone();
    let mut chart = frame.build(area)?;

    let mut plot = LinesPlot::default();
    for (index, (xs, ys, spread)) in series.iter().enumerate() {
        let color = options
            .colors
            .get(index)
            .copied()
            .unwrap_or_else(|| cycle_color(index));

        if let Some(dy) = spread {
            let lower: Vec<f64> = ys.iter().zip(dy).map(|(v, d)| v - d).collect();
            let upper: Vec<f64> = ys.iter().zip(dy).map(|(v, d)| v + d).collect();
            let lower_runs = finite_runs(xs, &lower);
            let upper_runs = finite_runs(xs, &upper);
            let fill = color.with_alpha(options.alpha as f32).to_rgba().filled();
            chart.draw_series(lower_runs.iter().zip(&upper_runs).map(|(lo, hi)| {
                let outline: Vec<(f64, f64)> =
                    hi.iter().copied().chain(lo.iter().rev().copied()).collect();
                Polygon::new(outline, fill)
            }))?;
            plot.bands.push(BandHandle {
                color,
                alpha: options.alpha,
                segments: upper_runs.len(),
            });
        }

        let runs = finite_runs(xs, ys);
        let style = color.to_rgb().stroke_width(options.line_width);
        for run in &runs {
            chart.draw_series(LineSeries::new(run.iter().copied(), style))?;
        }
        plot.lines.push(LineHandle {
            color,
            points,
            segments: runs.len(),
        });
    }

    debug!(
        lines = plot.lines.len(),
        bands = plot.bands.len(),
        points,
        "drew line plot"
    );
    Ok(plot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array3};

    fn render(
        x: Option<&[f64]>,
        y: ArrayView2<'_, f64>,
        options: &LinesOptions<'_>,
    ) -> (PlotResult<LinesPlot>, String) {
        let mut svg = String::new();
        let result = {
            let root = SVGBackend::with_string(&mut svg, (320, 240)).into_drawing_area();
            let result = show_lines(&root, x, y, options);
            root.present().map_err(PlotError::from).and(result)
        };
        (result, svg)
    }

    #[test]
    fn test_draws_lines_and_shared_band() {
        let y = array![[0.0, 1.0], [1.0, 2.0], [0.5, 1.5]];
        let dy = Array1::from(vec![0.1, 0.2, 0.1]).into_dyn();
        let options = LinesOptions {
            dy: Some(dy.view()),
            show_axes: false,
            ..Default::default()
        };
        let (result, svg) = render(None, y.view(), &options);
        let plot = result.unwrap();
        assert_eq!(plot.lines.len(), 2);
        assert_eq!(plot.bands.len(), 2);
        assert_eq!(plot.lines[1].color, cycle_color(1));
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn test_gap_splits_lines() {
        let y = array![[0.0], [1.0], [2.0], [3.0]];
        let x = [0.0, 1.0, 5.0, 6.0];
        let options = LinesOptions {
            gap: true,
            show_axes: false,
            ..Default::default()
        };
        let (result, _) = render(Some(&x[..]), y.view(), &options);
        assert_eq!(result.unwrap().lines[0].segments, 2);
    }

    #[test]
    fn test_band_validation() {
        let y = array![[0.0, 1.0], [1.0, 2.0], [0.5, 1.5]];

        let cube = Array3::<f64>::zeros((3, 2, 1)).into_dyn();
        let options = LinesOptions {
            dy: Some(cube.view()),
            ..Default::default()
        };
        assert_eq!(
            render(None, y.view(), &options).0,
            Err(PlotError::InvalidBandDimensions { ndim: 3 })
        );

        let wide = ndarray::Array2::<f64>::zeros((3, 3)).into_dyn();
        let options = LinesOptions {
            dy: Some(wide.view()),
            ..Default::default()
        };
        assert!(matches!(
            render(None, y.view(), &options).0,
            Err(PlotError::BandShapeMismatch { cols: 3, .. })
        ));

        let short = Array1::<f64>::zeros(2).into_dyn();
        let options = LinesOptions {
            dy: Some(short.view()),
            ..Default::default()
        };
        assert!(matches!(
            render(None, y.view(), &options).0,
            Err(PlotError::BandShapeMismatch { rows: 2, .. })
        ));
    }

    #[test]
    fn test_x_length_checked() {
        let y = array![[0.0], [1.0]];
        let (result, _) = render(Some(&[0.0][..]), y.view(), &LinesOptions::default());
        assert_eq!(
            result,
            Err(PlotError::LengthMismatch {
                expected: 2,
                found: 1
            })
        );
    }
}
