//! Shared chart scaffolding: ranges, ticks and axes on a drawing area

use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::axis::TickLabels;
use crate::error::PlotResult;

pub(crate) type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Label count giving automatic tick spacing
const AUTO_TICKS: usize = 6;

const LABEL_FONT: (&str, u32) = ("sans-serif", 12);
/// Tick mark length in pixels
const TICK_SIZE: i32 = 5;

/// Data ranges and axis decoration of one panel
#[derive(Clone, Debug)]
pub(crate) struct Frame {
    pub x: (f64, f64),
    pub y: (f64, f64),
    /// Maximum number of labelled ticks per axis
    pub x_ticks: usize,
    pub y_ticks: usize,
    /// Exact tick positions, replacing the automatic ones
    pub x_key_points: Option<Vec<f64>>,
    pub y_key_points: Option<Vec<f64>>,
    pub x_labels: TickLabels,
    pub y_labels: TickLabels,
    pub x_desc: Option<String>,
    pub y_desc: Option<String>,
    pub show_axes: bool,
    pub margin: u32,
}

impl Frame {
    /// Frame with automatic ticks over the given ranges
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        let (x, y) = (widen(x), widen(y));
        Self {
            x,
            y,
            x_ticks: AUTO_TICKS,
            y_ticks: AUTO_TICKS,
            x_key_points: None,
            y_key_points: None,
            x_labels: TickLabels::Numeric,
            y_labels: TickLabels::Numeric,
            x_desc: None,
            y_desc: None,
            show_axes: true,
            margin: 8,
        }
    }

    /// Frame without axes, used for decoration panels
    pub fn bare(x: (f64, f64), y: (f64, f64)) -> Self {
        Self {
            show_axes: false,
            margin: 0,
            ..Self::new(x, y)
        }
    }

    pub fn build<'a, DB: DrawingBackend>(
        &self,
        area: &'a DrawingArea<DB, Shift>,
    ) -> PlotResult<Chart<'a, DB>> {
        let (x_area, y_area) = if self.show_axes { (30, 50) } else { (0, 0) };
        let mut chart = ChartBuilder::on(area)
            .margin(self.margin)
            .x_label_area_size(x_area)
            .y_label_area_size(y_area)
            .build_cartesian_2d(self.x.0..self.x.1, self.y.0..self.y.1)?;

        if self.show_axes {
            let x_format = |v: &f64| self.x_labels.format(*v);
            let y_format = |v: &f64| self.y_labels.format(*v);
            let mut mesh = chart.configure_mesh();
            mesh.disable_mesh()
                .x_labels(if self.x_key_points.is_some() { 0 } else { self.x_ticks })
                .y_labels(if self.y_key_points.is_some() { 0 } else { self.y_ticks })
                .x_label_formatter(&x_format)
                .y_label_formatter(&y_format)
                .label_style(LABEL_FONT);
            if let Some(desc) = &self.x_desc {
                mesh.x_desc(desc.as_str());
            }
            if let Some(desc) = &self.y_desc {
                mesh.y_desc(desc.as_str());
            }
            mesh.draw()?;
            self.draw_key_points(area, &chart)?;
        }
        Ok(chart)
    }

    /// Tick marks and labels at the fixed positions, outside the plotting area
    fn draw_key_points<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        chart: &Chart<'_, DB>,
    ) -> PlotResult<()> {
        let (base_x, base_y) = area.get_base_pixel();
        let pixel = |x: f64, y: f64| {
            let (px, py) = chart.backend_coord(&(x, y));
            (px - base_x, py - base_y)
        };

        if let (Some(points), false) = (&self.x_key_points, self.x_labels.is_hidden()) {
            let style = TextStyle::from(LABEL_FONT).pos(Pos::new(HPos::Center, VPos::Top));
            for &x in points {
                let (px, py) = pixel(x, self.y.0);
                area.draw(&PathElement::new(vec![(px, py), (px, py + TICK_SIZE)], BLACK))?;
                let label = self.x_labels.format(x);
                area.draw(&Text::new(label, (px, py + TICK_SIZE + 2), style.clone()))?;
            }
        }
        if let (Some(points), false) = (&self.y_key_points, self.y_labels.is_hidden()) {
            let style = TextStyle::from(LABEL_FONT).pos(Pos::new(HPos::Right, VPos::Center));
            for &y in points {
                let (px, py) = pixel(self.x.0, y);
                area.draw(&PathElement::new(vec![(px - TICK_SIZE, py), (px, py)], BLACK))?;
                let label = self.y_labels.format(y);
                area.draw(&Text::new(label, (px - TICK_SIZE - 2, py), style.clone()))?;
            }
        }
        Ok(())
    }
}

/// Expand an empty or inverted range so it can be drawn
pub(crate) fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if hi > lo {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

/// Smallest and largest finite value
pub(crate) fn finite_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> (f64, f64) {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Grow a range by `fraction` of its span on both sides
pub(crate) fn pad((lo, hi): (f64, f64), fraction: f64) -> (f64, f64) {
    let span = hi - lo;
    (lo - span * fraction, hi + span * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen() {
        assert_eq!(widen((1.0, 1.0)), (0.5, 1.5));
        assert_eq!(widen((0.0, 2.0)), (0.0, 2.0));
        assert_eq!(widen((f64::INFINITY, f64::NEG_INFINITY)), (0.0, 1.0));
    }

    #[test]
    fn test_finite_range_and_pad() {
        let range = finite_range(&[2.0, f64::NAN, -2.0]);
        assert_eq!(range, (-2.0, 2.0));
        assert_eq!(pad(range, 0.25), (-3.0, 3.0));
    }
}
