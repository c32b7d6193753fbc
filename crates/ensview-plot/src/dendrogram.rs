//! Dendrogram drawing

use ensview_cluster::{Dendrogram, LEAF_SPACING};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::Color as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::{index_ticks, IndexFormatter, TickLabels};
use crate::chart::Frame;
use crate::colormap::{cycle_color, Color};
use crate::error::{PlotError, PlotResult};

/// Side of the figure the root is drawn on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Root on top, leaves along the bottom
    Top,
    /// Root at the bottom, leaves along the top
    Bottom,
    /// Root on the left, leaves along the right
    Left,
    /// Root on the right, leaves along the left
    #[default]
    Right,
}

impl Orientation {
    /// Leaves run along the vertical axis
    fn vertical_leaves(self) -> bool {
        matches!(self, Orientation::Left | Orientation::Right)
    }

    /// Map (leaf position, height) to chart coordinates
    fn place(self, leaf: f64, height: f64) -> (f64, f64) {
        match self {
            Orientation::Top => (leaf, height),
            Orientation::Bottom => (leaf, -height),
            Orientation::Left => (-height, leaf),
            Orientation::Right => (height, leaf),
        }
    }
}

/// Options for [`show_dendrogram`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DendrogramOptions {
    pub orientation: Orientation,
    pub color: Color,
    pub line_width: u32,
    /// Label leaves with the dendrogram's leaf labels
    pub show_labels: bool,
    pub show_axes: bool,
}

impl Default for DendrogramOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            color: cycle_color(0),
            line_width: 1,
            show_labels: true,
            show_axes: true,
        }
    }
}

/// Summary of a drawn dendrogram
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DendrogramPlot {
    pub links: usize,
    pub leaves: Vec<String>,
    pub max_height: f64,
}

/// Leaf coordinate `5, 15, 25, ...` as leaf index `0, 1, 2, ...`
fn leaf_index(coordinate: f64) -> f64 {
    (coordinate - 0.5 * LEAF_SPACING) / LEAF_SPACING
}

/// Draw the U-links of `dendrogram`
pub fn show_dendrogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    dendrogram: &Dendrogram,
    options: &DendrogramOptions,
) -> PlotResult<DendrogramPlot> {
    if dendrogram.icoord.is_empty() {
        return Err(PlotError::EmptyData);
    }
    let orientation = options.orientation;
    let max_height = dendrogram.max_height();
    let top = if max_height > 0.0 { max_height * 1.05 } else { 1.0 };
    let count = dendrogram.leaves.len();

    let corner_a = orientation.place(-0.5, 0.0);
    let corner_b = orientation.place(count as f64 - 0.5, top);
    let mut frame = Frame::new(
        (corner_a.0.min(corner_b.0), corner_a.0.max(corner_b.0)),
        (corner_a.1.min(corner_b.1), corner_a.1.max(corner_b.1)),
    );
    frame.show_axes = options.show_axes;

    let leaf_labels = if options.show_labels {
        TickLabels::Index(IndexFormatter::new(dendrogram.ivl.clone()))
    } else {
        TickLabels::Hidden
    };
    // Heights are shown as positive values on every side
    let height_labels = TickLabels::Magnitude;
    if orientation.vertical_leaves() {
        frame.x_labels = height_labels;
        frame.y_labels = leaf_labels;
        frame.y_key_points = Some(index_ticks(count));
    } else {
        frame.x_labels = leaf_labels;
        frame.x_key_points = Some(index_ticks(count));
        frame.y_labels = height_labels;
    }
    let mut chart = frame.build(area)?;

    let style = options.color.to_rgb().stroke_width(options.line_width);
    chart.draw_series(dendrogram.icoord.iter().zip(&dendrogram.dcoord).map(|(xs, ds)| {
        let points: Vec<(f64, f64)> = xs
            .iter()
            .zip(ds)
            .map(|(&x, &d)| orientation.place(leaf_index(x), d))
            .collect();
        PathElement::new(points, style)
    }))?;
    debug!(links = dendrogram.icoord.len(), leaves = count, "drew dendrogram");

    Ok(DendrogramPlot {
        links: dendrogram.icoord.len(),
        leaves: dendrogram.ivl.clone(),
        max_height,
    })
}
