//! Rectangular tree drawing
//!
//! Terminals are stacked top to bottom in traversal order, one unit apart;
//! the horizontal position of a clade is its depth from the root. Each
//! internal clade gets a vertical bar spanning its first and last child.

use std::collections::HashMap;

use ensview_tree::{NodeId, Tree};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::Color as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::Frame;
use crate::colormap::Color;
use crate::error::{PlotError, PlotResult};

/// Options for [`draw_tree`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    pub color: Color,
    pub line_width: u32,
    /// Write terminal names next to the tips
    pub show_labels: bool,
    pub show_axes: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            color: Color::opaque(0.0, 0.0, 0.0),
            line_width: 1,
            show_labels: true,
            show_axes: false,
        }
    }
}

/// Summary of a drawn tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreePlot {
    pub terminals: usize,
    /// Largest root-to-tip depth, the extent of the horizontal axis
    pub depth: f64,
}

/// Tip and node coordinates of a tree
#[derive(Clone, Debug, PartialEq)]
pub struct TreeGeometry {
    /// (x, y) of every clade
    pub positions: HashMap<NodeId, (f64, f64)>,
    /// Horizontal branches `(y, x_parent, x_child)`
    pub branches: Vec<(f64, f64, f64)>,
    /// Vertical bars `(x, y_first_child, y_last_child)`
    pub bars: Vec<(f64, f64, f64)>,
}

impl TreeGeometry {
    /// Lay out `tree`; branch lengths of one are assumed when none are set
    pub fn of(tree: &Tree) -> PlotResult<Self> {
        let root = tree.root().ok_or(PlotError::EmptyData)?;
        let preorder = tree.preorder();
        let unit = preorder
            .iter()
            .all(|id| tree.clade(*id).branch_length.unwrap_or(0.0) == 0.0);

        let mut positions = HashMap::with_capacity(preorder.len());
        let mut x = HashMap::with_capacity(preorder.len());
        for id in &preorder {
            let clade = tree.clade(*id);
            let length = if unit {
                1.0
            } else {
                clade.branch_length.unwrap_or(0.0)
            };
            let depth = match clade.parent {
                Some(parent) => x.get(&parent).copied().unwrap_or(0.0) + length,
                None => 0.0,
            };
            x.insert(*id, depth);
        }

        for (row, id) in tree.terminals().iter().enumerate() {
            positions.insert(*id, (x[id], row as f64));
        }

        let mut branches = Vec::new();
        let mut bars = Vec::new();
        for id in preorder.iter().rev() {
            let clade = tree.clade(*id);
            if let (Some(first), Some(last)) = (clade.children.first(), clade.children.last()) {
                let y_first = positions[first].1;
                let y_last = positions[last].1;
                positions.insert(*id, (x[id], 0.5 * (y_first + y_last)));
                bars.push((x[id], y_first, y_last));
            }
            if let Some(parent) = clade.parent {
                branches.push((positions[id].1, x[&parent], x[id]));
            }
        }
        debug!(clades = positions.len(), root = %root, "laid out tree");

        Ok(Self {
            positions,
            branches,
            bars,
        })
    }

    /// Largest x coordinate
    pub fn depth(&self) -> f64 {
        self.positions.values().map(|p| p.0).fold(0.0, f64::max)
    }
}

/// Draw `tree` filling `area`
pub fn draw_tree<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    tree: &Tree,
    options: &TreeOptions,
) -> PlotResult<TreePlot> {
    let geometry = TreeGeometry::of(tree)?;
    let terminals = tree.terminals();
    let depth = geometry.depth();
    let rows = terminals.len() as f64;

    // Leave room to the right of the tips for their names
    let x_max = if options.show_labels {
        depth * 1.25
    } else {
        depth
    };
    // Rows are drawn at -y so the first terminal ends up on top
    let mut frame = Frame::bare((0.0, x_max), (-(rows - 0.5), 0.5));
    frame.show_axes = options.show_axes;
    let mut chart = frame.build(area)?;

    let style = options.color.to_rgb().stroke_width(options.line_width);
    chart.draw_series(
        geometry
            .branches
            .iter()
            .map(|&(y, x0, x1)| PathElement::new(vec![(x0, -y), (x1, -y)], style)),
    )?;
    chart.draw_series(
        geometry
            .bars
            .iter()
            .map(|&(x, y0, y1)| PathElement::new(vec![(x, -y0), (x, -y1)], style)),
    )?;

    if options.show_labels {
        let font = ("sans-serif", 12).into_font().color(&options.color.to_rgb());
        chart.draw_series(terminals.iter().map(|id| {
            let (x, y) = geometry.positions[id];
            let label = tree.clade(*id).name.as_deref().unwrap_or_default();
            Text::new(format!(" {label}"), (x, -y), font.clone())
        }))?;
    }

    Ok(TreePlot {
        terminals: terminals.len(),
        depth,
    })
}
