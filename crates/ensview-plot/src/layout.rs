//! Panel grid for matrix figures
//!
//! A matrix may be flanked by a curve above it and a curve or tree on its
//! left. The grid has one or two rows and columns; the main panel is always
//! the bottom-right cell, the top panel sits directly above it and the side
//! panel directly left of it.

use serde::{Deserialize, Serialize};

/// Default size ratio between the matrix and a flanking panel
pub const DEFAULT_RATIO: f64 = 6.0;

/// What occupies the panel left of the matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelKind {
    None,
    Curve,
    Tree,
}

/// Row and column layout of a matrix figure
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub nrows: usize,
    pub ncols: usize,
    pub width_ratios: Vec<f64>,
    pub height_ratios: Vec<f64>,
    /// (row, column) of the matrix panel
    pub main: (usize, usize),
    /// Cells stretch to fill the panel instead of staying square
    pub auto_aspect: bool,
}

impl GridLayout {
    /// Layout for an optional top curve and a side panel of the given kind
    pub fn for_panels(top_curve: bool, side: PanelKind, ratio: f64) -> Self {
        let (w, h) = (ratio, ratio);
        let (nrows, ncols, width_ratios, height_ratios, main) = match (top_curve, side) {
            (true, PanelKind::Curve | PanelKind::Tree) => {
                (2, 2, vec![1.0, w], vec![1.0, h], (1, 1))
            }
            (true, PanelKind::None) => (2, 1, vec![w], vec![1.0, h], (1, 0)),
            (false, PanelKind::Tree) => (2, 2, vec![w, w], vec![h, h], (1, 1)),
            (false, PanelKind::Curve) => (1, 2, vec![1.0, w], vec![h], (0, 1)),
            (false, PanelKind::None) => (1, 1, vec![w], vec![h], (0, 0)),
        };
        Self {
            nrows,
            ncols,
            width_ratios,
            height_ratios,
            main,
            auto_aspect: nrows > 1 || ncols > 1,
        }
    }

    /// Cell above the matrix, if the grid has two rows
    pub fn top(&self) -> Option<(usize, usize)> {
        (self.main.0 > 0).then(|| (self.main.0 - 1, self.main.1))
    }

    /// Cell left of the matrix, if the grid has two columns
    pub fn left(&self) -> Option<(usize, usize)> {
        (self.main.1 > 0).then(|| (self.main.0, self.main.1 - 1))
    }

    /// Index of a cell in row-major order
    pub fn cell_index(&self, cell: (usize, usize)) -> usize {
        cell.0 * self.ncols + cell.1
    }

    /// Interior pixel breakpoints splitting a `width` x `height` area
    pub fn breakpoints(&self, width: u32, height: u32) -> (Vec<i32>, Vec<i32>) {
        (
            cumulative_breaks(&self.width_ratios, width),
            cumulative_breaks(&self.height_ratios, height),
        )
    }

    /// Fraction of the figure height a colorbar may use
    ///
    /// With a top panel the colorbar only spans the matrix rows.
    pub fn colorbar_shrink(&self) -> f64 {
        if self.nrows > 1 {
            let h = self.height_ratios[self.main.0];
            h / (h + 1.0)
        } else {
            1.0
        }
    }
}

fn cumulative_breaks(ratios: &[f64], extent: u32) -> Vec<i32> {
    let total: f64 = ratios.iter().sum();
    let mut acc = 0.0;
    ratios
        .iter()
        .take(ratios.len().saturating_sub(1))
        .map(|ratio| {
            acc += ratio;
            (acc / total * f64::from(extent)).round() as i32
        })
        .collect()
}
