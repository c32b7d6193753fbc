//! Figure export to SVG or PNG files
//!
//! A [`Figure`] draws itself on any backend, so the same plot can be
//! written to a file, rendered to an in-memory SVG string, or composed into
//! a larger drawing area by the caller.

use std::fs;
use std::path::Path;

use ensview_cluster::Dendrogram;
use ensview_tree::Tree;
use ndarray::ArrayView2;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dendrogram::{show_dendrogram, DendrogramOptions, DendrogramPlot};
use crate::error::{PlotError, PlotResult};
use crate::lines::{show_lines, LinesOptions, LinesPlot};
use crate::matrix::{show_matrix, MatrixOptions, MatrixPlot, SidePanel};
use crate::tree::{draw_tree, TreeOptions, TreePlot};

/// Default figure size in pixels
pub const DEFAULT_SIZE: (u32, u32) = (800, 600);

/// Supported output file formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    /// Format implied by the file extension
    pub fn from_path(path: &Path) -> PlotResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("svg") => Ok(ExportFormat::Svg),
            Some("png") => Ok(ExportFormat::Png),
            _ => Err(PlotError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Png => "image/png",
        }
    }

    /// Whether this build can write the format
    pub fn is_available(&self) -> bool {
        match self {
            ExportFormat::Svg => true,
            ExportFormat::Png => cfg!(feature = "png"),
        }
    }
}

/// Something that can be drawn on a drawing area of any backend
pub trait Figure {
    /// Handles describing what was drawn
    type Output;

    fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>)
        -> PlotResult<Self::Output>;
}

/// Lines of [`show_lines`]
pub struct LinesFigure<'a> {
    pub x: Option<&'a [f64]>,
    pub y: ArrayView2<'a, f64>,
    pub options: LinesOptions<'a>,
}

impl Figure for LinesFigure<'_> {
    type Output = LinesPlot;

    fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> PlotResult<LinesPlot> {
        show_lines(area, self.x, self.y, &self.options)
    }
}

/// Heat map of [`show_matrix`]
pub struct MatrixFigure<'a> {
    pub matrix: ArrayView2<'a, f64>,
    pub x_array: Option<&'a [f64]>,
    pub side: SidePanel<'a>,
    pub options: MatrixOptions,
}

impl Figure for MatrixFigure<'_> {
    type Output = MatrixPlot;

    fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> PlotResult<MatrixPlot> {
        show_matrix(area, self.matrix, self.x_array, self.side, &self.options)
    }
}

/// Dendrogram of [`show_dendrogram`]
pub struct DendrogramFigure<'a> {
    pub dendrogram: &'a Dendrogram,
    pub options: DendrogramOptions,
}

impl Figure for DendrogramFigure<'_> {
    type Output = DendrogramPlot;

    fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
    ) -> PlotResult<DendrogramPlot> {
        show_dendrogram(area, self.dendrogram, &self.options)
    }
}

/// Tree of [`draw_tree`]
pub struct TreeFigure<'a> {
    pub tree: &'a Tree,
    pub options: TreeOptions,
}

impl Figure for TreeFigure<'_> {
    type Output = TreePlot;

    fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> PlotResult<TreePlot> {
        draw_tree(area, self.tree, &self.options)
    }
}

fn paint<DB: DrawingBackend, F: Figure>(
    root: DrawingArea<DB, Shift>,
    figure: &F,
) -> PlotResult<F::Output> {
    root.fill(&WHITE)?;
    let output = figure.draw(&root)?;
    root.present()?;
    Ok(output)
}

/// Draw `figure` on a white canvas of `size` pixels and write it to `path`
///
/// The format follows the extension of `path`; parent directories are
/// created as needed.
pub fn render_to_file<F: Figure>(
    path: &Path,
    size: (u32, u32),
    figure: &F,
) -> PlotResult<F::Output> {
    let format = ExportFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let output = match format {
        ExportFormat::Svg => paint(SVGBackend::new(path, size).into_drawing_area(), figure)?,
        #[cfg(feature = "png")]
        ExportFormat::Png => paint(BitMapBackend::new(path, size).into_drawing_area(), figure)?,
        #[cfg(not(feature = "png"))]
        ExportFormat::Png => {
            return Err(PlotError::BackendUnavailable {
                format: "PNG",
                feature: "png",
            })
        }
    };
    info!(path = %path.display(), format = format.extension(), "wrote figure");
    Ok(output)
}

/// Draw `figure` into an SVG document held in memory
pub fn render_to_svg_string<F: Figure>(
    size: (u32, u32),
    figure: &F,
) -> PlotResult<(F::Output, String)> {
    let mut svg = String::new();
    let output = paint(SVGBackend::with_string(&mut svg, size).into_drawing_area(), figure)?;
    Ok((output, svg))
}
