//! Matrix heat maps with flanking curve or tree panels
//!
//! The figure is split into an optional colorbar strip on the right and a
//! panel grid (see [`GridLayout`]). The matrix takes the main cell; a curve
//! above it follows the columns and a curve or tree on its left follows the
//! rows. Curves are drawn as short segments colored by their own value.

use ensview_tree::Tree;
use ndarray::ArrayView2;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::Color as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::{index_ticks, major_ticks, IndexFormatter, TickLabels};
use crate::chart::{finite_range, Frame};
use crate::colormap::{Color, ColorNorm, Colormap, DEFAULT_MATRIX_CMAP};
use crate::error::{PlotError, PlotResult};
use crate::layout::{GridLayout, PanelKind, DEFAULT_RATIO};
use crate::scale::{clip_limits, interp_y};
use crate::tree::{draw_tree, TreeOptions, TreePlot};

/// Colorbar strip width as a fraction of the figure
const COLORBAR_FRACTION: f64 = 0.1;
/// Colors in the colorbar gradient
const COLORBAR_STEPS: usize = 64;

/// Where row zero of the matrix is drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Upper,
    #[default]
    Lower,
}

/// Content of the panel left of the matrix
#[derive(Clone, Copy, Debug, Default)]
pub enum SidePanel<'a> {
    #[default]
    None,
    /// One value per matrix row
    Curve(&'a [f64]),
    Tree(&'a Tree),
}

impl SidePanel<'_> {
    pub fn kind(&self) -> PanelKind {
        match self {
            SidePanel::None => PanelKind::None,
            SidePanel::Curve(_) => PanelKind::Curve,
            SidePanel::Tree(_) => PanelKind::Tree,
        }
    }
}

/// Options for [`show_matrix`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixOptions {
    /// Clip colors to the `p`-th and `(100 - p)`-th percentiles
    pub percentile: Option<f64>,
    /// Size of the matrix relative to a flanking panel
    pub ratio: f64,
    /// Tick labels looked up by row/column index
    pub ticklabels: Option<Vec<String>>,
    /// One tick per row and column
    pub allticks: bool,
    pub origin: Origin,
    pub colorbar: bool,
    pub cmap: String,
    pub show_axes: bool,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            percentile: None,
            ratio: DEFAULT_RATIO,
            ticklabels: None,
            allticks: false,
            origin: Origin::default(),
            colorbar: true,
            cmap: DEFAULT_MATRIX_CMAP.to_string(),
            show_axes: true,
        }
    }
}

/// The drawn matrix image
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageHandle {
    /// (rows, columns)
    pub shape: (usize, usize),
    pub vmin: f64,
    pub vmax: f64,
    pub cmap: String,
    pub origin: Origin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurvePanel {
    Top,
    Left,
}

/// A color-coded curve in a flanking panel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveHandle {
    pub panel: CurvePanel,
    /// Segments after interpolation
    pub segments: usize,
    /// Value range the curve colors are normalized over
    pub range: (f64, f64),
}

/// The drawn colorbar
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorbarHandle {
    pub vmin: f64,
    pub vmax: f64,
    /// Fraction of the figure height spanned, anchored at the bottom
    pub shrink: f64,
    pub ticks: Vec<f64>,
    /// Gradient colors from bottom to top
    pub colors: Vec<String>,
}

/// Everything [`show_matrix`] drew
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatrixPlot {
    pub image: ImageHandle,
    pub lines: Vec<CurveHandle>,
    pub colorbar: Option<ColorbarHandle>,
    pub tree: Option<TreePlot>,
    pub layout: GridLayout,
}

/// Draw `matrix` as a heat map, with `x_array` above it and `side` on its left
pub fn show_matrix<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    matrix: ArrayView2<'_, f64>,
    x_array: Option<&[f64]>,
    side: SidePanel<'_>,
    options: &MatrixOptions,
) -> PlotResult<MatrixPlot> {
    let (rows, cols) = matrix.dim();
    if rows == 0 || cols == 0 {
        return Err(PlotError::EmptyData);
    }
    let cmap = Colormap::by_name(&options.cmap)?;
    let norm = match options.percentile {
        Some(p) => {
            let (vmin, vmax) = clip_limits(matrix, p)?;
            ColorNorm::new(vmin, vmax)
        }
        None => ColorNorm::from_data(matrix.iter()).unwrap_or(ColorNorm::new(0.0, 1.0)),
    };

    let layout = GridLayout::for_panels(x_array.is_some(), side.kind(), options.ratio);
    let (width, height) = area.dim_in_pixel();
    let (grid, strip) = if options.colorbar {
        let strip_width = (f64::from(width) * COLORBAR_FRACTION).round() as i32;
        let (grid, strip) = area.split_horizontally(width as i32 - strip_width);
        (grid, Some(strip))
    } else {
        (area.clone(), None)
    };
    let (grid_width, grid_height) = grid.dim_in_pixel();
    let (xs, ys) = layout.breakpoints(grid_width, grid_height);
    let cells = grid.split_by_breakpoints(xs, ys);

    let mut lines = Vec::new();
    let mut tree = None;

    if let Some(top) = layout.top() {
        // A tree on the side leaves the top cell empty
        if let (Some(values), false) = (x_array, matches!(side, SidePanel::Tree(_))) {
            lines.push(draw_curve(&cells[layout.cell_index(top)], values, CurvePanel::Top)?);
        }
    }
    if let Some(left) = layout.left() {
        let cell = &cells[layout.cell_index(left)];
        match side {
            SidePanel::Curve(values) => lines.push(draw_curve(cell, values, CurvePanel::Left)?),
            SidePanel::Tree(t) => tree = Some(draw_tree(cell, t, &TreeOptions::default())?),
            SidePanel::None => {}
        }
    }

    let main = &cells[layout.cell_index(layout.main)];
    let main = if layout.auto_aspect {
        main.clone()
    } else {
        square_cells(main, rows, cols)
    };
    draw_image(&main, matrix, &layout, &cmap, &norm, options)?;

    let colorbar = match &strip {
        Some(strip) => Some(draw_colorbar(strip, &cmap, &norm, layout.colorbar_shrink())?),
        None => None,
    };
    debug!(
        rows,
        cols,
        panels = layout.nrows * layout.ncols,
        curves = lines.len(),
        "drew matrix"
    );

    Ok(MatrixPlot {
        image: ImageHandle {
            shape: (rows, cols),
            vmin: norm.vmin,
            vmax: norm.vmax,
            cmap: cmap.name.clone(),
            origin: options.origin,
        },
        lines,
        colorbar,
        tree,
        layout,
    })
}

/// Centered sub-area in which every matrix cell is square
fn square_cells<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rows: usize,
    cols: usize,
) -> DrawingArea<DB, Shift> {
    let (width, height) = area.dim_in_pixel();
    let cell = (f64::from(width) / cols as f64).min(f64::from(height) / rows as f64);
    let w = (cell * cols as f64).round().max(1.0) as u32;
    let h = (cell * rows as f64).round().max(1.0) as u32;
    area.clone()
        .shrink(((width - w.min(width)) / 2, (height - h.min(height)) / 2), (w, h))
}

fn draw_image<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    matrix: ArrayView2<'_, f64>,
    layout: &GridLayout,
    cmap: &Colormap,
    norm: &ColorNorm,
    options: &MatrixOptions,
) -> PlotResult<()> {
    let (rows, cols) = matrix.dim();
    let upper = options.origin == Origin::Upper;
    // Row i sits at height i, or counted down from the top when upper
    let row_position = |i: usize| if upper { (rows - 1 - i) as f64 } else { i as f64 };

    let mut frame = Frame::new((-0.5, cols as f64 - 0.5), (-0.5, rows as f64 - 0.5));
    frame.show_axes = options.show_axes;
    frame.x_labels = TickLabels::from_labels(options.ticklabels.as_deref());
    frame.y_labels = if layout.ncols > 1 {
        TickLabels::Hidden
    } else {
        match (&options.ticklabels, upper) {
            (Some(labels), true) => {
                TickLabels::Index(IndexFormatter::new(labels.iter().rev().cloned().collect()))
            }
            (Some(labels), false) => TickLabels::Index(IndexFormatter::new(labels.clone())),
            (None, true) => TickLabels::Mirrored((rows - 1) as f64),
            (None, false) => TickLabels::Numeric,
        }
    };
    if options.allticks {
        frame.x_key_points = Some(index_ticks(cols));
        frame.y_key_points = Some(index_ticks(rows));
    }
    let mut chart = frame.build(area)?;

    chart.draw_series(matrix.indexed_iter().filter(|(_, v)| !v.is_nan()).map(
        |((i, j), &value)| {
            let (x, y) = (j as f64, row_position(i));
            let color = cmap.sample(norm.normalize(value)).to_rgb();
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
        },
    ))?;
    Ok(())
}

/// Color-coded curve; the left panel runs vertically and grows to the left
fn draw_curve<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    values: &[f64],
    panel: CurvePanel,
) -> PlotResult<CurveHandle> {
    if values.is_empty() {
        return Err(PlotError::EmptyData);
    }
    let (xp, yp) = interp_y(values);
    let range = finite_range(&yp);
    let norm = ColorNorm::new(range.0, range.1);
    let cmap = Colormap::by_name(DEFAULT_MATRIX_CMAP)?;
    let index_range = finite_range(&xp);

    let place = |x: f64, y: f64| match panel {
        CurvePanel::Top => (x, y),
        CurvePanel::Left => (-y, x),
    };
    let frame = match panel {
        CurvePanel::Top => Frame::bare(index_range, range),
        CurvePanel::Left => Frame::bare((-range.1, -range.0), index_range),
    };
    let mut chart = frame.build(area)?;

    let segments = xp.len().saturating_sub(1);
    chart.draw_series((0..segments).map(|k| {
        let color = cmap.sample(norm.normalize(yp[k])).to_rgb();
        PathElement::new(
            vec![place(xp[k], yp[k]), place(xp[k + 1], yp[k + 1])],
            color.stroke_width(1),
        )
    }))?;

    Ok(CurveHandle {
        panel,
        segments,
        range,
    })
}

/// Vertical gradient from `vmin` to `vmax` in the bottom `shrink` of `area`
fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    cmap: &Colormap,
    norm: &ColorNorm,
    shrink: f64,
) -> PlotResult<ColorbarHandle> {
    let (width, height) = area.dim_in_pixel();
    let bar_height = (f64::from(height) * shrink).round() as u32;
    let bar = area
        .clone()
        .shrink((0, height - bar_height.min(height)), (width, bar_height));

    let (vmin, vmax) = (norm.vmin, norm.vmax);
    let mut frame = Frame::new((0.0, 1.0), (vmin, vmax));
    frame.x_labels = TickLabels::Hidden;
    frame.x_ticks = 0;
    let (lo, hi) = frame.y;
    let mut chart = frame.build(&bar)?;

    // A flat range is drawn in the single color every cell gets
    let lut = if vmax > vmin {
        cmap.lut(COLORBAR_STEPS)
    } else {
        vec![cmap.sample(0.5); COLORBAR_STEPS]
    };
    let step = (hi - lo) / COLORBAR_STEPS as f64;
    chart.draw_series(lut.iter().enumerate().map(|(k, color)| {
        let y0 = lo + step * k as f64;
        Rectangle::new([(0.0, y0), (1.0, y0 + step)], color.to_rgb().filled())
    }))?;

    Ok(ColorbarHandle {
        vmin,
        vmax,
        shrink,
        ticks: major_ticks(lo, hi),
        colors: lut.iter().map(Color::hex).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use rstest::rstest;

    fn render(
        matrix: ArrayView2<'_, f64>,
        x_array: Option<&[f64]>,
        side: SidePanel<'_>,
        options: &MatrixOptions,
    ) -> (PlotResult<MatrixPlot>, String) {
        let mut svg = String::new();
        let result = {
            let root = SVGBackend::with_string(&mut svg, (400, 400)).into_drawing_area();
            let result = show_matrix(&root, matrix, x_array, side, options);
            root.present().map_err(PlotError::from).and(result)
        };
        (result, svg)
    }

    fn sample() -> Array2<f64> {
        Array2::from_shape_fn((4, 4), |(i, j)| (i as f64 - j as f64).abs())
    }

    #[test]
    fn test_plain_matrix() {
        let m = sample();
        let (result, svg) = render(m.view(), None, SidePanel::None, &MatrixOptions::default());
        let plot = result.unwrap();
        assert_eq!(plot.image.shape, (4, 4));
        assert_eq!((plot.image.vmin, plot.image.vmax), (0.0, 3.0));
        assert_eq!(plot.image.cmap, "jet");
        assert!(plot.lines.is_empty());
        let colorbar = plot.colorbar.unwrap();
        assert_eq!(colorbar.shrink, 1.0);
        assert!(!colorbar.ticks.is_empty());
        assert_eq!(colorbar.colors.len(), COLORBAR_STEPS);
        assert_eq!(colorbar.colors[0], "#000080");
        assert_eq!(colorbar.colors[COLORBAR_STEPS - 1], "#800000");
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_percentile_clips_colors() {
        let m = array![[0.0, 1.0], [2.0, 3.0]];
        let options = MatrixOptions {
            percentile: Some(10.0),
            colorbar: false,
            ..Default::default()
        };
        let plot = render(m.view(), None, SidePanel::None, &options).0.unwrap();
        assert!((plot.image.vmin - 0.3).abs() < 1e-12);
        assert!((plot.image.vmax - 2.7).abs() < 1e-12);
        assert_eq!(plot.colorbar, None);
    }

    #[test]
    fn test_curves_on_both_sides() {
        let m = sample();
        let top = [0.0, 1.0, 0.5, 2.0];
        let left = [3.0, 2.0, 1.0, 0.0];
        let (result, _) = render(
            m.view(),
            Some(&top[..]),
            SidePanel::Curve(&left[..]),
            &MatrixOptions::default(),
        );
        let plot = result.unwrap();
        assert_eq!(plot.layout.main, (1, 1));
        assert_eq!(plot.lines.len(), 2);
        assert_eq!(plot.lines[0].panel, CurvePanel::Top);
        assert_eq!(plot.lines[1].range, (0.0, 3.0));
        let shrink = plot.colorbar.unwrap().shrink;
        assert!((shrink - 6.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_tree_side_panel() {
        let m = sample();
        let tree = Tree::from_newick("((a:1,b:1):1,(c:1,d:1):1);").unwrap();
        let top = [0.0, 1.0, 2.0, 3.0];
        let (result, _) = render(
            m.view(),
            Some(&top[..]),
            SidePanel::Tree(&tree),
            &MatrixOptions::default(),
        );
        let plot = result.unwrap();
        assert!(plot.lines.is_empty());
        assert_eq!(plot.tree.unwrap().terminals, 4);
    }

    #[rstest]
    #[case(Origin::Lower, true)]
    #[case(Origin::Upper, false)]
    fn test_origin_and_ticks(#[case] origin: Origin, #[case] allticks: bool) {
        let m = sample();
        let options = MatrixOptions {
            origin,
            allticks,
            ticklabels: Some(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
            ..Default::default()
        };
        let plot = render(m.view(), None, SidePanel::None, &options).0.unwrap();
        assert_eq!(plot.image.origin, origin);
    }

    #[test]
    fn test_allticks_labels_every_index() {
        let m = Array2::from_shape_fn((12, 12), |(i, j)| (i * j) as f64);
        let labels: Vec<String> = (0..12).map(|k| format!("r{k}")).collect();
        let options = MatrixOptions {
            allticks: true,
            colorbar: false,
            ticklabels: Some(labels.clone()),
            ..Default::default()
        };
        let (result, svg) = render(m.view(), None, SidePanel::None, &options);
        result.unwrap();
        for label in &labels {
            // once along each axis
            assert_eq!(svg.matches(&format!(">{label}<")).count(), 2, "{label}");
        }
    }

    #[test]
    fn test_errors() {
        let empty = Array2::<f64>::zeros((0, 0));
        assert_eq!(
            render(empty.view(), None, SidePanel::None, &MatrixOptions::default()).0,
            Err(PlotError::EmptyData)
        );

        let m = sample();
        let options = MatrixOptions {
            cmap: "nope".into(),
            ..Default::default()
        };
        assert_eq!(
            render(m.view(), None, SidePanel::None, &options).0,
            Err(PlotError::UnknownColormap("nope".into()))
        );

        let options = MatrixOptions {
            percentile: Some(150.0),
            ..Default::default()
        };
        assert_eq!(
            render(m.view(), None, SidePanel::None, &options).0,
            Err(PlotError::InvalidPercentile(150.0))
        );
    }
}
