//! Rendering figures to files

use ensview_cluster::{cluster_matrix, ClusterOptions, Dendrogram, MatrixInput};
use ensview_plot::{
    render_to_file, DendrogramFigure, DendrogramOptions, ExportFormat, LinesFigure,
    LinesOptions, MatrixFigure, MatrixOptions, PlotError, SidePanel, TreeFigure, TreeOptions,
    DEFAULT_SIZE,
};
use ensview_tree::calc_tree;
use ndarray::{array, Array2};
use tempfile::TempDir;

fn distances() -> Array2<f64> {
    let points = [0.0f64, 0.4, 3.0, 3.2, 7.0];
    Array2::from_shape_fn((5, 5), |(i, j)| (points[i] - points[j]).abs())
}

fn names() -> Vec<String> {
    ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_lines_svg_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/lines.svg");
    let y = array![[0.0, 2.0], [1.0, 1.0], [3.0, 0.5]];
    let figure = LinesFigure {
        x: None,
        y: y.view(),
        options: LinesOptions::default(),
    };

    let plot = render_to_file(&path, DEFAULT_SIZE, &figure).unwrap();
    assert_eq!(plot.lines.len(), 2);
    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("<polyline"));
}

#[test]
fn test_clustered_matrix_with_tree() {
    let dir = TempDir::new().unwrap();
    let m = distances();
    let tree = calc_tree(&names(), m.view(), "upgma").unwrap();
    let sorted = cluster_matrix(MatrixInput::distance(m.view()), &ClusterOptions::default())
        .unwrap();

    let figure = MatrixFigure {
        matrix: sorted.matrix.view(),
        x_array: None,
        side: SidePanel::Tree(&tree),
        options: MatrixOptions {
            ticklabels: Some(names()),
            allticks: true,
            ..Default::default()
        },
    };
    let path = dir.path().join("matrix.svg");
    let plot = render_to_file(&path, (600, 600), &figure).unwrap();
    assert_eq!(plot.image.shape, (5, 5));
    assert_eq!(plot.tree.map(|t| t.terminals), Some(5));
    assert!(path.exists());
}

#[test]
fn test_dendrogram_and_tree_files() {
    let dir = TempDir::new().unwrap();
    let m = distances();
    let options = ClusterOptions {
        labels: Some(names()),
        return_linkage: true,
        ..Default::default()
    };
    let sorted = cluster_matrix(MatrixInput::distance(m.view()), &options).unwrap();
    let linkage = sorted.linkage.unwrap();
    let dendrogram = Dendrogram::from_linkage(&linkage, Some(names().as_slice())).unwrap();

    let plot = render_to_file(
        &dir.path().join("dendrogram.svg"),
        DEFAULT_SIZE,
        &DendrogramFigure {
            dendrogram: &dendrogram,
            options: DendrogramOptions::default(),
        },
    )
    .unwrap();
    assert_eq!(plot.links, 4);
    assert_eq!(plot.leaves, sorted.labels.unwrap());

    let tree = calc_tree(&names(), m.view(), "nj").unwrap();
    let plot = render_to_file(
        &dir.path().join("tree.svg"),
        DEFAULT_SIZE,
        &TreeFigure {
            tree: &tree,
            options: TreeOptions::default(),
        },
    )
    .unwrap();
    assert_eq!(plot.terminals, 5);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let y = array![[0.0], [1.0]];
    let figure = LinesFigure {
        x: None,
        y: y.view(),
        options: LinesOptions::default(),
    };
    let result = render_to_file(&dir.path().join("lines.jpg"), DEFAULT_SIZE, &figure);
    assert!(matches!(result, Err(PlotError::UnsupportedFormat { .. })));
}

#[cfg(not(feature = "png"))]
#[test]
fn test_png_needs_feature() {
    let dir = TempDir::new().unwrap();
    let y = array![[0.0], [1.0]];
    let figure = LinesFigure {
        x: None,
        y: y.view(),
        options: LinesOptions::default(),
    };
    assert!(!ExportFormat::Png.is_available());
    assert_eq!(
        render_to_file(&dir.path().join("lines.png"), DEFAULT_SIZE, &figure),
        Err(PlotError::BackendUnavailable {
            format: "PNG",
            feature: "png",
        })
    );
}

#[cfg(feature = "png")]
#[test]
fn test_png_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lines.png");
    let y = array![[0.0], [1.0]];
    let figure = LinesFigure {
        x: None,
        y: y.view(),
        options: LinesOptions::default(),
    };
    render_to_file(&path, (200, 100), &figure).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}
