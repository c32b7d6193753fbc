//! Subcommand implementations
//!
//! Results go to `out` as JSON (Newick text for trees); figures and matrices
//! are written to the files named on the command line.

use std::fs;
use std::io::Write;
use std::path::Path;

use ensview_cluster::{cluster_matrix, ClusterOptions, Dendrogram, MatrixInput};
use ensview_io::{
    read_columns_csv, read_matrix_csv, read_newick, write_matrix_csv, write_newick,
    LabeledMatrix,
};
use ensview_plot::{
    render_to_file, DendrogramFigure, DendrogramOptions, ExportFormat, LinesFigure,
    LinesOptions, MatrixFigure, MatrixOptions, Origin, SidePanel, TreeFigure, TreeOptions,
};
use ensview_tree::{calc_tree, find_subgroups, reorder_matrix};
use ndarray::{Array1, Axis};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::cli::{
    ClusterArgs, Commands, ConfigAction, LinesArgs, MatrixArgs, MatrixInputArgs, ReorderArgs,
    SubgroupsArgs, TreeArgs,
};
use crate::config::EnsviewConfig;
use crate::error::{CliError, CliResult};

/// Run one subcommand
pub fn run(
    command: Commands,
    config: &EnsviewConfig,
    config_path: Option<&Path>,
    out: &mut dyn Write,
) -> CliResult<()> {
    match command {
        Commands::Tree(args) => tree(args, config, out),
        Commands::Cluster(args) => cluster(args, config, out),
        Commands::Reorder(args) => reorder(args, out),
        Commands::Subgroups(args) => subgroups(args, config, out),
        Commands::Matrix(args) => matrix(args, config, out),
        Commands::Lines(args) => lines(args, config, out),
        Commands::Config { action } => config_action(action, config, config_path, out),
    }
}

fn print_json<T: Serialize>(out: &mut dyn Write, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Figure handles printed after writing a figure file
#[derive(Serialize)]
struct Rendered<'a, T> {
    path: &'a Path,
    format: ExportFormat,
    mime_type: &'static str,
    #[serde(flatten)]
    plot: T,
}

fn print_rendered<T: Serialize>(out: &mut dyn Write, path: &Path, plot: T) -> CliResult<()> {
    let format = ExportFormat::from_path(path)?;
    print_json(
        out,
        &Rendered {
            path,
            format,
            mime_type: format.mime_type(),
            plot,
        },
    )
}

fn read_input(input: &MatrixInputArgs) -> CliResult<LabeledMatrix> {
    Ok(read_matrix_csv(&input.matrix, !input.no_header)?)
}

/// First column of a headed CSV file
fn read_curve(path: &Path) -> CliResult<Vec<f64>> {
    let (_, data) = read_columns_csv(path)?;
    Ok(data.column(0).to_vec())
}

fn tree(args: TreeArgs, config: &EnsviewConfig, out: &mut dyn Write) -> CliResult<()> {
    let data = read_input(&args.input)?;
    let method = args.method.unwrap_or(config.tree.method);
    let tree = calc_tree(&data.labels_or_indices(), data.matrix.view(), method.as_str())?;
    info!(
        method = method.as_str(),
        terminals = data.matrix.nrows(),
        "built tree"
    );

    if let Some(path) = &args.plot {
        let figure = TreeFigure {
            tree: &tree,
            options: TreeOptions::default(),
        };
        render_to_file(path, config.size(), &figure)?;
    }
    match &args.output {
        Some(path) => write_newick(path, &tree)?,
        None => writeln!(out, "{}", tree.to_newick())?,
    }
    Ok(())
}

fn cluster(args: ClusterArgs, config: &EnsviewConfig, out: &mut dyn Write) -> CliResult<()> {
    let data = read_input(&args.input)?;
    let input = if args.similarity {
        MatrixInput::similarity(data.matrix.view())
    } else {
        MatrixInput::distance(data.matrix.view())
    };
    let draw = args.plot.is_some() && !(args.no_plot || config.cluster.no_plot);
    let options = ClusterOptions {
        labels: data.labels.clone(),
        method: args.method.unwrap_or(config.cluster.method),
        reversed: args.reversed || config.cluster.reversed,
        optimal_ordering: args.optimal_ordering || config.cluster.optimal_ordering,
        return_linkage: args.linkage || draw,
    };
    let mut result = cluster_matrix(input, &options)?;

    if let Some(path) = &args.output {
        let sorted = LabeledMatrix {
            labels: result.labels.clone(),
            matrix: result.matrix.clone(),
        };
        write_matrix_csv(path, &sorted)?;
    }
    if let (true, Some(path), Some(linkage)) = (draw, &args.plot, &result.linkage) {
        let dendrogram = Dendrogram::from_linkage(linkage, data.labels.as_deref())?;
        let figure = DendrogramFigure {
            dendrogram: &dendrogram,
            options: DendrogramOptions {
                orientation: args.orientation.into(),
                ..Default::default()
            },
        };
        render_to_file(path, config.size(), &figure)?;
    }

    if !args.linkage {
        result.linkage = None;
    }
    print_json(out, &result)
}

fn reorder(args: ReorderArgs, out: &mut dyn Write) -> CliResult<()> {
    let data = read_input(&args.input)?;
    let tree = read_newick(&args.tree)?;
    let (matrix, indices) = reorder_matrix(data.matrix.view(), &tree, data.labels.as_deref())?;
    let labels = data
        .labels
        .as_ref()
        .map(|labels| indices.iter().map(|&i| labels[i].clone()).collect::<Vec<_>>());

    if let Some(path) = &args.output {
        write_matrix_csv(
            path,
            &LabeledMatrix {
                labels: labels.clone(),
                matrix,
            },
        )?;
    }
    print_json(out, &json!({ "indices": indices, "labels": labels }))
}

fn subgroups(args: SubgroupsArgs, config: &EnsviewConfig, out: &mut dyn Write) -> CliResult<()> {
    let tree = read_newick(&args.tree)?;
    let cutoff = args.cutoff.unwrap_or(config.tree.subgroup_cutoff);
    let groups = find_subgroups(&tree, cutoff)?;
    info!(cutoff, groups = groups.len(), "split tree");
    print_json(out, &groups)
}

fn matrix(args: MatrixArgs, config: &EnsviewConfig, out: &mut dyn Write) -> CliResult<()> {
    let data = read_input(&args.input)?;
    let top = args.top.as_deref().map(read_curve).transpose()?;
    let side_curve = args.side.as_deref().map(read_curve).transpose()?;
    let tree = args.tree.as_deref().map(read_newick).transpose()?;

    let side = match (&side_curve, &tree) {
        (_, Some(tree)) => SidePanel::Tree(tree),
        (Some(curve), None) => SidePanel::Curve(curve),
        (None, None) => SidePanel::None,
    };
    let figure = MatrixFigure {
        matrix: data.matrix.view(),
        x_array: top.as_deref(),
        side,
        options: MatrixOptions {
            percentile: args.percentile.or(config.plot.percentile),
            ratio: args.ratio.unwrap_or(config.plot.ratio),
            ticklabels: data.labels.clone(),
            allticks: args.allticks,
            origin: if args.upper {
                Origin::Upper
            } else {
                Origin::Lower
            },
            colorbar: config.plot.colorbar && !args.no_colorbar,
            cmap: args.cmap.unwrap_or_else(|| config.plot.cmap.clone()),
            show_axes: true,
        },
    };
    let plot = render_to_file(&args.output, config.size(), &figure)?;
    print_rendered(out, &args.output, plot)
}

fn lines(args: LinesArgs, config: &EnsviewConfig, out: &mut dyn Write) -> CliResult<()> {
    let (headers, data) = read_columns_csv(&args.data)?;
    let x_index = match &args.x {
        Some(name) => Some(
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CliError::Usage(format!("no column named '{name}'")))?,
        ),
        None => None,
    };
    let columns: Vec<usize> = (0..headers.len()).filter(|&i| Some(i) != x_index).collect();
    if columns.is_empty() {
        return Err(CliError::Usage("no columns left to plot".to_string()));
    }
    let x: Option<Array1<f64>> = x_index.map(|i| data.column(i).to_owned());
    let y = data.select(Axis(1), &columns);
    let band = match &args.band {
        Some(path) => Some(read_columns_csv(path)?.1.into_dyn()),
        None => None,
    };

    let figure = LinesFigure {
        x: x.as_ref().and_then(|x| x.as_slice()),
        y: y.view(),
        options: LinesOptions {
            dy: band.as_ref().map(|b| b.view()),
            alpha: args.alpha,
            gap: args.gap,
            x_label: args.x.clone(),
            ..Default::default()
        },
    };
    let plot = render_to_file(&args.output, config.size(), &figure)?;
    print_rendered(out, &args.output, plot)
}

fn config_action(
    action: ConfigAction,
    config: &EnsviewConfig,
    config_path: Option<&Path>,
    out: &mut dyn Write,
) -> CliResult<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .or_else(EnsviewConfig::default_path);
    match action {
        ConfigAction::Show => write!(out, "{}", config.to_toml()?)?,
        ConfigAction::Path => match &path {
            Some(path) => writeln!(out, "{}", path.display())?,
            None => return Err(CliError::Usage("no configuration directory".to_string())),
        },
        ConfigAction::Init { force } => {
            let path =
                path.ok_or_else(|| CliError::Usage("no configuration directory".to_string()))?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} exists, use --force to overwrite",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, EnsviewConfig::default().to_toml()?)?;
            writeln!(out, "{}", path.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use rstest::rstest;
    use tempfile::TempDir;

    const DISTANCES: &str = ",a,b,c,d\n\
                             a,0,0.1,0.9,1.0\n\
                             b,0.1,0,0.8,0.9\n\
                             c,0.9,0.8,0,0.2\n\
                             d,1.0,0.9,0.2,0\n";

    fn run_args(args: &[&str]) -> CliResult<String> {
        let cli = Cli::try_parse_from(args).map_err(|e| CliError::Usage(e.to_string()))?;
        let mut out = Vec::new();
        run(
            cli.command,
            &EnsviewConfig::default(),
            cli.config.as_deref(),
            &mut out,
        )?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn fixture() -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("d.csv");
        fs::write(&path, DISTANCES).unwrap();
        let path = path.display().to_string();
        (dir, path)
    }

    #[test]
    fn test_tree_prints_newick() {
        let (_dir, matrix) = fixture();
        let newick = run_args(&["ensview", "tree", &matrix, "-m", "upgma"]).unwrap();
        assert!(newick.trim_end().ends_with(';'));
        for name in ["a", "b", "c", "d"] {
            assert!(newick.contains(name));
        }
    }

    #[test]
    fn test_cluster_outputs() {
        let (dir, matrix) = fixture();
        let sorted = dir.path().join("sorted.csv");
        let plot = dir.path().join("dendrogram.svg");
        let text = run_args(&[
            "ensview",
            "cluster",
            &matrix,
            "--linkage",
            "-o",
            sorted.to_str().unwrap(),
            "--plot",
            plot.to_str().unwrap(),
        ])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["indices"].as_array().unwrap().len(), 4);
        assert_eq!(value["linkage"]["steps"].as_array().unwrap().len(), 3);
        assert!(sorted.exists());
        assert!(plot.exists());
    }

    #[test]
    fn test_cluster_optimal_ordering() {
        let (_dir, matrix) = fixture();
        let text = run_args(&["ensview", "cluster", &matrix, "--optimal-ordering", "--linkage"])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["indices"], json!([0, 1, 2, 3]));
        assert_eq!(value["labels"], json!(["a", "b", "c", "d"]));
        assert_eq!(value["linkage"]["steps"][2]["distance"], json!(0.8));
    }

    #[test]
    fn test_cluster_no_plot() {
        let (dir, matrix) = fixture();
        let plot = dir.path().join("dendrogram.svg");
        let text = run_args(&[
            "ensview",
            "cluster",
            &matrix,
            "--plot",
            plot.to_str().unwrap(),
            "--no-plot",
        ])
        .unwrap();
        assert!(!plot.exists());
        assert!(!text.contains("linkage"));
    }

    #[test]
    fn test_reorder_and_subgroups() {
        let (dir, matrix) = fixture();
        let tree = dir.path().join("t.nwk");
        fs::write(&tree, "((d:0.1,c:0.1):0.5,(b:0.05,a:0.05):0.5);").unwrap();
        let text = run_args(&["ensview", "reorder", &matrix, "-t", tree.to_str().unwrap()])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["indices"], json!([3, 2, 1, 0]));
        assert_eq!(value["labels"], json!(["d", "c", "b", "a"]));

        let text = run_args(&["ensview", "subgroups", tree.to_str().unwrap()]).unwrap();
        let groups: Vec<Vec<String>> = serde_json::from_str(&text).unwrap();
        assert_eq!(groups, vec![vec!["d", "c"], vec!["b", "a"]]);
    }

    #[rstest]
    #[case(&[])]
    #[case(&["--upper", "--allticks", "--no-colorbar"])]
    #[case(&["-p", "5", "--cmap", "viridis_r"])]
    fn test_matrix_figure(#[case] extra: &[&str]) {
        let (dir, matrix) = fixture();
        let figure = dir.path().join("m.svg");
        let mut args = vec![
            "ensview",
            "matrix",
            matrix.as_str(),
            "-o",
            figure.to_str().unwrap(),
        ];
        args.extend_from_slice(extra);
        let text = run_args(&args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["image"]["shape"], json!([4, 4]));
        assert_eq!(value["format"], "svg");
        assert_eq!(value["mime_type"], "image/svg+xml");
        assert!(figure.exists());
    }

    #[test]
    fn test_lines_figure() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("rmsf.csv");
        fs::write(&data, "residue,mode1,mode2\n1,0.1,0.3\n2,0.4,0.2\n5,0.2,0.1\n").unwrap();
        let band = dir.path().join("band.csv");
        fs::write(&band, "err\n0.01\n0.02\n0.01\n").unwrap();
        let figure = dir.path().join("lines.svg");

        let text = run_args(&[
            "ensview",
            "lines",
            data.to_str().unwrap(),
            "-o",
            figure.to_str().unwrap(),
            "-x",
            "residue",
            "--band",
            band.to_str().unwrap(),
            "--gap",
        ])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["lines"].as_array().unwrap().len(), 2);
        assert_eq!(value["lines"][0]["segments"], json!(2));
        assert_eq!(value["mime_type"], "image/svg+xml");
        assert_eq!(value["path"], figure.display().to_string());

        let missing = run_args(&[
            "ensview",
            "lines",
            data.to_str().unwrap(),
            "-o",
            figure.to_str().unwrap(),
            "-x",
            "time",
        ]);
        assert!(matches!(missing, Err(CliError::Usage(_))));
    }

    #[test]
    fn test_config_init_and_show() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ensview/config.toml");
        let path_str = path.to_str().unwrap();
        run_args(&["ensview", "-c", path_str, "config", "init"]).unwrap();
        assert!(path.exists());
        assert!(matches!(
            run_args(&["ensview", "-c", path_str, "config", "init"]),
            Err(CliError::Usage(_))
        ));

        let shown = run_args(&["ensview", "config", "show"]).unwrap();
        assert!(shown.contains("[plot]"));
        assert!(shown.contains("cmap = \"jet\""));
    }
}
