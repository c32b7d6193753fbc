//! Command line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ensview_cluster::LinkageMethod;
use ensview_plot::Orientation;
use ensview_tree::TreeMethod;

#[derive(Parser, Debug)]
#[command(
    name = "ensview",
    version,
    about = "Trees, clustering and figures from pairwise distance matrices",
    long_about = "ensview builds neighbor-joining or UPGMA trees from distance matrices, \
                  sorts matrices by hierarchical clustering or tree order, splits trees \
                  into subgroups and draws heat maps and line plots as SVG or PNG."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to <config dir>/ensview/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a tree from a distance matrix and print it as Newick
    Tree(TreeArgs),

    /// Sort a distance or similarity matrix by hierarchical clustering
    Cluster(ClusterArgs),

    /// Reorder a matrix into the terminal order of a tree
    Reorder(ReorderArgs),

    /// Split a tree's terminals into groups of close neighbours
    Subgroups(SubgroupsArgs),

    /// Draw a matrix heat map
    Matrix(MatrixArgs),

    /// Draw columns of a CSV file as lines
    Lines(LinesArgs),

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Matrix CSV input shared by several commands
#[derive(Args, Debug, Clone)]
pub struct MatrixInputArgs {
    /// CSV file holding the matrix
    #[arg(value_name = "MATRIX")]
    pub matrix: PathBuf,

    /// The file has no header row
    #[arg(long)]
    pub no_header: bool,
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub input: MatrixInputArgs,

    /// Construction method: nj or upgma
    #[arg(short, long)]
    pub method: Option<TreeMethod>,

    /// Write the tree to this Newick file instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Draw the tree to an SVG or PNG file
    #[arg(long, value_name = "FILE")]
    pub plot: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ClusterArgs {
    #[command(flatten)]
    pub input: MatrixInputArgs,

    /// Treat the matrix as similarities (clustered as 1 - S)
    #[arg(long)]
    pub similarity: bool,

    /// Linkage method
    #[arg(short, long)]
    pub method: Option<LinkageMethod>,

    /// Reverse the resulting order
    #[arg(short, long)]
    pub reversed: bool,

    /// Flip merges so neighbouring rows are as close as possible
    #[arg(long)]
    pub optimal_ordering: bool,

    /// Include the linkage in the printed result
    #[arg(long)]
    pub linkage: bool,

    /// Write the sorted matrix to this CSV file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Draw the dendrogram to an SVG or PNG file
    #[arg(long, value_name = "FILE")]
    pub plot: Option<PathBuf>,

    /// Side the dendrogram root is drawn on
    #[arg(long, value_enum, default_value = "right")]
    pub orientation: OrientationArg,

    /// Do not draw the dendrogram even if --plot is given
    #[arg(long)]
    pub no_plot: bool,
}

#[derive(Args, Debug)]
pub struct ReorderArgs {
    #[command(flatten)]
    pub input: MatrixInputArgs,

    /// Newick file whose terminal names match the matrix labels
    #[arg(short, long, value_name = "FILE")]
    pub tree: PathBuf,

    /// Write the reordered matrix to this CSV file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SubgroupsArgs {
    /// Newick file
    #[arg(value_name = "TREE")]
    pub tree: PathBuf,

    /// Distance above which neighbouring terminals are split
    #[arg(long)]
    pub cutoff: Option<f64>,
}

#[derive(Args, Debug)]
pub struct MatrixArgs {
    #[command(flatten)]
    pub input: MatrixInputArgs,

    /// Output SVG or PNG file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// CSV whose first column is drawn above the matrix
    #[arg(long, value_name = "FILE")]
    pub top: Option<PathBuf>,

    /// CSV whose first column is drawn left of the matrix
    #[arg(long, value_name = "FILE", conflicts_with = "tree")]
    pub side: Option<PathBuf>,

    /// Newick tree drawn left of the matrix
    #[arg(long, value_name = "FILE")]
    pub tree: Option<PathBuf>,

    /// Clip colors to the p-th and (100 - p)-th percentiles
    #[arg(short, long)]
    pub percentile: Option<f64>,

    /// Size of the matrix relative to a side panel
    #[arg(long)]
    pub ratio: Option<f64>,

    /// Label every row and column
    #[arg(long)]
    pub allticks: bool,

    /// Draw the first row at the top
    #[arg(long)]
    pub upper: bool,

    /// Leave out the colorbar
    #[arg(long)]
    pub no_colorbar: bool,

    /// Colormap name, optionally with an _r suffix
    #[arg(long)]
    pub cmap: Option<String>,
}

#[derive(Args, Debug)]
pub struct LinesArgs {
    /// Headed CSV file; every column not used as x is a line
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Output SVG or PNG file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Column holding the x values
    #[arg(short, long)]
    pub x: Option<String>,

    /// Headed CSV of band half-widths, one column or one per line
    #[arg(long, value_name = "FILE")]
    pub band: Option<PathBuf>,

    /// Band opacity
    #[arg(long, default_value = "0.5")]
    pub alpha: f64,

    /// Break lines where x jumps by more than one
    #[arg(long)]
    pub gap: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the default configuration file location
    Path,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrientationArg {
    Top,
    Bottom,
    Left,
    Right,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Top => Orientation::Top,
            OrientationArg::Bottom => Orientation::Bottom,
            OrientationArg::Left => Orientation::Left,
            OrientationArg::Right => Orientation::Right,
        }
    }
}
