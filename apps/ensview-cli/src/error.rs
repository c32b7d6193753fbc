//! Error type for the ensview command line

use ensview_cluster::ClusterError;
use ensview_io::IoError;
use ensview_plot::PlotError;
use ensview_tree::TreeError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not read configuration {0}")]
    ConfigRead(String),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Plot(#[from] PlotError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error("Failed to write output: {0}")]
    Output(String),

    #[error("{0}")]
    Usage(String),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            CliError::Config(_) | CliError::ConfigRead(_) => 3,
            CliError::Io(_) | CliError::Output(_) => 4,
            CliError::Tree(_) | CliError::Cluster(_) | CliError::Plot(_) => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
