//! Configuration for the ensview command line
//!
//! Defaults for tree construction, clustering and figure rendering. Read
//! from `--config` or `<config dir>/ensview/config.toml` when present.

use std::fs;
use std::path::{Path, PathBuf};

use ensview_cluster::LinkageMethod;
use ensview_plot::{Colormap, DEFAULT_MATRIX_CMAP, DEFAULT_RATIO, DEFAULT_SIZE};
use ensview_tree::{TreeMethod, DEFAULT_SUBGROUP_CUTOFF};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsviewConfig {
    pub tree: TreeConfig,
    pub cluster: ClusterConfig,
    pub plot: PlotConfig,
}

/// Tree construction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub method: TreeMethod,
    /// Distance above which neighbouring terminals start a new subgroup
    pub subgroup_cutoff: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            method: TreeMethod::default(),
            subgroup_cutoff: DEFAULT_SUBGROUP_CUTOFF,
        }
    }
}

/// Matrix clustering settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub method: LinkageMethod,
    pub reversed: bool,
    pub optimal_ordering: bool,
    /// Skip the dendrogram figure even when a plot path is given
    pub no_plot: bool,
}

/// Figure settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub cmap: String,
    pub ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
    pub width: u32,
    pub height: u32,
    pub colorbar: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            cmap: DEFAULT_MATRIX_CMAP.to_string(),
            ratio: DEFAULT_RATIO,
            percentile: None,
            width: DEFAULT_SIZE.0,
            height: DEFAULT_SIZE.1,
            colorbar: true,
        }
    }
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),
    /// Name not recognized
    #[error("Unknown value: {0}")]
    Unknown(String),
}

impl EnsviewConfig {
    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tree.subgroup_cutoff.is_finite() || self.tree.subgroup_cutoff < 0.0 {
            return Err(ConfigError::OutOfRange(
                "tree.subgroup_cutoff must be a non-negative number".to_string(),
            ));
        }

        if self.plot.ratio.is_nan() || self.plot.ratio <= 0.0 {
            return Err(ConfigError::OutOfRange(
                "plot.ratio must be positive".to_string(),
            ));
        }

        if let Some(p) = self.plot.percentile {
            if !(0.0..=50.0).contains(&p) {
                return Err(ConfigError::OutOfRange(
                    "plot.percentile must be between 0 and 50".to_string(),
                ));
            }
        }

        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(ConfigError::OutOfRange(
                "plot.width and plot.height must be positive".to_string(),
            ));
        }

        if Colormap::by_name(&self.plot.cmap).is_err() {
            return Err(ConfigError::Unknown(format!(
                "plot.cmap '{}'",
                self.plot.cmap
            )));
        }

        Ok(())
    }

    /// Default location, `<config dir>/ensview/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ensview").join("config.toml"))
    }

    /// Read and validate the file at `path`
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CliError::ConfigRead(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&text)
            .map_err(|e| CliError::ConfigRead(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Configuration from an explicit path, else the default file if it exists
    pub fn resolve(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.plot.width, self.plot.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = EnsviewConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tree.subgroup_cutoff, 0.8);
        assert_eq!(config.plot.cmap, "jet");
        assert_eq!(config.size(), (800, 600));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = EnsviewConfig::default();
        config.cluster.method = LinkageMethod::Average;
        config.plot.percentile = Some(5.0);
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("method = \"average\""));
        assert_eq!(EnsviewConfig::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EnsviewConfig::from_toml("[tree]\nmethod = \"upgma\"\n").unwrap();
        assert_eq!(config.tree.method, TreeMethod::Upgma);
        assert_eq!(config.tree.subgroup_cutoff, DEFAULT_SUBGROUP_CUTOFF);
        assert_eq!(config.plot, PlotConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EnsviewConfig::default();
        config.plot.ratio = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));

        let mut config = EnsviewConfig::default();
        config.plot.cmap = "rainbow".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Unknown(_))));

        let mut config = EnsviewConfig::default();
        config.plot.percentile = Some(75.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[cluster]\nreversed = true\n").unwrap();
        let config = EnsviewConfig::resolve(Some(&path)).unwrap();
        assert!(config.cluster.reversed);

        fs::write(&path, "[plot]\nwidth = 0\n").unwrap();
        assert!(matches!(
            EnsviewConfig::load(&path),
            Err(CliError::Config(ConfigError::OutOfRange(_)))
        ));

        fs::write(&path, "not toml [").unwrap();
        assert!(matches!(
            EnsviewConfig::load(&path),
            Err(CliError::ConfigRead(_))
        ));
    }
}
