//! Dashboard configuration (TOML).
//!
//! ```toml
//! [data]
//! path = "IFA.csv"
//!
//! [filter]
//! symbols = ["AAPL", "MSFT"]
//! start = "2021-01-01"
//! end = "2021-12-31"
//!
//! [moving_average]
//! enabled = true
//! window = 20
//! ```
//!
//! Every section is optional. Missing filter values fall back to the
//! dataset: first symbol, full date range.

use crate::domain::{Dataset, FilterCriteria};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bounds for a configured moving-average window.
pub const MIN_MA_WINDOW: usize = 5;
pub const MAX_MA_WINDOW: usize = 50;
pub const DEFAULT_MA_WINDOW: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub filter: FilterConfig,
    pub moving_average: MovingAverageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV path; relative paths resolve against the config file's directory.
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("IFA.csv"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub symbols: Option<Vec<String>>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingAverageConfig {
    pub enabled: bool,
    pub window: usize,
}

impl Default for MovingAverageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window: DEFAULT_MA_WINDOW,
        }
    }
}

impl DashboardConfig {
    /// Load and validate a config file. A relative data path is resolved
    /// against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if config.data.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.data.path = dir.join(&config.data.path);
            }
        }
        Ok(config)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = self.moving_average.window;
        if !(MIN_MA_WINDOW..=MAX_MA_WINDOW).contains(&window) {
            return Err(ConfigError::Invalid(format!(
                "moving_average.window must be in {MIN_MA_WINDOW}..={MAX_MA_WINDOW}, got {window}"
            )));
        }
        Ok(())
    }

    /// Window to apply, or `None` when the moving average is disabled.
    pub fn ma_window(&self) -> Option<usize> {
        self.moving_average
            .enabled
            .then_some(self.moving_average.window)
    }

    /// Concrete criteria for `dataset`, with unset values taken from its
    /// default selection. `None` only when the dataset is empty and nothing
    /// was configured to fall back on.
    pub fn resolve_criteria(&self, dataset: &Dataset) -> Option<FilterCriteria> {
        let defaults = dataset.default_criteria();
        let symbols = match &self.filter.symbols {
            Some(symbols) => symbols.iter().cloned().collect(),
            None => defaults.as_ref()?.symbols.clone(),
        };
        let start = match self.filter.start {
            Some(start) => start,
            None => defaults.as_ref()?.start,
        };
        let end = match self.filter.end {
            Some(end) => end,
            None => defaults.as_ref()?.end,
        };
        Some(FilterCriteria {
            symbols,
            start,
            end,
        })
    }
}
