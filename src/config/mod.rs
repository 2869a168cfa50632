#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_range, Validate};
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
pub use cli::{Cli, Command};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Settings after the config file and command-line overrides are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: String,
    pub report_dir: String,
    pub window_days: u32,
    pub archive: bool,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from(TomlConfig::default())
    }
}

impl From<TomlConfig> for AppConfig {
    fn from(file: TomlConfig) -> Self {
        Self {
            data_dir: file.storage.data_dir,
            report_dir: file.reports.output_dir,
            window_days: file.reports.window_days,
            archive: file.reports.archive,
            log_format: file.logging.format,
        }
    }
}

impl ConfigProvider for AppConfig {
    fn data_dir(&self) -> &str {
        &self.data_dir
    }

    fn report_dir(&self) -> &str {
        &self.report_dir
    }

    fn window_days(&self) -> u32 {
        self.window_days
    }

    fn archive_reports(&self) -> bool {
        self.archive
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_path("data_dir", &self.data_dir)?;
        validate_path("report_dir", &self.report_dir)?;
        validate_range("window_days", self.window_days, 1, 31)
    }
}
