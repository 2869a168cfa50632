use super::LogFormat;
use crate::utils::error::{ChocAnError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File read when no `--config` is given. Its absence is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "chocan.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub storage: StorageConfig,
    pub reports: ReportsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./storage".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    pub output_dir: String,
    pub window_days: u32,
    pub archive: bool,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            output_dir: "./reports".to_string(),
            window_days: 7,
            archive: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// An explicit path must exist; otherwise the default file is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ChocAnError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ChocAnError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[storage]
data_dir = "/var/lib/chocan"

[reports]
output_dir = "/var/lib/chocan/reports"
window_days = 14
archive = true

[logging]
format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.storage.data_dir, "/var/lib/chocan");
        assert_eq!(config.reports.window_days, 14);
        assert!(config.reports.archive);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = TomlConfig::from_toml_str("[reports]\narchive = true\n").unwrap();
        assert_eq!(config.storage.data_dir, "./storage");
        assert_eq!(config.reports.window_days, 7);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CHOCAN_TEST_DATA_DIR", "/tmp/chocan-data");

        let toml_content = r#"
[storage]
data_dir = "${CHOCAN_TEST_DATA_DIR}"

[reports]
output_dir = "${CHOCAN_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/chocan-data");
        assert_eq!(config.reports.output_dir, "${CHOCAN_TEST_UNSET_VAR}");

        std::env::remove_var("CHOCAN_TEST_DATA_DIR");
    }

    #[test]
    fn test_file_values_are_validated_after_merge() {
        let config = TomlConfig::from_toml_str("[reports]\nwindow_days = 0\n").unwrap();
        assert!(matches!(
            AppConfig::from(config).validate(),
            Err(ChocAnError::InvalidValue { .. })
        ));

        let config = TomlConfig::from_toml_str("[storage]\ndata_dir = \"\"\n").unwrap();
        assert!(AppConfig::from(config).validate().is_err());
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let err = TomlConfig::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ChocAnError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[storage]\ndata_dir = \"./file-test\"\n")
            .unwrap();

        let config = TomlConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.storage.data_dir, "./file-test");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = TomlConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ChocAnError::IoError(_)));
    }
}
