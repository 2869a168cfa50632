use super::toml_config::TomlConfig;
use super::AppConfig;
use crate::domain::model::DATE_FMT;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "chocan")]
#[command(about = "ChocAn data center terminal simulator")]
pub struct Cli {
    /// Configuration file (defaults to ./chocan.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the record tables
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Directory reports are written to
    #[arg(long, global = true)]
    pub report_dir: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Interactive provider or manager session (default)
    Login,
    /// Add the rows of a CSV file to a table
    Import {
        /// members, users, provider_directory or service_log
        table: String,
        csv: PathBuf,
    },
    /// Write the weekly member, provider and summary reports
    Reports {
        /// Last day of the report window, MM-DD-YYYY (defaults to today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Also bundle the reports into a zip archive
        #[arg(long)]
        archive: bool,
    },
    /// Export the provider directory
    Directory,
}

fn parse_date(text: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, DATE_FMT).map_err(|_| format!("{} is not in MM-DD-YYYY format", text))
}

impl Cli {
    /// Reads the config file and applies command-line overrides on top.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::from(TomlConfig::load(self.config.as_deref())?);

        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(report_dir) = &self.report_dir {
            config.report_dir = report_dir.clone();
        }
        if let Some(Command::Reports { archive: true, .. }) = &self.command {
            config.archive = true;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Login)
    }
}
