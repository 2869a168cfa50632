pub mod database;
pub mod report_engine;
pub mod report_writer;
pub mod reports;

pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
pub use database::Database;
pub use report_engine::{ReportEngine, WeeklyRun};
pub use report_writer::{ReportFile, ReportWriter};
