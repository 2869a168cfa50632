pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(test)]
mod testing;

pub use adapters::{LocalStorage, ScriptedTerminal, StdTerminal};
pub use app::App;
pub use config::AppConfig;
pub use crate::core::{Database, ReportEngine, ReportWriter};
pub use utils::error::{ChocAnError, Result};
