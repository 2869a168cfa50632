//! Interactive terminal sessions for providers and managers.

pub mod import;
pub mod login;
pub mod manager;
pub mod provider;
pub mod user_io;

use crate::core::{Database, ReportEngine};
use crate::domain::ports::Storage;
use chrono::{DateTime, Local, NaiveDate, Utc};

pub use login::{generate_secure_password, verify_password};

/// Shared state for one terminal session.
pub struct App<S: Storage> {
    database: Database<S>,
    reports: ReportEngine<S>,
    clock: fn() -> DateTime<Utc>,
}

impl<S: Storage> App<S> {
    pub fn new(database: Database<S>, reports: ReportEngine<S>) -> Self {
        Self {
            database,
            reports,
            clock: Utc::now,
        }
    }

    /// Replaces the wall clock, so sessions can be replayed at a fixed time.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn database(&self) -> &Database<S> {
        &self.database
    }

    pub fn reports(&self) -> &ReportEngine<S> {
        &self.reports
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// The local calendar date, used for service dates and report windows.
    pub fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}
