use crate::core::database::Database;
use crate::core::report_writer::{ReportFile, ReportWriter};
use crate::core::reports::{
    build_member_reports, build_provider_reports, build_summary_report, directory_listing,
    ReportTables, ReportWindow,
};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::Result;
use chrono::NaiveDate;

/// Everything one weekly run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyRun {
    pub member_reports: Vec<ReportFile>,
    pub provider_reports: Vec<ReportFile>,
    pub summary: Option<ReportFile>,
    pub archive: Option<ReportFile>,
}

impl WeeklyRun {
    pub fn is_empty(&self) -> bool {
        self.member_reports.is_empty() && self.provider_reports.is_empty() && self.summary.is_none()
    }

    pub fn files(&self) -> impl Iterator<Item = &ReportFile> {
        self.member_reports
            .iter()
            .chain(self.provider_reports.iter())
            .chain(self.summary.iter())
    }
}

/// Reads the record tables and writes the weekly reports.
pub struct ReportEngine<S: Storage> {
    database: Database<S>,
    writer: ReportWriter<S>,
    window_days: u32,
    archive: bool,
}

impl<S: Storage> ReportEngine<S> {
    pub fn new(database: Database<S>, writer: ReportWriter<S>) -> Self {
        Self {
            database,
            writer,
            window_days: 7,
            archive: false,
        }
    }

    pub fn from_config<C: ConfigProvider>(
        config: &C,
        database: Database<S>,
        writer: ReportWriter<S>,
    ) -> Self {
        Self::new(database, writer)
            .with_window_days(config.window_days())
            .with_archive(config.archive_reports())
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    pub fn with_archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn window(&self, today: NaiveDate) -> ReportWindow {
        ReportWindow::ending_on(today, self.window_days)
    }

    async fn load_tables(&self) -> Result<ReportTables> {
        Ok(ReportTables {
            members: self.database.load_all().await?,
            users: self.database.load_all().await?,
            services: self.database.load_all().await?,
            service_log: self.database.load_all().await?,
        })
    }

    pub async fn generate_member_reports(&self, today: NaiveDate) -> Result<Vec<ReportFile>> {
        let tables = self.load_tables().await?;
        self.write_member_reports(&tables, today).await
    }

    pub async fn generate_provider_reports(&self, today: NaiveDate) -> Result<Vec<ReportFile>> {
        let tables = self.load_tables().await?;
        self.write_provider_reports(&tables, today).await
    }

    /// `None` when nobody billed inside the window.
    pub async fn generate_summary_report(&self, today: NaiveDate) -> Result<Option<ReportFile>> {
        let tables = self.load_tables().await?;
        self.write_summary_report(&tables, today).await
    }

    pub async fn export_provider_directory(&self) -> Result<ReportFile> {
        let services = self.database.load_all().await?;
        let listing = directory_listing(&services);
        if listing.is_empty() {
            tracing::warn!("Provider directory is empty");
        }
        let file = self.writer.write_provider_directory(&listing).await?;
        tracing::info!("Exported {} services to {}", listing.len(), file.location);
        Ok(file)
    }

    /// Writes every weekly report from a single read of the tables.
    pub async fn run(&self, today: NaiveDate) -> Result<WeeklyRun> {
        let window = self.window(today);
        tracing::info!(
            "Generating weekly reports for {} to {}",
            window.first(),
            window.last()
        );

        let tables = self.load_tables().await?;
        tracing::debug!("Loaded {} service log entries", tables.service_log.len());

        let mut run = WeeklyRun {
            member_reports: self.write_member_reports(&tables, today).await?,
            provider_reports: self.write_provider_reports(&tables, today).await?,
            summary: self.write_summary_report(&tables, today).await?,
            archive: None,
        };

        if self.archive && !run.is_empty() {
            let files: Vec<ReportFile> = run.files().cloned().collect();
            let archive = self.writer.write_archive(&files, today).await?;
            tracing::info!("Archived {} reports to {}", files.len(), archive.location);
            run.archive = Some(archive);
        }

        tracing::info!(
            "Wrote {} member and {} provider reports",
            run.member_reports.len(),
            run.provider_reports.len()
        );
        Ok(run)
    }

    async fn write_member_reports(
        &self,
        tables: &ReportTables,
        today: NaiveDate,
    ) -> Result<Vec<ReportFile>> {
        let reports = build_member_reports(tables, &self.window(today));
        let mut files = Vec::with_capacity(reports.len());
        for report in &reports {
            files.push(self.writer.write_member_report(report, today).await?);
        }
        Ok(files)
    }

    async fn write_provider_reports(
        &self,
        tables: &ReportTables,
        today: NaiveDate,
    ) -> Result<Vec<ReportFile>> {
        let reports = build_provider_reports(tables, &self.window(today));
        let mut files = Vec::with_capacity(reports.len());
        for report in &reports {
            files.push(self.writer.write_provider_report(report, today).await?);
        }
        Ok(files)
    }

    async fn write_summary_report(
        &self,
        tables: &ReportTables,
        today: NaiveDate,
    ) -> Result<Option<ReportFile>> {
        let providers = build_provider_reports(tables, &self.window(today));
        if providers.is_empty() {
            return Ok(None);
        }
        let summary = build_summary_report(&providers);
        Ok(Some(self.writer.write_summary_report(&summary, today).await?))
    }
}
