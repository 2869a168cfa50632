use crate::core::reports::{MemberReport, ProviderReport, SummaryReport};
use crate::domain::model::{Service, DATETIME_FMT, DATE_FMT};
use crate::domain::ports::Storage;
use crate::utils::error::{ChocAnError, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// A report that was written, by storage-relative path and by user-facing location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub path: String,
    pub location: String,
}

#[derive(Debug, Serialize)]
struct MemberRow<'a> {
    #[serde(rename = "Member Name")]
    member_name: &'a str,
    #[serde(rename = "Member Number")]
    member_id: u32,
    #[serde(rename = "Member Street Address")]
    address: &'a str,
    #[serde(rename = "Member City")]
    city: &'a str,
    #[serde(rename = "Member State")]
    state: &'a str,
    #[serde(rename = "Member Zip Code")]
    zipcode: &'a str,
    #[serde(rename = "Date of Service")]
    service_date: String,
    #[serde(rename = "Provider Name")]
    provider_name: &'a str,
    #[serde(rename = "Service Name")]
    service_name: &'a str,
}

#[derive(Debug, Serialize)]
struct ProviderRow<'a> {
    #[serde(rename = "Provider Name")]
    provider_name: &'a str,
    #[serde(rename = "Provider Number")]
    provider_id: u32,
    #[serde(rename = "Provider Street Address")]
    address: &'a str,
    #[serde(rename = "Provider City")]
    city: &'a str,
    #[serde(rename = "Provider State")]
    state: &'a str,
    #[serde(rename = "Provider Zip Code")]
    zipcode: &'a str,
    #[serde(rename = "Date of Service")]
    service_date: String,
    #[serde(rename = "Date and Time Data Were Received by the Computer")]
    received: String,
    #[serde(rename = "Member Name")]
    member_name: &'a str,
    #[serde(rename = "Member Number")]
    member_id: u32,
    #[serde(rename = "Service Code")]
    service_id: u32,
    #[serde(rename = "Fee to be paid")]
    fee: String,
    #[serde(rename = "Total number of consultations with members")]
    consultations: u32,
    #[serde(rename = "Total fee for the week")]
    total_fee: String,
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    #[serde(rename = "Provider Name")]
    provider_name: &'a str,
    // Holds the provider count on the total line.
    #[serde(rename = "Provider Number")]
    provider_id: String,
    #[serde(rename = "Number of Consultations")]
    consultations: u32,
    #[serde(rename = "Total Fee")]
    total_fee: String,
}

#[derive(Debug, Serialize)]
struct DirectoryRow<'a> {
    #[serde(rename = "Service Name")]
    service_name: &'a str,
    #[serde(rename = "Service Code")]
    service_id: u32,
    #[serde(rename = "Fee")]
    fee: String,
}

impl MemberRow<'_> {
    const HEADERS: [&'static str; 9] = [
        "Member Name",
        "Member Number",
        "Member Street Address",
        "Member City",
        "Member State",
        "Member Zip Code",
        "Date of Service",
        "Provider Name",
        "Service Name",
    ];
}

impl ProviderRow<'_> {
    const HEADERS: [&'static str; 14] = [
        "Provider Name",
        "Provider Number",
        "Provider Street Address",
        "Provider City",
        "Provider State",
        "Provider Zip Code",
        "Date of Service",
        "Date and Time Data Were Received by the Computer",
        "Member Name",
        "Member Number",
        "Service Code",
        "Fee to be paid",
        "Total number of consultations with members",
        "Total fee for the week",
    ];
}

impl SummaryRow<'_> {
    const HEADERS: [&'static str; 4] = [
        "Provider Name",
        "Provider Number",
        "Number of Consultations",
        "Total Fee",
    ];
}

impl DirectoryRow<'_> {
    const HEADERS: [&'static str; 3] = ["Service Name", "Service Code", "Fee"];
}

/// Serializes `rows` under their serde names. `headers` is written on its own
/// when there are no rows, since the csv writer only emits headers with the first record.
fn to_csv<R: Serialize>(headers: &[&str], rows: impl IntoIterator<Item = R>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut written = 0usize;
    for row in rows {
        writer.serialize(row)?;
        written += 1;
    }
    if written == 0 {
        writer.write_record(headers)?;
    }
    writer
        .into_inner()
        .map_err(|e| ChocAnError::IoError(e.into_error()))
}

/// Keeps a name usable as part of a file name.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn date_stamp(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

pub struct ReportWriter<S: Storage> {
    storage: S,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    async fn save(&self, path: String, data: &[u8]) -> Result<ReportFile> {
        self.storage.write_file(&path, data).await?;
        let location = self.storage.location(&path);
        tracing::debug!("Saved report {}", location);
        Ok(ReportFile { path, location })
    }

    pub async fn write_member_report(
        &self,
        report: &MemberReport,
        run_date: NaiveDate,
    ) -> Result<ReportFile> {
        let member = &report.member;
        let rows = report.services.iter().map(|line| MemberRow {
            member_name: &member.name,
            member_id: member.member_id,
            address: &member.address,
            city: &member.city,
            state: &member.state,
            zipcode: &member.zipcode,
            service_date: date_stamp(line.service_date),
            provider_name: &line.provider_name,
            service_name: &line.service_name,
        });
        let data = to_csv(&MemberRow::HEADERS, rows)?;

        let path = format!(
            "members/{}_{}_{}.csv",
            member.member_id,
            file_stem(&member.name),
            date_stamp(run_date)
        );
        self.save(path, &data).await
    }

    pub async fn write_provider_report(
        &self,
        report: &ProviderReport,
        run_date: NaiveDate,
    ) -> Result<ReportFile> {
        let provider = &report.provider;
        let total_fee = report.total_fee.to_string();
        let rows = report.services.iter().map(|line| ProviderRow {
            provider_name: &provider.name,
            provider_id: provider.id,
            address: &provider.address,
            city: &provider.city,
            state: &provider.state,
            zipcode: &provider.zipcode,
            service_date: date_stamp(line.service_date),
            received: line
                .received
                .with_timezone(&Local)
                .format(DATETIME_FMT)
                .to_string(),
            member_name: &line.member_name,
            member_id: line.member_id,
            service_id: line.service_id,
            fee: line.fee.to_string(),
            consultations: report.consultations,
            total_fee: total_fee.clone(),
        });
        let data = to_csv(&ProviderRow::HEADERS, rows)?;

        let path = format!(
            "providers/{}_{}_{}.csv",
            provider.id,
            file_stem(&provider.name),
            date_stamp(run_date)
        );
        self.save(path, &data).await
    }

    pub async fn write_summary_report(
        &self,
        report: &SummaryReport,
        run_date: NaiveDate,
    ) -> Result<ReportFile> {
        let mut rows: Vec<SummaryRow> = report
            .lines
            .iter()
            .map(|line| SummaryRow {
                provider_name: &line.provider_name,
                provider_id: line.provider_id.to_string(),
                consultations: line.consultations,
                total_fee: line.total_fee.to_string(),
            })
            .collect();
        rows.push(SummaryRow {
            provider_name: "Total",
            provider_id: report.provider_count.to_string(),
            consultations: report.total_consultations,
            total_fee: report.overall_fee.to_string(),
        });
        let data = to_csv(&SummaryRow::HEADERS, rows)?;

        self.save(format!("summary_{}.csv", date_stamp(run_date)), &data)
            .await
    }

    pub async fn write_provider_directory(&self, services: &[Service]) -> Result<ReportFile> {
        let rows = services.iter().map(|service| DirectoryRow {
            service_name: &service.service_name,
            service_id: service.service_id,
            fee: service.fee().to_string(),
        });
        let data = to_csv(&DirectoryRow::HEADERS, rows)?;

        self.save("provider_directory.csv".to_string(), &data).await
    }

    /// Bundles already-written reports into one zip, keeping their relative paths.
    pub async fn write_archive(
        &self,
        files: &[ReportFile],
        run_date: NaiveDate,
    ) -> Result<ReportFile> {
        tracing::debug!("Creating ZIP file with {} files", files.len());

        let mut contents = Vec::with_capacity(files.len());
        for file in files {
            contents.push((file.path.as_str(), self.storage.read_file(&file.path).await?));
        }

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &contents {
                zip.start_file::<_, ()>(*name, FileOptions::default())?;
                zip.write_all(data)?;
            }
            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.save(
            format!("weekly_reports_{}.zip", date_stamp(run_date)),
            &zip_data,
        )
        .await
    }
}
