//! Bulk loading of CSV rows into a table, for seeding a fresh data directory.

use crate::core::Database;
use crate::domain::model::{Member, Service, ServiceLogEntry, User, UserType, DATE_FMT};
use crate::domain::password::generate_secure_password;
use crate::domain::ports::Storage;
use crate::utils::error::{ChocAnError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableName {
    Members,
    Users,
    ProviderDirectory,
    ServiceLog,
}

impl FromStr for TableName {
    type Err = ChocAnError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "members" => Ok(TableName::Members),
            "users" => Ok(TableName::Users),
            "provider_directory" => Ok(TableName::ProviderDirectory),
            "service_log" => Ok(TableName::ServiceLog),
            other => Err(ChocAnError::InvalidArgument {
                message: format!(
                    "'{}' is not a table; expected members, users, provider_directory or service_log",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableName::Members => "members",
            TableName::Users => "users",
            TableName::ProviderDirectory => "provider_directory",
            TableName::ServiceLog => "service_log",
        };
        write!(f, "{}", name)
    }
}

/// A users row carries the plaintext password, hashed on the way in.
#[derive(Debug, Deserialize)]
struct UserRow {
    id: u32,
    user_type: UserType,
    name: String,
    address: String,
    city: String,
    state: String,
    zipcode: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            user_type: row.user_type,
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            zipcode: row.zipcode,
            password_hash: generate_secure_password(&row.password),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceLogRow {
    entry_datetime_utc: DateTime<Utc>,
    service_date: String,
    provider_id: u32,
    member_id: u32,
    service_id: u32,
    comments: Option<String>,
}

impl TryFrom<ServiceLogRow> for ServiceLogEntry {
    type Error = ChocAnError;

    fn try_from(row: ServiceLogRow) -> Result<Self> {
        let service_date = NaiveDate::parse_from_str(row.service_date.trim(), DATE_FMT).map_err(|e| {
            ChocAnError::InvalidValue {
                field: "service_date".to_string(),
                value: row.service_date.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(ServiceLogEntry {
            entry_datetime_utc: row.entry_datetime_utc,
            service_date,
            provider_id: row.provider_id,
            member_id: row.member_id,
            service_id: row.service_id,
            comments: row.comments.filter(|c| !c.is_empty()),
        })
    }
}

fn read_rows<T: DeserializeOwned>(csv_data: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(csv_data);
    let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, csv::Error>>()?;
    Ok(rows)
}

/// Adds every row of `csv_data` to `table`. Rows go through the same limits and
/// duplicate checks as interactive edits, and nothing is added if one row fails.
pub async fn import_csv<S: Storage>(
    database: &Database<S>,
    table: TableName,
    csv_data: &[u8],
) -> Result<usize> {
    let count = match table {
        TableName::Members => {
            let rows: Vec<Member> = read_rows(csv_data)?;
            let count = rows.len();
            database.add_records(rows).await?;
            count
        }
        TableName::Users => {
            let rows: Vec<UserRow> = read_rows(csv_data)?;
            let users: Vec<User> = rows.into_iter().map(User::from).collect();
            let count = users.len();
            database.add_records(users).await?;
            count
        }
        TableName::ProviderDirectory => {
            let rows: Vec<Service> = read_rows(csv_data)?;
            let count = rows.len();
            database.add_records(rows).await?;
            count
        }
        TableName::ServiceLog => {
            let rows: Vec<ServiceLogRow> = read_rows(csv_data)?;
            let entries = rows
                .into_iter()
                .map(ServiceLogEntry::try_from)
                .collect::<Result<Vec<_>>>()?;
            let count = entries.len();
            database.add_records(entries).await?;
            count
        }
    };

    tracing::info!("CSV records successfully added to {} ({} rows)", table, count);
    Ok(count)
}

pub async fn import_csv_file<S: Storage>(
    database: &Database<S>,
    table: TableName,
    csv_path: &Path,
) -> Result<usize> {
    tracing::debug!("Importing {} into {}", csv_path.display(), table);
    let data = std::fs::read(csv_path)?;
    import_csv(database, table, &data).await
}
