//! Test doubles and fixtures shared by unit tests.

use crate::domain::model::{Member, Service, ServiceLogEntry, User, UserType};
use crate::domain::password::generate_secure_password;
use crate::domain::ports::Storage;
use crate::utils::error::{ChocAnError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_writes: bool,
}

impl MockStorage {
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(path).cloned()
    }

    pub async fn put_file(&self, path: &str, data: &[u8]) {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
    }

    pub async fn file_names(&self) -> Vec<String> {
        let files = self.files.lock().await;
        let mut names: Vec<String> = files.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Storage for MockStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(path).cloned().ok_or_else(|| {
            ChocAnError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            ))
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(ChocAnError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only storage",
            )));
        }
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn location(&self, path: &str) -> String {
        format!("mock/{}", path)
    }
}

pub fn member(member_id: u32, name: &str) -> Member {
    Member {
        member_id,
        name: name.to_string(),
        address: "4321 NE Street St.".to_string(),
        city: "Metrocity".to_string(),
        state: "OR".to_string(),
        zipcode: "97212".to_string(),
        suspended: false,
    }
}

pub fn user(id: u32, user_type: UserType, name: &str, password: &str) -> User {
    User {
        id,
        user_type,
        name: name.to_string(),
        address: "123 Main St".to_string(),
        city: "Chicago".to_string(),
        state: "IL".to_string(),
        zipcode: "15603".to_string(),
        password_hash: generate_secure_password(password),
    }
}

pub fn service(service_id: u32, name: &str, dollars: u32, cents: u32) -> Service {
    Service {
        service_id,
        service_name: name.to_string(),
        price_dollars: dollars,
        price_cents: cents,
    }
}

pub fn date(month: u32, day: u32, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn log_entry(
    received: DateTime<Utc>,
    service_date: NaiveDate,
    provider_id: u32,
    member_id: u32,
    service_id: u32,
) -> ServiceLogEntry {
    ServiceLogEntry {
        entry_datetime_utc: received,
        service_date,
        provider_id,
        member_id,
        service_id,
        comments: None,
    }
}
