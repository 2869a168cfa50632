use crate::domain::ports::Storage;
use crate::domain::schema::{EditableRecord, GeneratedId, TableRecord};
use crate::utils::error::{ChocAnError, Result};

fn table_file(table: &str) -> String {
    format!("{}.json", table)
}

/// Record tables kept as one JSON file per table.
#[derive(Debug, Clone)]
pub struct Database<S: Storage> {
    storage: S,
}

impl<S: Storage> Database<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Loads a whole table. A table that was never written is empty.
    pub async fn load_all<T: TableRecord>(&self) -> Result<Vec<T>> {
        let bytes = match self.storage.read_file(&table_file(T::TABLE)).await {
            Ok(bytes) => bytes,
            Err(ChocAnError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Table {} has no file yet", T::TABLE);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let records: Vec<T> = serde_json::from_slice(&bytes)?;
        for record in &records {
            record.validate()?;
        }
        tracing::debug!("Loaded {} records from {}", records.len(), T::TABLE);
        Ok(records)
    }

    pub async fn load_where<T, F>(&self, predicate: F) -> Result<Vec<T>>
    where
        T: TableRecord,
        F: Fn(&T) -> bool,
    {
        let records = self.load_all::<T>().await?;
        Ok(records.into_iter().filter(|r| predicate(r)).collect())
    }

    pub async fn find<T: TableRecord>(&self, key: &T::Key) -> Result<Option<T>> {
        let records = self.load_all::<T>().await?;
        Ok(records.into_iter().find(|r| &r.key() == key))
    }

    /// Appends records. The whole batch is rejected if any record is invalid or
    /// any key is already taken.
    pub async fn add_records<T: TableRecord>(&self, records: Vec<T>) -> Result<()> {
        let mut existing = self.load_all::<T>().await?;

        for (i, record) in records.iter().enumerate() {
            record.validate()?;
            let key = record.key();
            let taken = existing.iter().any(|r| r.key() == key)
                || records[..i].iter().any(|r| r.key() == key);
            if taken {
                return Err(ChocAnError::DuplicateKey {
                    table: T::TABLE.to_string(),
                    key: key.to_string(),
                });
            }
        }

        let added = records.len();
        existing.extend(records);
        self.write_table(&existing).await?;
        tracing::info!("Added {} records to {}", added, T::TABLE);
        Ok(())
    }

    /// Applies `(field, value)` updates to one record and returns the result.
    /// Nothing is written unless every update parses and the record stays valid.
    pub async fn update_record<T: EditableRecord>(
        &self,
        key: &T::Key,
        updates: &[(&str, &str)],
    ) -> Result<T> {
        if updates.is_empty() {
            return Err(ChocAnError::NoUpdates);
        }

        let mut records = self.load_all::<T>().await?;
        let record = records
            .iter_mut()
            .find(|r| &r.key() == key)
            .ok_or_else(|| ChocAnError::NotFound {
                table: T::TABLE.to_string(),
                key: key.to_string(),
            })?;

        let mut updated = record.clone();
        for (field, value) in updates {
            if !T::EDITABLE_FIELDS.iter().any(|f| *f == *field) {
                return Err(ChocAnError::UnknownField {
                    table: T::TABLE.to_string(),
                    field: field.to_string(),
                });
            }
            updated.set_field(field, value)?;
        }
        updated.validate()?;

        *record = updated.clone();
        self.write_table(&records).await?;
        tracing::info!("Updated record {} in {}", key, T::TABLE);
        Ok(updated)
    }

    /// Returns false if no record has `key`.
    pub async fn remove_record<T: TableRecord>(&self, key: &T::Key) -> Result<bool> {
        let mut records = self.load_all::<T>().await?;
        let before = records.len();
        records.retain(|r| &r.key() != key);
        if records.len() == before {
            return Ok(false);
        }

        self.write_table(&records).await?;
        tracing::info!("Removed record {} from {}", key, T::TABLE);
        Ok(true)
    }

    /// Next free id: one past the current maximum, or the start of the range.
    pub async fn generate_unique_id<T: GeneratedId>(&self) -> Result<u32> {
        let records = self.load_all::<T>().await?;
        let start = *T::ID_RANGE.start();
        let end = *T::ID_RANGE.end();

        let next = match records.iter().map(|r| r.key()).max() {
            None => start,
            Some(max) if max < start => start,
            Some(max) => max.checked_add(1).unwrap_or(u32::MAX),
        };

        if next > end {
            return Err(ChocAnError::IdSpaceExhausted {
                table: T::TABLE.to_string(),
            });
        }
        Ok(next)
    }

    async fn write_table<T: TableRecord>(&self, records: &[T]) -> Result<()> {
        let data = serde_json::to_vec_pretty(records)?;
        self.storage.write_file(&table_file(T::TABLE), &data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Member, Service, ServiceLogEntry};
    use crate::testing::{member, MockStorage};

    fn service(service_id: u32) -> Service {
        crate::testing::service(service_id, "Dietitian session", 75, 50)
    }

    #[tokio::test]
    async fn test_missing_table_is_empty() {
        let db = Database::new(MockStorage::default());
        let members: Vec<Member> = db.load_all().await.unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn test_add_then_load() {
        let storage = MockStorage::default();
        let db = Database::new(storage.clone());

        db.add_records(vec![member(222222222, "Mary"), member(222222223, "Marie")])
            .await
            .unwrap();

        assert!(storage.get_file("members.json").await.is_some());
        let loaded: Vec<Member> = db.load_all().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].name, "Marie");
    }

    #[tokio::test]
    async fn test_add_rejects_duplicates() {
        let db = Database::new(MockStorage::default());
        db.add_records(vec![member(222222222, "Mary")]).await.unwrap();

        let err = db.add_records(vec![member(222222222, "Again")]).await.unwrap_err();
        assert!(matches!(err, ChocAnError::DuplicateKey { .. }));

        let err = db
            .add_records(vec![member(333333333, "One"), member(333333333, "Two")])
            .await
            .unwrap_err();
        assert!(matches!(err, ChocAnError::DuplicateKey { .. }));

        let loaded: Vec<Member> = db.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_record() {
        let db = Database::new(MockStorage::default());
        let mut bad = member(222222222, "Mary");
        bad.state = "Oregon".to_string();

        let err = db.add_records(vec![bad]).await.unwrap_err();
        assert!(matches!(err, ChocAnError::InvalidValue { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_table_is_an_error() {
        let storage = MockStorage::default();
        storage.put_file("members.json", b"{not json").await;
        let db = Database::new(storage);

        let err = db.load_all::<Member>().await.unwrap_err();
        assert!(matches!(err, ChocAnError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_load_where_and_find() {
        let db = Database::new(MockStorage::default());
        let mut suspended = member(222222223, "Marie");
        suspended.suspended = true;
        db.add_records(vec![member(222222222, "Mary"), suspended]).await.unwrap();

        let active: Vec<Member> = db.load_where(|m: &Member| !m.suspended).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].member_id, 222222222);

        let found: Option<Member> = db.find(&222222223).await.unwrap();
        assert_eq!(found.unwrap().name, "Marie");
        assert!(db.find::<Member>(&999999999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_record() {
        let db = Database::new(MockStorage::default());
        db.add_records(vec![member(137002632, "Donald")]).await.unwrap();

        let updated: Member = db
            .update_record(&137002632, &[("name", "Martha"), ("zipcode", "97201")])
            .await
            .unwrap();
        assert_eq!(updated.name, "Martha");

        let stored: Member = db.find(&137002632).await.unwrap().unwrap();
        assert_eq!(stored.zipcode, "97201");
    }

    #[tokio::test]
    async fn test_update_errors_leave_table_unchanged() {
        let db = Database::new(MockStorage::default());
        db.add_records(vec![member(137002632, "Donald")]).await.unwrap();

        assert!(matches!(
            db.update_record::<Member>(&137002632, &[]).await,
            Err(ChocAnError::NoUpdates)
        ));
        assert!(matches!(
            db.update_record::<Member>(&989635272, &[("name", "X")]).await,
            Err(ChocAnError::NotFound { .. })
        ));
        assert!(matches!(
            db.update_record::<Member>(&137002632, &[("member_id", "111111111")]).await,
            Err(ChocAnError::UnknownField { .. })
        ));
        assert!(matches!(
            db.update_record::<Member>(&137002632, &[("name", "Martha"), ("city", "")])
                .await,
            Err(ChocAnError::InvalidValue { .. })
        ));

        let stored: Member = db.find(&137002632).await.unwrap().unwrap();
        assert_eq!(stored.name, "Donald");
    }

    #[tokio::test]
    async fn test_remove_record() {
        let db = Database::new(MockStorage::default());
        db.add_records(vec![service(555555), service(555556)]).await.unwrap();

        assert!(db.remove_record::<Service>(&555555).await.unwrap());
        assert!(!db.remove_record::<Service>(&555555).await.unwrap());

        let remaining: Vec<Service> = db.load_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].service_id, 555556);
    }

    #[tokio::test]
    async fn test_generate_unique_id() {
        let db = Database::new(MockStorage::default());
        assert_eq!(db.generate_unique_id::<Member>().await.unwrap(), 100000000);
        assert_eq!(db.generate_unique_id::<Service>().await.unwrap(), 100000);

        db.add_records(vec![member(222222222, "Mary"), member(137002632, "Donald")])
            .await
            .unwrap();
        assert_eq!(db.generate_unique_id::<Member>().await.unwrap(), 222222223);
    }

    #[tokio::test]
    async fn test_generate_unique_id_exhausted() {
        let db = Database::new(MockStorage::default());
        db.add_records(vec![member(999999999, "Last")]).await.unwrap();

        assert!(matches!(
            db.generate_unique_id::<Member>().await,
            Err(ChocAnError::IdSpaceExhausted { .. })
        ));
    }

    #[tokio::test]
    async fn test_service_log_keyed_by_entry_time() {
        use chrono::{NaiveDate, TimeZone, Utc};

        let db = Database::new(MockStorage::default());
        let entry = ServiceLogEntry {
            entry_datetime_utc: Utc.with_ymd_and_hms(2023, 11, 26, 12, 0, 0).unwrap(),
            service_date: NaiveDate::from_ymd_opt(2023, 11, 26).unwrap(),
            provider_id: 123456789,
            member_id: 987654321,
            service_id: 555555,
            comments: Some("Test service".to_string()),
        };
        db.add_records(vec![entry.clone()]).await.unwrap();
        assert!(matches!(
            db.add_records(vec![entry]).await,
            Err(ChocAnError::DuplicateKey { .. })
        ));
    }
}
