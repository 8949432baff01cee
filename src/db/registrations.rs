use redb::ReadableTable;
use uuid::Uuid;

use super::{decode, encode, tables, Db};
use crate::constants::ERR_REGISTRATION_NOT_FOUND;
use crate::error::{AppError, Result};
use crate::models::{now_micros, NewRegistration, Registration, RegistrationRecord};

/// Persists player registrations and guards their unique keys
#[derive(Clone)]
pub struct RegistrationStore {
    db: Db,
}

impl RegistrationStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Store a validated registration
    ///
    /// Fails with `DuplicateField` when the email or form number is already
    /// taken. The uniqueness check and the insert share one write transaction.
    pub async fn submit(&self, registration: NewRegistration) -> Result<Registration> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<Registration> {
            let id = Uuid::new_v4().to_string();
            let record = RegistrationRecord::new(registration, now_micros());
            let keys = record.unique_keys();

            let write_txn = db.begin_write()?;
            {
                let mut index = write_txn.open_table(tables::REGISTRATION_KEYS)?;
                for &(field, ref key) in &keys {
                    if index.get(key.as_str())?.is_some() {
                        tracing::info!("Duplicate registration rejected on {}", field);
                        return Err(AppError::DuplicateField(field));
                    }
                }
                for (_, key) in &keys {
                    index.insert(key.as_str(), id.as_str())?;
                }

                let mut registrations = write_txn.open_table(tables::REGISTRATIONS)?;
                let bytes = encode(&record)?;
                registrations.insert(id.as_str(), bytes.as_slice())?;
            }
            write_txn.commit()?;

            tracing::info!("Registration stored: {}", id);
            Ok(record.into_view(&id))
        })
        .await?
    }

    /// All registrations, newest first
    pub async fn list(&self) -> Result<Vec<Registration>> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<Registration>> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(tables::REGISTRATIONS)?;

            let mut records = Vec::new();
            for entry in table.iter()? {
                let (id, bytes) = entry?;
                let record: RegistrationRecord = decode(bytes.value())?;
                records.push((id.value().to_string(), record));
            }

            records.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));

            Ok(records
                .into_iter()
                .map(|(id, record)| record.into_view(&id))
                .collect())
        })
        .await?
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Registration> {
        let db = self.db.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || -> Result<Registration> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(tables::REGISTRATIONS)?;

            let record: RegistrationRecord = table
                .get(id.as_str())?
                .map(|bytes| decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::NotFound(ERR_REGISTRATION_NOT_FOUND))?;

            Ok(record.into_view(&id))
        })
        .await?
    }

    /// Remove a registration and release its unique keys
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        let db = self.db.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let write_txn = db.begin_write()?;
            {
                let mut registrations = write_txn.open_table(tables::REGISTRATIONS)?;
                let removed: Option<RegistrationRecord> = registrations
                    .remove(id.as_str())?
                    .map(|bytes| decode(bytes.value()))
                    .transpose()?;
                let record = removed.ok_or(AppError::NotFound(ERR_REGISTRATION_NOT_FOUND))?;

                let mut index = write_txn.open_table(tables::REGISTRATION_KEYS)?;
                for (_, key) in record.unique_keys() {
                    index.remove(key.as_str())?;
                }
            }
            write_txn.commit()?;

            tracing::info!("Registration deleted: {}", id);
            Ok(())
        })
        .await?
    }
}
