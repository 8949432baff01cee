use redb::ReadableTable;
use uuid::Uuid;

use super::{decode, encode, tables, Db};
use crate::constants::DUMMY_PASSWORD_HASH;
use crate::error::{AppError, Result};
use crate::models::{now_micros, Account, AccountRecord, NewAccount};
use crate::security::{hash_password, verify_password};

/// Persists user accounts with bcrypt-hashed credentials
#[derive(Clone)]
pub struct AccountStore {
    db: Db,
}

impl AccountStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create an account, returning 409 semantics when the email is taken
    pub async fn register(&self, account: NewAccount) -> Result<Account> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<Account> {
            let email_key = account.email.to_lowercase();

            // Cheap read first so a conflict never pays for a hash; the write
            // transaction below still decides races
            {
                let read_txn = db.begin_read()?;
                let emails = read_txn.open_table(tables::ACCOUNT_EMAILS)?;
                if emails.get(email_key.as_str())?.is_some() {
                    tracing::info!("Account registration rejected: email already in use");
                    return Err(AppError::AccountExists);
                }
            }

            let password_hash = hash_password(&account.password)?;
            let id = Uuid::new_v4().to_string();

            let record = AccountRecord {
                full_name: account.full_name,
                email: account.email,
                phone: account.phone,
                password_hash,
                created_at: now_micros(),
            };

            let write_txn = db.begin_write()?;
            {
                let mut emails = write_txn.open_table(tables::ACCOUNT_EMAILS)?;
                if emails.get(email_key.as_str())?.is_some() {
                    tracing::info!("Account registration rejected: email already in use");
                    return Err(AppError::AccountExists);
                }
                emails.insert(email_key.as_str(), id.as_str())?;

                let mut accounts = write_txn.open_table(tables::ACCOUNTS)?;
                let bytes = encode(&record)?;
                accounts.insert(id.as_str(), bytes.as_slice())?;
            }
            write_txn.commit()?;

            tracing::info!("New account registered: {}", id);
            Ok(record.to_account(&id))
        })
        .await?
    }

    /// Verify credentials
    ///
    /// Unknown emails and wrong passwords both yield `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account> {
        let db = self.db.clone();
        let email_key = email.trim().to_lowercase();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || -> Result<Account> {
            let read_txn = db.begin_read()?;
            let emails = read_txn.open_table(tables::ACCOUNT_EMAILS)?;

            let Some(id) = emails
                .get(email_key.as_str())?
                .map(|guard| guard.value().to_string())
            else {
                tracing::warn!("Login attempt for unknown email");
                // Same bcrypt cost as a wrong password
                let _ = verify_password(&password, DUMMY_PASSWORD_HASH);
                return Err(AppError::InvalidCredentials);
            };

            let accounts = read_txn.open_table(tables::ACCOUNTS)?;
            let record: AccountRecord = accounts
                .get(id.as_str())?
                .map(|bytes| decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::InvalidCredentials)?;

            if !verify_password(&password, &record.password_hash)? {
                tracing::warn!("Login attempt with wrong password for account {}", id);
                return Err(AppError::InvalidCredentials);
            }

            Ok(record.to_account(&id))
        })
        .await?
    }
}
