use serde::{Deserialize, Serialize};

use crate::constants::{ERR_ACCOUNT_FIELDS_REQUIRED, ERR_LOGIN_FIELDS_REQUIRED, MIN_PASSWORD_LEN};
use crate::error::AppError;

/// Account record stored in redb
/// Only the bcrypt hash of the password is ever persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    /// When the account was created (Unix microseconds)
    pub created_at: i64,
}

impl AccountRecord {
    /// Public view of the account; the credential hash never leaves the store
    pub fn to_account(&self, id: &str) -> Account {
        Account {
            id: id.to_string(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Account model for API responses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Validated account registration
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl RegisterAccountRequest {
    pub fn validate(self) -> Result<NewAccount, AppError> {
        let trimmed = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let (Some(full_name), Some(email), Some(phone), Some(password)) = (
            trimmed(self.full_name),
            trimmed(self.email),
            trimmed(self.phone),
            self.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::Validation(ERR_ACCOUNT_FIELDS_REQUIRED.to_string()));
        };

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must contain at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        Ok(NewAccount {
            full_name,
            email,
            phone,
            password,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns `(email, password)` when both are present
    pub fn credentials(self) -> Result<(String, String), AppError> {
        match (
            self.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            self.password.filter(|p| !p.is_empty()),
        ) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(AppError::Validation(ERR_LOGIN_FIELDS_REQUIRED.to_string())),
        }
    }
}
