pub mod account;
pub mod fields;
pub mod registration;
pub mod video;

pub use account::{Account, AccountRecord, LoginRequest, NewAccount, RegisterAccountRequest};
pub use registration::{
    BowlerType, FieldCategory, Hand, NewRegistration, PlayingRole, Registration,
    RegistrationForm, RegistrationRecord,
};
pub use video::{MediaType, Video, VideoRecord};

use chrono::{DateTime, Utc};

/// Current time as Unix microseconds, the resolution records are ordered by
pub fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

/// Convert Unix microseconds to an RFC 3339 string, defaulting to now if out of range
pub fn micros_to_rfc3339(micros: i64) -> String {
    DateTime::from_timestamp_micros(micros)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}
