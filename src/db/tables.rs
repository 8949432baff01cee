use redb::TableDefinition;

/// Registrations table: registration id (UUID) -> RegistrationRecord (serialized)
pub const REGISTRATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("registrations");

/// Unique-key index for registrations: "<field>:<value>" -> registration id
/// Used to reject duplicate emails and form numbers inside the insert transaction
pub const REGISTRATION_KEYS: TableDefinition<&str, &str> =
    TableDefinition::new("registration_keys");

/// Accounts table: account id (UUID) -> AccountRecord (serialized)
pub const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Account email index: email -> account id
pub const ACCOUNT_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("account_emails");

/// Videos table: video id (UUID) -> VideoRecord (serialized)
pub const VIDEOS: TableDefinition<&str, &[u8]> = TableDefinition::new("videos");
