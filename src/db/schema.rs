//! Table and column names for user storage, current and legacy.

use super::backend::Backend;

pub const USERS_TABLE: &str = "mobile_banking_users";

/// Table name used by earlier deployments.
pub const LEGACY_USERS_TABLE: &str = "user";

/// A column that earlier deployments stored under a different name.
#[derive(Debug, Clone, Copy)]
pub struct RenamedColumn {
    pub legacy: &'static str,
    pub current: &'static str,
    pub sql_type: &'static str,
}

pub const RENAMED_COLUMNS: [RenamedColumn; 3] = [
    RenamedColumn {
        legacy: "mpin_hash",
        current: "mpin_secure_hash",
        sql_type: "VARCHAR(255)",
    },
    RenamedColumn {
        legacy: "card_hash",
        current: "atm_card_secure_hash",
        sql_type: "VARCHAR(255)",
    },
    RenamedColumn {
        legacy: "card_last4",
        current: "atm_card_last4",
        sql_type: "VARCHAR(4)",
    },
];

/// DDL for the current users table. `IF NOT EXISTS` keeps it re-runnable.
pub fn create_users_table(backend: Backend) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {USERS_TABLE} (
    {pk},
    name VARCHAR(100) NOT NULL,
    email VARCHAR(120) NOT NULL UNIQUE,
    password VARCHAR(255) NOT NULL,
    mpin_secure_hash VARCHAR(255) NULL,
    atm_card_secure_hash VARCHAR(255) NULL,
    atm_card_last4 VARCHAR(4) NULL
)",
        pk = backend.primary_key_column()
    )
}
