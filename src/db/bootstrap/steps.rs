//! The upgrade path from the legacy `user` layout to `mobile_banking_users`,
//! as an ordered list of steps. Every step checks the catalog first, so
//! re-running any of them against an already upgraded database is a no-op.

use std::collections::HashSet;

use sqlx::FromRow;
use sqlx::AnyConnection;
use tracing::{debug, info, warn};

use crate::auth::hashing::{HASH_MARKER, with_hash_marker};
use crate::db::Database;
use crate::db::backend::{Backend, quote_ident};
use crate::db::models::NewUser;
use crate::db::schema::{LEGACY_USERS_TABLE, RENAMED_COLUMNS, USERS_TABLE, create_users_table};
use crate::db::users::insert_user;
use crate::error::PortalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeStep {
    /// `user` -> `mobile_banking_users`, when only the former exists.
    RenameLegacyTable,
    /// Create `mobile_banking_users` if it is still missing.
    CreateTables,
    /// Rename or add hash/last4 columns, then mark every stored MPIN hash.
    NormalizeColumns,
    /// Copy rows left behind in `user` whose email is not yet present.
    BackfillLegacyRows,
}

/// Steps in the order they must run.
pub const UPGRADE_STEPS: [UpgradeStep; 4] = [
    UpgradeStep::RenameLegacyTable,
    UpgradeStep::CreateTables,
    UpgradeStep::NormalizeColumns,
    UpgradeStep::BackfillLegacyRows,
];

impl UpgradeStep {
    pub fn name(self) -> &'static str {
        match self {
            UpgradeStep::RenameLegacyTable => "rename_legacy_table",
            UpgradeStep::CreateTables => "create_tables",
            UpgradeStep::NormalizeColumns => "normalize_columns",
            UpgradeStep::BackfillLegacyRows => "backfill_legacy_rows",
        }
    }

    /// Run the step in its own transaction; nothing is kept if it fails.
    pub async fn apply(self, db: &Database) -> Result<(), PortalError> {
        let backend = db.backend();
        let mut tx = db.pool().begin().await?;
        match self {
            UpgradeStep::RenameLegacyTable => rename_legacy_table(&mut *tx, backend).await?,
            UpgradeStep::CreateTables => create_tables(&mut *tx, backend).await?,
            UpgradeStep::NormalizeColumns => normalize_columns(&mut *tx, backend).await?,
            UpgradeStep::BackfillLegacyRows => backfill_legacy_rows(&mut *tx, backend).await?,
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn rename_legacy_table(conn: &mut AnyConnection, backend: Backend) -> Result<(), PortalError> {
    let tables = backend.table_names(conn).await?;
    if tables.contains(USERS_TABLE) || !tables.contains(LEGACY_USERS_TABLE) {
        debug!("no legacy table to rename");
        return Ok(());
    }
    sqlx::query(&format!(
        "ALTER TABLE {} RENAME TO {USERS_TABLE}",
        quote_ident(LEGACY_USERS_TABLE)
    ))
    .execute(&mut *conn)
    .await?;
    info!(from = LEGACY_USERS_TABLE, to = USERS_TABLE, "renamed legacy users table");
    Ok(())
}

async fn create_tables(conn: &mut AnyConnection, backend: Backend) -> Result<(), PortalError> {
    sqlx::query(&create_users_table(backend))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn normalize_columns(conn: &mut AnyConnection, backend: Backend) -> Result<(), PortalError> {
    let columns = backend.column_names(conn, USERS_TABLE).await?;
    if columns.is_empty() {
        debug!(table = USERS_TABLE, "table missing; skipping column normalization");
        return Ok(());
    }

    for column in RENAMED_COLUMNS {
        let has_legacy = columns.contains(column.legacy);
        let has_current = columns.contains(column.current);
        let statement = match (has_legacy, has_current) {
            (true, false) => format!(
                "ALTER TABLE {USERS_TABLE} RENAME COLUMN {} TO {}",
                column.legacy, column.current
            ),
            (false, false) => format!(
                "ALTER TABLE {USERS_TABLE} ADD COLUMN {} {}",
                column.current, column.sql_type
            ),
            _ => continue,
        };
        sqlx::query(&statement).execute(&mut *conn).await?;
        info!(
            legacy = column.legacy,
            current = column.current,
            renamed = has_legacy,
            "normalized users column"
        );
    }

    let marked = sqlx::query(&format!(
        "UPDATE {USERS_TABLE} \
         SET mpin_secure_hash = '{HASH_MARKER}' || mpin_secure_hash \
         WHERE mpin_secure_hash IS NOT NULL AND mpin_secure_hash NOT LIKE '{HASH_MARKER}%'"
    ))
    .execute(&mut *conn)
    .await?
    .rows_affected();
    if marked > 0 {
        info!(rows = marked, "added hash marker to stored MPIN hashes");
    }
    Ok(())
}

/// Row of the legacy table. Columns it lacks are selected as NULL.
#[derive(Debug, Clone, Default, FromRow)]
struct LegacyUserRow {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    mpin_secure_hash: Option<String>,
    mpin_hash: Option<String>,
    atm_card_secure_hash: Option<String>,
    card_hash: Option<String>,
    atm_card_last4: Option<String>,
    card_last4: Option<String>,
}

const LEGACY_ROW_COLUMNS: [&str; 9] = [
    "name",
    "email",
    "password",
    "mpin_secure_hash",
    "mpin_hash",
    "atm_card_secure_hash",
    "card_hash",
    "atm_card_last4",
    "card_last4",
];

#[derive(Debug, PartialEq, Eq)]
enum SkipReason {
    MissingEmail,
    MissingRequiredField,
}

impl LegacyUserRow {
    /// Map onto current column names. Values under the current name win over
    /// legacy-named ones; empty strings count as absent.
    fn into_new_user(self) -> Result<NewUser, SkipReason> {
        let email = non_empty(self.email).ok_or(SkipReason::MissingEmail)?;
        let (Some(name), Some(password)) = (self.name, self.password) else {
            return Err(SkipReason::MissingRequiredField);
        };
        let mpin_secure_hash = prefer_current(self.mpin_secure_hash, self.mpin_hash)
            .map(|v| with_hash_marker(&v));
        Ok(NewUser {
            name,
            email,
            password,
            mpin_secure_hash,
            atm_card_secure_hash: prefer_current(self.atm_card_secure_hash, self.card_hash),
            atm_card_last4: prefer_current(self.atm_card_last4, self.card_last4),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn prefer_current(current: Option<String>, legacy: Option<String>) -> Option<String> {
    non_empty(current).or(legacy)
}

fn legacy_select_sql(legacy_columns: &HashSet<String>) -> String {
    let projection = LEGACY_ROW_COLUMNS
        .iter()
        .map(|col| {
            if legacy_columns.contains(*col) {
                quote_ident(col)
            } else {
                format!("CAST(NULL AS VARCHAR(255)) AS {col}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT {projection} FROM {}",
        quote_ident(LEGACY_USERS_TABLE)
    )
}

async fn backfill_legacy_rows(
    conn: &mut AnyConnection,
    backend: Backend,
) -> Result<(), PortalError> {
    let tables = backend.table_names(conn).await?;
    if !tables.contains(LEGACY_USERS_TABLE) || !tables.contains(USERS_TABLE) {
        debug!("no legacy rows to backfill");
        return Ok(());
    }

    let legacy_columns = backend.column_names(conn, LEGACY_USERS_TABLE).await?;
    let legacy_rows: Vec<LegacyUserRow> = sqlx::query_as(&legacy_select_sql(&legacy_columns))
        .fetch_all(&mut *conn)
        .await?;

    let existing: Vec<Option<String>> =
        sqlx::query_scalar(&format!("SELECT email FROM {USERS_TABLE}"))
            .fetch_all(&mut *conn)
            .await?;
    let mut seen: HashSet<String> = existing.into_iter().filter_map(non_empty).collect();

    let mut copied = 0usize;
    for row in legacy_rows {
        let user = match row.into_new_user() {
            Ok(user) => user,
            Err(SkipReason::MissingEmail) => continue,
            Err(SkipReason::MissingRequiredField) => {
                warn!("skipping legacy user row without name or password");
                continue;
            }
        };
        if !seen.insert(user.email.clone()) {
            continue;
        }
        insert_user(&mut *conn, &user).await?;
        copied += 1;
    }

    if copied > 0 {
        info!(rows = copied, from = LEGACY_USERS_TABLE, "backfilled legacy users");
    }
    Ok(())
}
