use crate::db::Database;
use crate::db::models::{DbUser, NewUser};
use crate::db::schema::USERS_TABLE;
use crate::error::PortalError;
use sqlx::{Any, Error as SqlxError, Executor};

/// Outcome of an insert that may collide on the unique email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    DuplicateEmail,
}

#[derive(Clone)]
pub struct UserStorage {
    db: Database,
}

impl UserStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<DbUser>, PortalError> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT id, name, email, password, mpin_secure_hash, atm_card_secure_hash, atm_card_last4 \
             FROM {USERS_TABLE} WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, PortalError> {
        let found: Option<i64> =
            sqlx::query_scalar(&format!("SELECT id FROM {USERS_TABLE} WHERE email = $1"))
                .bind(email)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(found.is_some())
    }

    /// Insert a new user. A unique-constraint violation on email is reported
    /// as `DuplicateEmail` rather than an error.
    pub async fn insert(&self, user: &NewUser) -> Result<InsertOutcome, PortalError> {
        let res = insert_user(self.db.pool(), user).await;

        match res {
            Ok(id) => Ok(InsertOutcome::Inserted(id)),
            Err(SqlxError::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(InsertOutcome::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Insert `user` on any executor (pool or open transaction) and return its id.
pub(crate) async fn insert_user<'e, E>(executor: E, user: &NewUser) -> Result<i64, SqlxError>
where
    E: Executor<'e, Database = Any>,
{
    sqlx::query_scalar::<_, i64>(&format!(
        "INSERT INTO {USERS_TABLE} \
         (name, email, password, mpin_secure_hash, atm_card_secure_hash, atm_card_last4) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id"
    ))
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(user.mpin_secure_hash.as_deref())
    .bind(user.atm_card_secure_hash.as_deref())
    .bind(user.atm_card_last4.as_deref())
    .fetch_one(executor)
    .await
}
