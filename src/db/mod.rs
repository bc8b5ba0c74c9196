//! Database module: connection handle, schema, models and queries.
//!
//! Layout:
//! - `backend.rs`: dialect differences between SQLite and PostgreSQL
//! - `schema.rs`: table/column names and DDL for `mobile_banking_users`
//! - `models.rs`: Rust structs mirroring DB rows
//! - `users.rs`: queries used by the request handlers
//! - `bootstrap/`: startup schema normalization and legacy data backfill

pub mod backend;
pub mod bootstrap;
pub mod models;
pub mod schema;
pub mod users;

pub use backend::Backend;
pub use models::{DbUser, NewUser};
pub use users::UserStorage;

use crate::error::PortalError;
use sqlx::any::AnyPoolOptions;
use sqlx::{Any, Pool};

pub type DbPool = Pool<Any>;

/// Pool plus the dialect it speaks. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    backend: Backend,
}

impl Database {
    /// Build a pool without opening a connection, so a missing database
    /// surfaces on first use instead of here.
    pub fn connect_lazy(database_url: &str) -> Result<Self, PortalError> {
        let backend = Backend::from_url(database_url)?;
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(backend.max_connections())
            .connect_lazy(database_url)?;
        Ok(Self { pool, backend })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
}
