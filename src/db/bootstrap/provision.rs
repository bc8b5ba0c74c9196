//! First-run creation of a missing server-side database.

use sqlx::Connection;
use sqlx::AnyConnection;
use tracing::{info, warn};
use url::Url;

use crate::db::backend::{Backend, quote_ident};
use crate::error::PortalError;

/// Database every PostgreSQL server carries for administrative connections.
const ADMIN_DATABASE: &str = "postgres";

/// Split `database_url` into an admin URL on the same server and the name
/// of the database it targets.
pub fn admin_target(database_url: &str) -> Result<(Url, String), PortalError> {
    let mut url = Url::parse(database_url)?;
    let name = url.path().trim_start_matches('/').to_string();
    if name.is_empty() {
        return Err(PortalError::UnsupportedDatabase(
            "database URL does not name a database".to_string(),
        ));
    }
    url.set_path(&format!("/{ADMIN_DATABASE}"));
    Ok((url, name))
}

/// Create the target database if it is absent. Returns whether it was created.
pub async fn ensure_database_exists(database_url: &str) -> Result<bool, PortalError> {
    let backend = Backend::from_url(database_url)?;
    if !backend.supports_provisioning() {
        warn!(?backend, "backend cannot create databases; skipping provisioning");
        return Ok(false);
    }

    let (admin_url, name) = admin_target(database_url)?;
    sqlx::any::install_default_drivers();
    let mut conn = AnyConnection::connect(admin_url.as_str()).await?;

    let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM pg_database WHERE datname = $1")
        .bind(&name)
        .fetch_optional(&mut conn)
        .await?;

    let created = if exists.is_none() {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&name)))
            .execute(&mut conn)
            .await?;
        info!(database = %name, "created missing database");
        true
    } else {
        false
    };

    conn.close().await?;
    Ok(created)
}
