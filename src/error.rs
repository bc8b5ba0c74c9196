use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

/// SQLSTATE raised by PostgreSQL when the target database is absent.
const INVALID_CATALOG_NAME: &str = "3D000";

#[derive(Debug, ThisError)]
pub enum PortalError {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Unsupported database URL scheme: {0}")]
    UnsupportedDatabase(String),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl PortalError {
    /// True when the server is reachable but the configured database itself
    /// does not exist yet (as opposed to a missing table).
    pub fn is_missing_database(&self) -> bool {
        match self {
            PortalError::DatabaseError(SqlxError::Database(db_err)) => {
                is_missing_database_error(db_err.code().as_deref(), db_err.message())
            }
            _ => false,
        }
    }
}

pub(crate) fn is_missing_database_error(code: Option<&str>, message: &str) -> bool {
    if code == Some(INVALID_CATALOG_NAME) {
        return true;
    }
    let message = message.to_ascii_lowercase();
    message.starts_with("database ") && message.contains("does not exist")
}

impl IntoResponse for PortalError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Internal Server Error</h1><p>An internal server error occurred.</p>"),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_missing_database_by_sqlstate() {
        assert!(is_missing_database_error(Some("3D000"), "anything"));
    }

    #[test]
    fn classifies_missing_database_by_message() {
        assert!(is_missing_database_error(
            None,
            r#"database "portal" does not exist"#
        ));
    }

    #[test]
    fn missing_table_is_not_missing_database() {
        assert!(!is_missing_database_error(
            Some("42P01"),
            r#"relation "mobile_banking_users" does not exist"#
        ));
        assert!(!is_missing_database_error(None, "no such table: user"));
    }
}
