use std::collections::HashSet;

use sqlx::AnyConnection;

use crate::error::PortalError;

/// SQL dialects the portal can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn from_url(database_url: &str) -> Result<Self, PortalError> {
        let scheme = database_url
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .unwrap_or(database_url);
        match scheme {
            "sqlite" => Ok(Backend::Sqlite),
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            other => Err(PortalError::UnsupportedDatabase(other.to_string())),
        }
    }

    /// Whether a missing database can be created through an admin connection.
    pub fn supports_provisioning(self) -> bool {
        matches!(self, Backend::Postgres)
    }

    pub(crate) fn max_connections(self) -> u32 {
        match self {
            Backend::Sqlite => 4,
            Backend::Postgres => 10,
        }
    }

    pub(crate) fn primary_key_column(self) -> &'static str {
        match self {
            Backend::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
            Backend::Postgres => "id BIGSERIAL PRIMARY KEY",
        }
    }

    fn table_names_sql(self) -> &'static str {
        match self {
            Backend::Sqlite => "SELECT name FROM sqlite_master WHERE type = 'table'",
            Backend::Postgres => {
                "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = current_schema()"
            }
        }
    }

    fn column_names_sql(self) -> &'static str {
        match self {
            Backend::Sqlite => "SELECT name FROM pragma_table_info($1)",
            Backend::Postgres => {
                "SELECT column_name::text FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name = $1"
            }
        }
    }

    /// Names of all user tables visible on this connection.
    pub async fn table_names(
        self,
        conn: &mut AnyConnection,
    ) -> Result<HashSet<String>, PortalError> {
        let names: Vec<String> = sqlx::query_scalar(self.table_names_sql())
            .fetch_all(&mut *conn)
            .await?;
        Ok(names.into_iter().collect())
    }

    /// Column names of `table`; empty when the table does not exist.
    pub async fn column_names(
        self,
        conn: &mut AnyConnection,
        table: &str,
    ) -> Result<HashSet<String>, PortalError> {
        let names: Vec<String> = sqlx::query_scalar(self.column_names_sql())
            .bind(table)
            .fetch_all(&mut *conn)
            .await?;
        Ok(names.into_iter().collect())
    }
}

/// Double-quote an identifier for either dialect.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_backend_from_scheme() {
        assert_eq!(
            Backend::from_url("sqlite://users.db?mode=rwc").unwrap(),
            Backend::Sqlite
        );
        assert_eq!(Backend::from_url("sqlite::memory:").unwrap(), Backend::Sqlite);
        assert_eq!(
            Backend::from_url("postgresql://bank@db/portal").unwrap(),
            Backend::Postgres
        );
        assert!(matches!(
            Backend::from_url("mysql://bank@db/portal"),
            Err(PortalError::UnsupportedDatabase(s)) if s == "mysql"
        ));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("user"), "\"user\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
