#![allow(dead_code)]

use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use mobile_banking_portal::db::Database;

/// SQLite file under the temp dir, removed on drop.
pub struct TempDb {
    pub path: PathBuf,
    pub url: String,
    pub db: Database,
}

impl TempDb {
    pub fn new(tag: &str) -> Self {
        let path = unique_temp_path(tag, "sqlite");
        let url = format!("sqlite:{}?mode=rwc", path.display());
        let db = Database::connect_lazy(&url).expect("failed to build pool");
        Self { path, url, db }
    }

    pub async fn exec(&self, sql: &str) {
        sqlx::query(sql)
            .execute(self.db.pool())
            .await
            .unwrap_or_else(|e| panic!("failed to execute `{sql}`: {e}"));
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

pub fn unique_temp_path(tag: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "mobile-banking-{tag}-{}-{}.{ext}",
        std::process::id(),
        nanos
    ));
    path
}
