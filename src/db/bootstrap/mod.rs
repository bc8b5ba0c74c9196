//! Startup schema bootstrap.
//!
//! Runs [`UPGRADE_STEPS`] once before the server accepts requests. If the
//! server reports that the database itself is missing, it is created via
//! [`provision`] and the steps are retried once. Any remaining failure is
//! logged and swallowed so the process still starts.

pub mod provision;
pub mod steps;

pub use steps::{UPGRADE_STEPS, UpgradeStep};

use std::future::Future;

use tracing::{debug, error, info, warn};

use crate::db::Database;
use crate::error::PortalError;

pub struct Bootstrapper {
    db: Database,
    database_url: String,
}

impl Bootstrapper {
    pub fn new(db: Database, database_url: impl Into<String>) -> Self {
        Self {
            db,
            database_url: database_url.into(),
        }
    }

    /// Apply every step in order, stopping at the first failure.
    pub async fn apply_all(&self) -> Result<(), PortalError> {
        for step in UPGRADE_STEPS {
            debug!(step = step.name(), "applying bootstrap step");
            step.apply(&self.db).await.inspect_err(|e| {
                warn!(step = step.name(), error = %e, "bootstrap step failed");
            })?;
        }
        Ok(())
    }

    /// Apply all steps, creating the database and retrying once when it is missing.
    pub async fn try_run(&self) -> Result<(), PortalError> {
        let this = self;
        retry_after_provisioning(
            self.db.backend().supports_provisioning(),
            move || this.apply_all(),
            move || provision::ensure_database_exists(&this.database_url),
        )
        .await
    }

    /// Like [`try_run`](Self::try_run) but never fails. Returns whether the
    /// schema is known to be in its current shape.
    pub async fn run(&self) -> bool {
        match self.try_run().await {
            Ok(()) => {
                info!("database bootstrap complete");
                true
            }
            Err(e) => {
                error!(error = %e, "database bootstrap failed; starting without a verified schema");
                false
            }
        }
    }
}

/// Run `apply_all`; if it fails because the database is missing and the
/// backend can create one, run `provision` and then `apply_all` exactly once more.
async fn retry_after_provisioning<A, AF, P, PF>(
    can_provision: bool,
    mut apply_all: A,
    provision: P,
) -> Result<(), PortalError>
where
    A: FnMut() -> AF,
    AF: Future<Output = Result<(), PortalError>>,
    P: FnOnce() -> PF,
    PF: Future<Output = Result<bool, PortalError>>,
{
    match apply_all().await {
        Err(e) if can_provision && e.is_missing_database() => {
            warn!(error = %e, "database does not exist; attempting to create it");
            provision().await?;
            apply_all().await
        }
        other => other,
    }
}
