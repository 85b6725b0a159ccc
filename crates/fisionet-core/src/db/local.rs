//! Offline [`TableBackend`] over the local SQLite store.
//!
//! Lets the app run against a device-local database with the same
//! repositories it uses for the hosted data API. Access tokens are accepted
//! and ignored.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use fisionet_remote::{Filter, Query, RemoteError, RemoteResult, TableBackend};
use serde_json::Value;

use super::{Database, DbError, DbResult};

/// Shared handle to a local [`Database`].
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open (or create) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Lock the underlying database.
    pub fn lock(&self) -> RemoteResult<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|e| RemoteError::Backend(format!("Lock poisoned: {}", e)))
    }
}

fn backend_error(e: DbError) -> RemoteError {
    match e {
        DbError::Constraint(msg) => RemoteError::InvalidRequest(msg),
        other => RemoteError::Backend(other.to_string()),
    }
}

fn require_filters(op: &str, filters: &[Filter]) -> RemoteResult<()> {
    if filters.is_empty() {
        return Err(RemoteError::InvalidRequest(format!(
            "{} without filters would touch every row",
            op
        )));
    }
    Ok(())
}

impl TableBackend for LocalStore {
    fn select(&self, table: &str, query: &Query, _access_token: Option<&str>) -> RemoteResult<Vec<Value>> {
        self.lock()?.select_rows(table, query).map_err(backend_error)
    }

    fn insert(&self, table: &str, row: &Value, _access_token: Option<&str>) -> RemoteResult<Vec<Value>> {
        let stored = self.lock()?.insert_row(table, row).map_err(backend_error)?;
        Ok(vec![stored])
    }

    fn update(
        &self,
        table: &str,
        patch: &Value,
        filters: &[Filter],
        _access_token: Option<&str>,
    ) -> RemoteResult<()> {
        require_filters("update", filters)?;
        let touched = self
            .lock()?
            .update_rows(table, patch, filters)
            .map_err(backend_error)?;
        tracing::debug!(table, touched, "Local update");
        Ok(())
    }

    fn delete(&self, table: &str, filters: &[Filter], _access_token: Option<&str>) -> RemoteResult<()> {
        require_filters("delete", filters)?;
        let removed = self.lock()?.delete_rows(table, filters).map_err(backend_error)?;
        tracing::debug!(table, removed, "Local delete");
        Ok(())
    }
}
