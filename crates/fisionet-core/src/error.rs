//! Domain error taxonomy.

use fisionet_remote::RemoteError;
use thiserror::Error;

use crate::db::DbError;

/// Errors surfaced by repositories, caches and the session provider.
///
/// Every failure is local and recoverable by a user-triggered retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClinicError {
    /// Transport failure, or a server failure the client cannot act on.
    #[error("Network error: {0}")]
    Network(String),

    /// Response did not match the expected row shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A singleton lookup matched zero or several rows.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required field is missing (client-side) or the server rejected the payload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No active session where one is required, or the session was refused.
    #[error("Auth error: {0}")]
    Auth(String),

    /// Update/delete on an entity that has no server-assigned id.
    #[error("Unsaved {0} row has no id")]
    Unsaved(&'static str),

    /// Local SQLite store failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type ClinicResult<T> = Result<T, ClinicError>;

impl From<RemoteError> for ClinicError {
    fn from(e: RemoteError) -> Self {
        if e.is_unauthorized() {
            return ClinicError::Auth(e.to_string());
        }
        if e.is_rejected() {
            return ClinicError::Validation(e.to_string());
        }
        match e {
            RemoteError::Network(msg) => ClinicError::Network(msg),
            RemoteError::Decode(msg) => ClinicError::Decode(msg),
            RemoteError::InvalidRequest(msg) => ClinicError::Validation(msg),
            RemoteError::Backend(msg) => ClinicError::Storage(msg),
            other => ClinicError::Network(other.to_string()),
        }
    }
}

impl From<DbError> for ClinicError {
    fn from(e: DbError) -> Self {
        ClinicError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(e: serde_json::Error) -> Self {
        ClinicError::Decode(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::Storage(format!("Lock poisoned: {}", e))
    }
}
