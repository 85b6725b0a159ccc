//! Backend seams.
//!
//! The core crate only talks to these traits; the HTTP clients in this crate
//! and the offline SQLite store in the core crate implement them.

use serde_json::{Map, Value};

use crate::auth::{AuthUser, Session, UserUpdate};
use crate::error::RemoteResult;
use crate::query::{Filter, Query};

/// Row-oriented table API.
///
/// `access_token` is the signed-in user's bearer token; `None` means the
/// request goes out with the anonymous key only.
pub trait TableBackend: Send + Sync {
    /// Fetch rows matching the query.
    fn select(&self, table: &str, query: &Query, access_token: Option<&str>)
        -> RemoteResult<Vec<Value>>;

    /// Insert one row and return the stored representation(s).
    fn insert(&self, table: &str, row: &Value, access_token: Option<&str>)
        -> RemoteResult<Vec<Value>>;

    /// Apply `patch` to every row matching `filters`.
    fn update(
        &self,
        table: &str,
        patch: &Value,
        filters: &[Filter],
        access_token: Option<&str>,
    ) -> RemoteResult<()>;

    /// Delete every row matching `filters`. Zero matches is not an error.
    fn delete(&self, table: &str, filters: &[Filter], access_token: Option<&str>)
        -> RemoteResult<()>;
}

/// Hosted authentication API.
pub trait AuthBackend: Send + Sync {
    /// Password grant.
    fn sign_in(&self, email: &str, password: &str) -> RemoteResult<Session>;

    /// Register a new account. Returns a session when the service signs the
    /// user in immediately (email confirmation disabled).
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &Map<String, Value>,
    ) -> RemoteResult<Option<Session>>;

    /// Exchange a refresh token for a new session.
    fn refresh(&self, refresh_token: &str) -> RemoteResult<Session>;

    /// Revoke the session server-side.
    fn sign_out(&self, access_token: &str) -> RemoteResult<()>;

    /// Merge metadata and/or change the password of the signed-in user.
    fn update_user(&self, access_token: &str, update: &UserUpdate) -> RemoteResult<AuthUser>;
}
