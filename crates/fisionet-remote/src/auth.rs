//! Auth API client (GoTrue dialect).

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::backend::AuthBackend;
use crate::build_client;
use crate::error::{ensure_success, RemoteResult};

/// Authenticated principal as returned by the auth API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    /// Principal id, stamped as `therapist_id` on owned rows
    pub id: String,
    pub email: Option<String>,
    /// Free-form profile metadata (`display_name`, ...)
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

/// Signed-in session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds at issue time
    #[serde(default)]
    pub expires_in: i64,
    /// Absolute expiry (unix seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Whether the access token is expired at `now` (unix seconds).
    ///
    /// Sessions without an absolute expiry are treated as valid; the data API
    /// will answer 401 if they are not.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// Profile update payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserUpdate {
    /// Metadata keys to merge into `user_metadata`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.data.as_ref().map(|d| d.is_empty()).unwrap_or(true) && self.password.is_none()
    }
}

/// Sign-up answers either with a full session or with the bare user when
/// email confirmation is pending.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    User(AuthUser),
}

/// HTTP client for the auth API.
pub struct AuthClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    /// Create a client for `{base_url}/auth/v1`.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> RemoteResult<Self> {
        Ok(Self::with_client(build_client(timeout_secs)?, base_url, api_key))
    }

    /// Reuse an existing [`Client`] (shared connection pool).
    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn token_grant(&self, grant_type: &str, body: &Value) -> RemoteResult<Session> {
        let response = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.api_key)
            .json(body)
            .send()?;

        let text = ensure_success(response)?.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl AuthBackend for AuthClient {
    fn sign_in(&self, email: &str, password: &str) -> RemoteResult<Session> {
        tracing::debug!(email, "password sign-in");
        self.token_grant(
            "password",
            &serde_json::json!({ "email": email, "password": password }),
        )
    }

    fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &Map<String, Value>,
    ) -> RemoteResult<Option<Session>> {
        tracing::debug!(email, "sign-up");
        let response = self
            .client
            .post(self.endpoint("signup"))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": metadata,
            }))
            .send()?;

        let text = ensure_success(response)?.text()?;
        match serde_json::from_str::<SignUpResponse>(&text)? {
            SignUpResponse::Session(session) => Ok(Some(session)),
            SignUpResponse::User(_) => Ok(None),
        }
    }

    fn refresh(&self, refresh_token: &str) -> RemoteResult<Session> {
        self.token_grant(
            "refresh_token",
            &serde_json::json!({ "refresh_token": refresh_token }),
        )
    }

    fn sign_out(&self, access_token: &str) -> RemoteResult<()> {
        let response = self
            .client
            .post(self.endpoint("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()?;
        ensure_success(response)?;
        Ok(())
    }

    fn update_user(&self, access_token: &str, update: &UserUpdate) -> RemoteResult<AuthUser> {
        let response = self
            .client
            .put(self.endpoint("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(update)
            .send()?;

        let text = ensure_success(response)?.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}
