//! Session/identity provider.
//!
//! One explicit object owns the signed-in session for the whole app. It is
//! created at startup, handed to every repository, and torn down on sign-out.
//! The session blob is persisted through a [`SessionStore`] under a single
//! fixed key.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fisionet_remote::{AuthBackend, AuthUser, Session, UserUpdate};
use serde_json::{Map, Value};

use crate::db::LocalStore;
use crate::error::{ClinicError, ClinicResult};

/// Key of the persisted session in the key-value store.
pub const SESSION_KEY: &str = "session";

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Metadata key holding the user's display name.
pub const DISPLAY_NAME_KEY: &str = "display_name";

/// Persistence for at most one serialized session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> ClinicResult<Option<Session>>;
    fn save(&self, session: &Session) -> ClinicResult<()>;
    fn clear(&self) -> ClinicResult<()>;
}

impl SessionStore for LocalStore {
    fn load(&self) -> ClinicResult<Option<Session>> {
        let blob = self.lock()?.get_value(SESSION_KEY)?;
        match blob {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, session: &Session) -> ClinicResult<()> {
        let json = serde_json::to_string(session)?;
        self.lock()?.set_value(SESSION_KEY, &json)?;
        Ok(())
    }

    fn clear(&self) -> ClinicResult<()> {
        self.lock()?.delete_value(SESSION_KEY)?;
        Ok(())
    }
}

/// Display name for a user: `display_name` metadata, else the capitalized
/// local part of the email, else `"User"`.
pub fn display_name_for(user: &AuthUser) -> String {
    if let Some(name) = user
        .user_metadata
        .get(DISPLAY_NAME_KEY)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        return name.to_string();
    }

    let local_part = user
        .email
        .as_deref()
        .and_then(|email| email.split('@').next())
        .filter(|part| !part.is_empty());

    match local_part {
        Some(part) => {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => "User".to_string(),
            }
        }
        None => "User".to_string(),
    }
}

fn validate_password(password: &str) -> ClinicResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClinicError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn require_credentials(email: &str, password: &str) -> ClinicResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ClinicError::Validation("email and password are required".into()));
    }
    Ok(())
}

/// Owner of the current authenticated principal.
pub struct SessionProvider {
    /// `None` in offline mode
    auth: Option<Arc<dyn AuthBackend>>,
    store: Arc<dyn SessionStore>,
    session: Mutex<Option<Session>>,
    /// Held while a token refresh is in flight
    refreshing: Mutex<()>,
    /// Fixed principal used when running without an auth service
    offline_user: Option<AuthUser>,
}

impl SessionProvider {
    pub fn new(auth: Arc<dyn AuthBackend>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            auth: Some(auth),
            store,
            session: Mutex::new(None),
            refreshing: Mutex::new(()),
            offline_user: None,
        }
    }

    /// Provider without an auth service; `user` acts as the principal.
    pub fn offline(store: Arc<dyn SessionStore>, user: AuthUser) -> Self {
        Self {
            auth: None,
            store,
            session: Mutex::new(None),
            refreshing: Mutex::new(()),
            offline_user: Some(user),
        }
    }

    fn state(&self) -> MutexGuard<'_, Option<Session>> {
        // Every write replaces the whole value, so a poisoned guard is still consistent.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn auth(&self) -> ClinicResult<&Arc<dyn AuthBackend>> {
        self.auth
            .as_ref()
            .ok_or_else(|| ClinicError::Auth("no auth service configured".into()))
    }

    fn install(&self, session: Session) -> ClinicResult<AuthUser> {
        self.store.save(&session)?;
        let user = session.user.clone();
        *self.state() = Some(session);
        Ok(user)
    }

    /// Restore the persisted session at startup.
    pub fn restore(&self) -> ClinicResult<Option<AuthUser>> {
        self.restore_at(chrono::Utc::now().timestamp())
    }

    /// Restore with an explicit clock (unix seconds). An expired session is
    /// refreshed; a session that cannot be refreshed or decoded is dropped.
    pub fn restore_at(&self, now: i64) -> ClinicResult<Option<AuthUser>> {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(ClinicError::Decode(msg)) => {
                tracing::warn!(error = %msg, "Discarding unreadable stored session");
                self.store.clear()?;
                None
            }
            Err(e) => return Err(e),
        };

        let Some(session) = stored else {
            tracing::debug!("No stored session");
            return Ok(None);
        };

        if !session.is_expired_at(now) {
            tracing::info!(user_id = %session.user.id, "Session restored");
            let user = session.user.clone();
            *self.state() = Some(session);
            return Ok(Some(user));
        }

        let auth = match self.auth() {
            Ok(auth) => auth,
            Err(_) => {
                self.store.clear()?;
                return Ok(None);
            }
        };

        match auth.refresh(&session.refresh_token) {
            Ok(fresh) => {
                tracing::info!(user_id = %fresh.user.id, "Session refreshed on restore");
                self.install(fresh).map(Some)
            }
            Err(e) => {
                let err = ClinicError::from(e);
                tracing::warn!(error = %err, "Stored session could not be refreshed");
                self.store.clear()?;
                match err {
                    ClinicError::Auth(_) => Ok(None),
                    other => Err(other),
                }
            }
        }
    }

    /// Password sign-in.
    pub fn sign_in(&self, email: &str, password: &str) -> ClinicResult<AuthUser> {
        require_credentials(email, password)?;
        let session = self.auth()?.sign_in(email.trim(), password)?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.install(session)
    }

    /// Register a new account. Returns the user when the service signs them
    /// in immediately; `None` when email confirmation is pending.
    pub fn sign_up(&self, name: &str, email: &str, password: &str) -> ClinicResult<Option<AuthUser>> {
        if name.trim().is_empty() {
            return Err(ClinicError::Validation("name is required".into()));
        }
        require_credentials(email, password)?;
        validate_password(password)?;

        let mut metadata = Map::new();
        metadata.insert(DISPLAY_NAME_KEY.to_string(), Value::String(name.trim().to_string()));

        match self.auth()?.sign_up(email.trim(), password, &metadata)? {
            Some(session) => {
                tracing::info!(user_id = %session.user.id, "Signed up and signed in");
                self.install(session).map(Some)
            }
            None => {
                tracing::info!("Signed up, confirmation pending");
                Ok(None)
            }
        }
    }

    /// Drop the session locally and revoke it server-side.
    ///
    /// The local session is always cleared; a failed revoke is logged.
    pub fn sign_out(&self) -> ClinicResult<()> {
        let previous = self.state().take();
        self.store.clear()?;

        if let (Some(session), Some(auth)) = (previous, self.auth.as_ref()) {
            if let Err(e) = auth.sign_out(&session.access_token) {
                tracing::warn!(error = %e, "Server-side sign-out failed");
            }
        }
        tracing::info!("Signed out");
        Ok(())
    }

    /// Merge a new display name and/or change the password.
    pub fn update_profile(
        &self,
        display_name: Option<String>,
        password: Option<String>,
    ) -> ClinicResult<AuthUser> {
        let mut update = UserUpdate::default();
        if let Some(name) = display_name.map(|n| n.trim().to_string()) {
            if name.is_empty() {
                return Err(ClinicError::Validation("display name cannot be blank".into()));
            }
            let mut data = Map::new();
            data.insert(DISPLAY_NAME_KEY.to_string(), Value::String(name));
            update.data = Some(data);
        }
        if let Some(password) = password {
            validate_password(&password)?;
            update.password = Some(password);
        }
        if update.is_empty() {
            return Err(ClinicError::Validation("nothing to update".into()));
        }

        let token = self
            .access_token()?
            .ok_or_else(|| ClinicError::Auth("not signed in".into()))?;
        let user = self.auth()?.update_user(&token, &update)?;

        let mut state = self.state();
        if let Some(session) = state.as_mut() {
            session.user = user.clone();
            self.store.save(session)?;
        }
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    pub fn current_session(&self) -> Option<Session> {
        self.state().clone()
    }

    /// The signed-in user, or the fixed offline principal.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.state()
            .as_ref()
            .map(|s| s.user.clone())
            .or_else(|| self.offline_user.clone())
    }

    /// Bearer token for data-API calls, refreshed first when it has expired.
    pub fn access_token(&self) -> ClinicResult<Option<String>> {
        self.access_token_at(chrono::Utc::now().timestamp())
    }

    /// [`Self::access_token`] with an explicit clock (unix seconds).
    ///
    /// A rejected refresh signs the user out and returns an auth error; a
    /// network failure leaves the session in place.
    pub fn access_token_at(&self, now: i64) -> ClinicResult<Option<String>> {
        let current = self.state().clone();
        let Some(session) = current else {
            return Ok(None);
        };
        if !session.is_expired_at(now) {
            return Ok(Some(session.access_token));
        }
        let Some(auth) = self.auth.as_ref() else {
            return Ok(Some(session.access_token));
        };

        let _refreshing = self.refreshing.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have refreshed while we waited.
        let session = match self.state().clone() {
            Some(latest) if !latest.is_expired_at(now) => return Ok(Some(latest.access_token)),
            Some(latest) => latest,
            None => return Ok(None),
        };

        match auth.refresh(&session.refresh_token) {
            Ok(fresh) => {
                tracing::info!(user_id = %fresh.user.id, "Access token refreshed");
                let token = fresh.access_token.clone();
                self.install(fresh)?;
                Ok(Some(token))
            }
            Err(e) => match ClinicError::from(e) {
                ClinicError::Auth(msg) => {
                    tracing::warn!(error = %msg, "Session expired and could not be refreshed");
                    self.state().take();
                    self.store.clear()?;
                    Err(ClinicError::Auth(format!("session expired: {}", msg)))
                }
                other => {
                    tracing::warn!(error = %other, "Token refresh failed");
                    Err(other)
                }
            },
        }
    }

    /// Principal id, or an auth error when signed out.
    pub fn require_principal(&self) -> ClinicResult<String> {
        self.current_user()
            .map(|u| u.id)
            .ok_or_else(|| ClinicError::Auth("not signed in".into()))
    }

    pub fn display_name(&self) -> String {
        self.current_user()
            .map(|u| display_name_for(&u))
            .unwrap_or_else(|| "User".to_string())
    }
}
