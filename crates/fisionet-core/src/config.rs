//! Client configuration.

use crate::error::{ClinicError, ClinicResult};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Public (anon) API key
    pub anon_key: String,
    /// HTTP request timeout in seconds (default: `30`)
    pub request_timeout_secs: u64,
    /// Local SQLite file for the persisted session (`None` = in-memory)
    pub database_path: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            database_path: None,
        }
    }

    /// Load from environment variables, reading a `.env` file first if present.
    ///
    /// | Env Var                 | Default    |
    /// |-------------------------|------------|
    /// | `FISIONET_URL`          | required   |
    /// | `FISIONET_ANON_KEY`     | required   |
    /// | `FISIONET_TIMEOUT_SECS` | `30`       |
    /// | `FISIONET_DB_PATH`      | in-memory  |
    pub fn from_env() -> ClinicResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ClinicResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ClinicError::Validation(format!("{} must be set", key)))
        };

        let base_url = required("FISIONET_URL")?;
        let anon_key = required("FISIONET_ANON_KEY")?;

        let request_timeout_secs = match lookup("FISIONET_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ClinicError::Validation(format!(
                    "FISIONET_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let database_path = lookup("FISIONET_DB_PATH").filter(|p| !p.trim().is_empty());

        let config = Self {
            base_url,
            anon_key,
            request_timeout_secs,
            database_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the HTTP layer cannot use.
    pub fn validate(&self) -> ClinicResult<()> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ClinicError::Validation(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.anon_key.trim().is_empty() {
            return Err(ClinicError::Validation("anon key must be set".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ClinicError::Validation("request timeout must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("FISIONET_URL", "https://clinic.example.co"),
            ("FISIONET_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.database_path, None);
        assert_eq!(config, ClientConfig::new("https://clinic.example.co", "anon"));
    }

    #[test]
    fn test_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("FISIONET_URL", "https://clinic.example.co"),
            ("FISIONET_ANON_KEY", "anon"),
            ("FISIONET_TIMEOUT_SECS", "10"),
            ("FISIONET_DB_PATH", "/data/fisionet.db"),
        ]))
        .unwrap();

        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.database_path.as_deref(), Some("/data/fisionet.db"));
    }

    #[test]
    fn test_missing_url_is_validation_error() {
        let err = ClientConfig::from_lookup(lookup(&[("FISIONET_ANON_KEY", "anon")])).unwrap_err();
        assert_eq!(err, ClinicError::Validation("FISIONET_URL must be set".into()));
    }

    #[test]
    fn test_blank_key_is_validation_error() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("FISIONET_URL", "https://clinic.example.co"),
            ("FISIONET_ANON_KEY", "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ClinicError::Validation(_)));
    }

    #[test]
    fn test_bad_timeout() {
        let base = [
            ("FISIONET_URL", "https://clinic.example.co"),
            ("FISIONET_ANON_KEY", "anon"),
        ];
        let mut vars = base.to_vec();
        vars.push(("FISIONET_TIMEOUT_SECS", "soon"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = base.to_vec();
        vars.push(("FISIONET_TIMEOUT_SECS", "0"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_url_scheme_checked() {
        let config = ClientConfig::new("clinic.example.co", "anon");
        assert!(config.validate().is_err());
    }
}
