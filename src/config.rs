//! Process configuration.
//!
//! [`Config`] is read once at start-up and handed to whatever needs it;
//! nothing else in the crate reads the environment.

use core::net::SocketAddr;

use secrecy::SecretString;

use crate::client::DEFAULT_BASE_URL;
use crate::error::{BffError, Result};
use crate::models::CloverMerchantId;

/// Environment variable holding the Clover API base URL.
pub const BASE_URL_ENV: &str = "CLOVER_BASE_URL";
/// Environment variable holding the static Clover access token.
pub const ACCESS_TOKEN_ENV: &str = "CLOVER_ACCESS_TOKEN";
/// Environment variable holding the static Clover merchant id.
pub const MERCHANT_ID_ENV: &str = "CLOVER_MERCHANT_ID";
/// Environment variable holding the database URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable holding the listen address.
pub const BIND_ENV: &str = "CLOVER_BFF_BIND";
/// Listen address used when [`BIND_ENV`] is unset.
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Runtime settings for the service.
///
/// `Debug` output redacts the access token.
#[derive(Debug)]
pub struct Config {
    /// Clover API base URL.
    pub clover_base_url: String,
    /// Static access token, used when a merchant has no stored token and
    /// for `GET /merchants`.
    pub clover_access_token: Option<SecretString>,
    /// Static merchant id reported by `GET /merchants`.
    pub clover_merchant_id: Option<CloverMerchantId>,
    /// Database URL; `None` means the default file under the data dir.
    pub database_url: Option<String>,
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`BffError::Unconfigured`] if a value is present but
    /// invalid.
    #[inline]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable
    /// name to its value. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`BffError::Unconfigured`] if the listen address does not
    /// parse.
    #[inline]
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_raw = get(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.to_owned());
        let bind_addr = bind_raw.parse().map_err(|err| {
            BffError::Unconfigured(format!("invalid {BIND_ENV} '{bind_raw}': {err}"))
        })?;

        Ok(Self {
            clover_base_url: get(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            clover_access_token: get(ACCESS_TOKEN_ENV).map(SecretString::from),
            clover_merchant_id: get(MERCHANT_ID_ENV).map(CloverMerchantId::new),
            database_url: get(DATABASE_URL_ENV),
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret as _;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|&(key, value)| (key.to_owned(), value.to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.clover_base_url, "https://apisandbox.dev.clover.com");
        assert!(cfg.clover_access_token.is_none());
        assert!(cfg.clover_merchant_id.is_none());
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn reads_all_values() {
        let cfg = config(&[
            ("CLOVER_BASE_URL", "https://api.clover.com"),
            ("CLOVER_ACCESS_TOKEN", "tok"),
            ("CLOVER_MERCHANT_ID", "M1"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("CLOVER_BFF_BIND", "127.0.0.1:9000"),
        ])
        .unwrap();
        assert_eq!(cfg.clover_base_url, "https://api.clover.com");
        assert_eq!(cfg.clover_access_token.unwrap().expose_secret(), "tok");
        assert_eq!(cfg.clover_merchant_id, Some(CloverMerchantId::new("M1".to_owned())));
        assert_eq!(cfg.database_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(cfg.bind_addr.port(), 9000);
    }

    #[test]
    fn empty_token_counts_as_unset() {
        let cfg = config(&[("CLOVER_ACCESS_TOKEN", "  ")]).unwrap();
        assert!(cfg.clover_access_token.is_none());
    }

    #[test]
    fn invalid_bind_is_unconfigured() {
        let result = config(&[("CLOVER_BFF_BIND", "not-an-address")]);
        assert!(matches!(result, Err(BffError::Unconfigured(_))));
    }

    #[test]
    #[allow(clippy::use_debug, reason = "checks the Debug output itself")]
    fn debug_redacts_token() {
        let cfg = config(&[("CLOVER_ACCESS_TOKEN", "very-secret")]).unwrap();
        assert!(!format!("{cfg:?}").contains("very-secret"));
    }
}
