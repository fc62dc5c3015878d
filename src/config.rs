use std::net::SocketAddr;
use std::path::PathBuf;

use crate::credentials::{self, CredentialError, CredentialSource, ServiceAccountKey};

/// Application-level constants
pub const APP_NAME: &str = "Wardroom";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Listen address when `WARD_BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// SQLite file used by the `sqlite` backend when `WARD_SQLITE_PATH` is unset.
pub const DEFAULT_SQLITE_PATH: &str = "ward.db";

pub const DEFAULT_SESSION_SECRET: &str = "rtv_secret_hospital_key";
pub const DEFAULT_LOGIN_PASSWORD: &str = "admin123";

/// Default session lifetime: 12 hours.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 12 * 60 * 60;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,wardroom_lib=debug,hyper=warn,reqwest=warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Which document store backs the application.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Firestore {
        key: ServiceAccountKey,
        source: CredentialSource,
    },
    Sqlite(PathBuf),
    Memory,
}

impl StoreConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreConfig::Firestore { .. } => "firestore",
            StoreConfig::Sqlite(_) => "sqlite",
            StoreConfig::Memory => "memory",
        }
    }
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub session_secret: String,
    pub login_password: String,
    pub session_ttl_secs: u64,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("WARD_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "WARD_BIND_ADDR",
                value: bind_raw.clone(),
            })?;

        let session_ttl_secs = match get("WARD_SESSION_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "WARD_SESSION_TTL_SECS",
                    value: raw,
                })?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        let backend = get("WARD_STORE").unwrap_or_else(|| "firestore".to_string());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "firestore" => {
                let (key, source) = credentials::resolve(&get, credentials::LOCAL_KEY_FILE)?;
                StoreConfig::Firestore { key, source }
            }
            "sqlite" => StoreConfig::Sqlite(PathBuf::from(
                get("WARD_SQLITE_PATH").unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string()),
            )),
            "memory" => StoreConfig::Memory,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: "WARD_STORE",
                    value: backend,
                })
            }
        };

        Ok(Self {
            bind_addr,
            store,
            session_secret: get("WARD_SESSION_SECRET")
                .unwrap_or_else(|| DEFAULT_SESSION_SECRET.to_string()),
            login_password: get("WARD_LOGIN_PASSWORD")
                .unwrap_or_else(|| DEFAULT_LOGIN_PASSWORD.to_string()),
            session_ttl_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn memory_backend_uses_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("WARD_STORE", "memory")])).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.session_secret, DEFAULT_SESSION_SECRET);
        assert_eq!(config.login_password, DEFAULT_LOGIN_PASSWORD);
        assert_eq!(config.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
        assert_eq!(config.store.backend_name(), "memory");
    }

    #[test]
    fn sqlite_backend_reads_path() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("WARD_STORE", "SQLite"),
            ("WARD_SQLITE_PATH", "/tmp/ward-test.db"),
        ]))
        .unwrap();
        match config.store {
            StoreConfig::Sqlite(path) => assert_eq!(path, PathBuf::from("/tmp/ward-test.db")),
            other => panic!("expected sqlite, got {}", other.backend_name()),
        }
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("WARD_STORE", "memory"),
            ("WARD_BIND_ADDR", "0.0.0.0:8080"),
            ("WARD_SESSION_SECRET", "s3cret"),
            ("WARD_LOGIN_PASSWORD", "open-sesame"),
            ("WARD_SESSION_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.session_secret, "s3cret");
        assert_eq!(config.login_password, "open-sesame");
        assert_eq!(config.session_ttl_secs, 60);
    }

    #[test]
    fn empty_value_counts_as_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("WARD_STORE", "memory"),
            ("WARD_LOGIN_PASSWORD", "  "),
        ]))
        .unwrap();
        assert_eq!(config.login_password, DEFAULT_LOGIN_PASSWORD);
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("WARD_STORE", "memory"),
            ("WARD_BIND_ADDR", "not-an-addr"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "WARD_BIND_ADDR", .. }));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("WARD_STORE", "memory"),
            ("WARD_SESSION_TTL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "WARD_SESSION_TTL_SECS", .. }));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("WARD_STORE", "mongo")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "WARD_STORE", .. }));
    }

    #[test]
    fn app_name_is_wardroom() {
        assert_eq!(APP_NAME, "Wardroom");
    }

    #[test]
    fn app_version_is_semver() {
        let parts: Vec<&str> = APP_VERSION.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.parse::<u64>().is_ok()));
    }
}
