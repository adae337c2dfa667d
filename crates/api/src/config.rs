//! Process configuration, read from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use taskforge_auth::DEFAULT_TOKEN_TTL_SECS;

const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_AUDIT_LOG_PATH: &str = "business_operations.log";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BIND_ADDR {0:?} is not a socket address")]
    InvalidBindAddr(String),

    #[error("TOKEN_TTL_SECS {0:?} is not a positive number of seconds")]
    InvalidTokenTtl(String),
}

#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// `None` disables the audit file; audit events still go to `tracing`.
    pub audit_log_path: Option<PathBuf>,
}

impl ApiConfig {
    /// Read `JWT_SECRET`, `BIND_ADDR`, `TOKEN_TTL_SECS`, and `AUDIT_LOG_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_addr.clone()))?;

        let token_ttl = match lookup("TOKEN_TTL_SECS") {
            None => Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(secs) if secs > 0 => Duration::seconds(secs),
                _ => return Err(ConfigError::InvalidTokenTtl(raw)),
            },
        };

        let audit_log_path = match lookup("AUDIT_LOG_PATH") {
            None => Some(PathBuf::from(DEFAULT_AUDIT_LOG_PATH)),
            Some(path) if path.is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            audit_log_path,
        })
    }

    /// Loopback config without an audit file.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.to_string(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            audit_log_path: None,
        }
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("audit_log_path", &self.audit_log_path)
            .finish()
    }
}
