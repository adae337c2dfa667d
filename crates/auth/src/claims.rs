use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use taskforge_core::UserId;

use crate::{Identity, Role, TokenError};

/// Signed token payload.
///
/// Field names follow the registered JWT claim names so that the encoded token
/// stays readable by standard tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id.
    pub sub: u32,

    pub role: Role,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(identity: Identity, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = issued_at + ttl;
        Self {
            sub: identity.user_id.get(),
            role: identity.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(UserId::new(self.sub), self.role)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// Deterministically validate decoded claims against `now`.
///
/// A token is valid while `now < exp`; there is no leeway.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.exp <= claims.iat {
        return Err(TokenError::Malformed);
    }
    if now.timestamp() >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}
