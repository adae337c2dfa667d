//! Stateless session tokens (HS256 JWT).
//!
//! A token moves through `issued -> valid (now < exp) -> expired`; there is no
//! revocation and no renewal.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use taskforge_core::AppError;

use crate::{Identity, TokenClaims, validate_claims};

/// Lifetime of a freshly issued token.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// The only algorithm this service issues or accepts.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    SignatureMismatch,

    #[error("token has expired")]
    Expired,

    #[error("unexpected signing method")]
    UnexpectedSigningMethod,

    /// Internal serialization/signing failure while issuing.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        match value.kind() {
            JwtErrorKind::InvalidSignature => TokenError::SignatureMismatch,
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            JwtErrorKind::InvalidAlgorithm => TokenError::UnexpectedSigningMethod,
            _ => TokenError::Malformed,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Malformed | TokenError::SignatureMismatch => AppError::InvalidToken,
            TokenError::Expired => AppError::TokenExpired,
            TokenError::UnexpectedSigningMethod => AppError::UnexpectedSigningMethod,
            TokenError::Signing(detail) => AppError::Internal(detail),
        }
    }
}

/// Issues signed tokens for an identity.
pub trait TokenIssuer: Send + Sync {
    fn issue_at(&self, identity: Identity, now: DateTime<Utc>) -> Result<String, TokenError>;

    fn issue(&self, identity: Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }
}

/// Verifies a token and reconstructs the identity it carries.
pub trait TokenVerifier: Send + Sync {
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError>;

    fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now())
    }
}

/// HMAC-SHA256 token codec backed by a single shared secret.
#[derive(Clone)]
pub struct Hs256Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256Tokens {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is checked by `validate_claims` against an explicit `now`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = ["exp".to_string()].into_iter().collect();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl core::fmt::Debug for Hs256Tokens {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Tokens")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer for Hs256Tokens {
    fn issue_at(&self, identity: Identity, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = TokenClaims::new(identity, now, self.ttl);
        jsonwebtoken::encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl TokenVerifier for Hs256Tokens {
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        // Reject foreign algorithms before any key material is involved.
        let header = jsonwebtoken::decode_header(token).map_err(|_| TokenError::Malformed)?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(TokenError::UnexpectedSigningMethod);
        }

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)?;
        validate_claims(&data.claims, now)?;

        Ok(data.claims.identity())
    }
}
