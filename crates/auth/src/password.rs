//! One-way credential hashing (Argon2id, per-call random salt).

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _};
use thiserror::Error;

use taskforge_core::AppError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<HashError> for AppError {
    fn from(value: HashError) -> Self {
        AppError::Internal(value.to_string())
    }
}

/// Opaque PHC-formatted password hash.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wraps a hash previously produced by [`PasswordHasher::hash`] (e.g. loaded from storage).
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HashedPassword(<redacted>)")
    }
}

/// Credential hasher.
///
/// `Default` uses the Argon2 crate's recommended parameters. The comparison in
/// [`PasswordHasher::verify`] is constant-time inside the primitive.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit cost parameters.
    pub fn with_params(params: argon2::Params) -> Self {
        Self {
            argon: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    pub fn hash(&self, plaintext: &str) -> Result<HashedPassword, HashError> {
        let salt = salt()?;
        self.argon
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| HashedPassword(h.to_string()))
            .map_err(|e| HashError::Hashing(e.to_string()))
    }

    /// `true` iff `plaintext` hashes to `hash`. An unparseable hash never verifies.
    pub fn verify(&self, hash: &HashedPassword, plaintext: &str) -> bool {
        PasswordHash::new(hash.as_str())
            .ok()
            .as_ref()
            .map(|parsed| {
                self.argon
                    .verify_password(plaintext.as_bytes(), parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

impl core::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

fn salt() -> Result<SaltString, HashError> {
    use rand::Rng;
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    SaltString::encode_b64(&bytes).map_err(|e| HashError::Hashing(e.to_string()))
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> PasswordHasher {
    // Minimum-cost parameters keep property tests fast; production uses `default()`.
    let params = argon2::Params::new(8, 1, 1, None).expect("valid argon2 params");
    PasswordHasher::with_params(params)
}
