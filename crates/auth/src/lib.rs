//! `taskforge-auth`: credential hashing, session tokens, and authorization.
//!
//! No HTTP and no storage here: persistence is reached through the
//! [`UserStore`] trait.

pub mod accounts;
pub mod action;
pub mod authorize;
pub mod claims;
pub mod identity;
pub mod password;
pub mod roles;
pub mod token;

pub use accounts::{AccountService, NewUser, RegisterUser, UserRecord, UserStore};
pub use action::{Action, Operation, Resource};
pub use authorize::{
    AuthzError, CommandAuthorization, Decision, DenialKind, DenialReason, MemberAttributes,
    Policy, Scope, authorize, check_member_consistency, decide,
};
pub use claims::{TokenClaims, validate_claims};
pub use identity::Identity;
pub use password::{HashError, HashedPassword, PasswordHasher};
pub use roles::Role;
pub use token::{DEFAULT_TOKEN_TTL_SECS, Hs256Tokens, TokenError, TokenIssuer, TokenVerifier};
