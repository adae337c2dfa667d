//! Use-case wiring: stores, token codec, audit log.

use std::sync::Arc;

use taskforge_auth::{AccountService, Hs256Tokens, PasswordHasher};
use taskforge_infra::{InMemoryProjectStore, InMemoryUserStore};
use taskforge_observability::AuditLog;
use taskforge_projects::ProjectService;

use crate::config::ApiConfig;

pub struct AppServices {
    pub accounts: AccountService,
    pub projects: ProjectService,
    pub tokens: Arc<Hs256Tokens>,
}

impl AppServices {
    pub fn build(config: &ApiConfig) -> Self {
        let tokens = Arc::new(
            Hs256Tokens::new(config.jwt_secret.as_bytes()).with_ttl(config.token_ttl),
        );
        let users = Arc::new(InMemoryUserStore::new());
        let store = Arc::new(InMemoryProjectStore::new());

        let accounts = AccountService::new(users.clone(), PasswordHasher::new(), tokens.clone());
        let projects = ProjectService::new(store.clone(), store, users, Arc::new(open_audit_log(config)));

        Self {
            accounts,
            projects,
            tokens,
        }
    }
}

/// A missing or unwritable audit file is not fatal: the service keeps
/// emitting audit events through `tracing` only.
fn open_audit_log(config: &ApiConfig) -> AuditLog {
    let Some(path) = &config.audit_log_path else {
        return AuditLog::disabled();
    };

    match AuditLog::open(path) {
        Ok(log) => {
            tracing::info!(path = %path.display(), "audit log opened");
            log
        }
        Err(e) => {
            tracing::warn!(error = %e, "audit log unavailable; continuing without it");
            AuditLog::disabled()
        }
    }
}
