//! Business audit trail ("who did what").
//!
//! Recording is best-effort: a failing sink is reported through `tracing`
//! and never surfaces to the caller. Opening the sink returns an error and the
//! caller decides whether to run without one.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to open audit log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

type Sink = Box<dyn Write + Send>;

pub struct AuditLog {
    // The lock guards the writer only and is held for a single write.
    sink: Option<Mutex<Sink>>,
}

impl AuditLog {
    /// Open (or create) an append-only audit file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| AuditError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_writer(file))
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Some(Mutex::new(Box::new(writer))),
        }
    }

    /// An audit log that only emits `tracing` events.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn record(&self, user_id: impl Display, role: impl Display, message: &str) {
        ::tracing::info!(target: "audit", user_id = %user_id, role = %role, "{message}");

        let Some(sink) = &self.sink else {
            return;
        };

        let line = format!(
            "{} INFO: UserID: {}, Role: {} - {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            user_id,
            role,
            message
        );

        let result = {
            let mut writer = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            writer
                .write_all(line.as_bytes())
                .and_then(|()| writer.flush())
        };

        if let Err(e) = result {
            ::tracing::warn!(error = %e, "audit log write failed");
        }
    }
}

impl core::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuditLog")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
