//! Durable storage for the session record.
//!
//! One JSON record under a fixed namespace, read once at process start and
//! overwritten on every session transition. Storage failures degrade to an
//! empty session with a warning; they never take the console down, and a
//! failed write never fails the transition that triggered it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Principal;

/// Persisted session record: credential and principal as one unit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Opaque bearer token.
    pub credential: String,
    /// The authenticated identity.
    pub principal: Principal,
}

impl std::fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedSession")
            .field("credential", &"[REDACTED]")
            .field("principal", &self.principal)
            .finish()
    }
}

/// File-backed store for the session record.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store over the given record path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the persisted record.
    ///
    /// A missing, unreadable, or corrupt record yields `None`.
    pub async fn load(&self) -> Option<PersistedSession> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Failed to read session record"
                );
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Discarding corrupt session record"
                );
                None
            }
        }
    }

    /// Overwrite the persisted record.
    pub async fn save(&self, record: &PersistedSession) {
        let bytes = match serde_json::to_vec_pretty(record) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "Failed to encode session record");
                return;
            }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty())
            && let Err(err) = tokio::fs::create_dir_all(parent).await
        {
            warn!(
                path = %parent.display(),
                error = %err,
                "Failed to create state directory"
            );
            return;
        }

        if let Err(err) = tokio::fs::write(&self.path, bytes).await {
            warn!(
                path = %self.path.display(),
                error = %err,
                "Failed to persist session record"
            );
        }
    }

    /// Remove the persisted record. Removing an absent record is fine.
    pub async fn clear(&self) {
        if let Err(err) = tokio::fs::remove_file(&self.path).await
            && err.kind() != std::io::ErrorKind::NotFound
        {
            warn!(
                path = %self.path.display(),
                error = %err,
                "Failed to remove session record"
            );
        }
    }
}
