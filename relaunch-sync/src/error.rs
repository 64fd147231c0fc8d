//! Error types for relaunch-sync.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use relaunch_core::{ProviderError, RunError};

/// Which provider call a sync failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    List,
    Put,
    Delete,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOperation::List => write!(f, "list"),
            SyncOperation::Put => write!(f, "put"),
            SyncOperation::Delete => write!(f, "delete"),
        }
    }
}

/// All errors that can arise from scanning or mirroring.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Reading the local artifact tree failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking the local artifact tree failed.
    #[error("cannot walk artifact tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// The provider rejected a call. `key` is `None` for bucket listings.
    #[error("{operation} failed{}: {source}", key_suffix(.key))]
    Provider {
        operation: SyncOperation,
        key: Option<String>,
        #[source]
        source: ProviderError,
    },

    /// The provider CLI could not be started.
    #[error("{operation} failed: {source}")]
    Run {
        operation: SyncOperation,
        #[source]
        source: RunError,
    },

    /// A plan was applied to a tree it was not computed from.
    #[error("planned upload `{key}` is not in the artifact tree")]
    PlanMismatch { key: String },

    /// The provider answered with output we cannot interpret.
    #[error("{operation} returned unexpected output: {reason}")]
    Decode {
        operation: SyncOperation,
        reason: String,
    },
}

impl SyncError {
    /// The provider call this error came from, if any.
    pub fn operation(&self) -> Option<SyncOperation> {
        match self {
            SyncError::Provider { operation, .. }
            | SyncError::Run { operation, .. }
            | SyncError::Decode { operation, .. } => Some(*operation),
            SyncError::Io { .. } | SyncError::Walk(_) | SyncError::PlanMismatch { .. } => None,
        }
    }
}

fn key_suffix(key: &Option<String>) -> String {
    key.as_ref().map(|k| format!(" for `{k}`")).unwrap_or_default()
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_names_operation_key_and_code() {
        let err = SyncError::Provider {
            operation: SyncOperation::Put,
            key: Some("app.a1b2.js".to_string()),
            source: ProviderError::new(Some("AccessDenied"), "Access Denied"),
        };
        assert_eq!(
            err.to_string(),
            "put failed for `app.a1b2.js`: [AccessDenied] Access Denied"
        );
        assert_eq!(err.operation(), Some(SyncOperation::Put));
    }

    #[test]
    fn listing_error_has_no_key() {
        let err = SyncError::Provider {
            operation: SyncOperation::List,
            key: None,
            source: ProviderError::new(Some("NoSuchBucket"), "The specified bucket does not exist"),
        };
        assert!(err.to_string().starts_with("list failed: [NoSuchBucket]"));
    }
}
