//! Error types for relaunch-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading the deployment record.
///
/// Every variant is a precondition failure: none is worth retrying, and the
/// pipeline must not touch any remote target after seeing one.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record file did not exist at the configured path.
    #[error("deployment record not found at {path}; run the provisioning flow first")]
    RecordNotFound { path: PathBuf },

    /// The record parsed badly or a required field is missing/empty.
    #[error("deployment record at {path} is malformed: {reason}")]
    RecordMalformed { path: PathBuf, reason: String },

    /// Underlying I/O failure other than "not found" (permission denied, etc.).
    #[error("I/O error reading deployment record at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to start an external program at all.
///
/// A program that starts and then exits non-zero is *not* a `RunError`; that
/// is reported through [`crate::ExitOutcome`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
