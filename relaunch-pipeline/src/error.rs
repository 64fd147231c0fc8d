//! Error surface for the build step, the invalidation step and the
//! pipeline controller.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use relaunch_core::{DistributionId, ProviderError, RecordError, RunError};
use relaunch_sync::SyncError;

/// Toolchain failures. None of these are retried.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("build command is empty")]
    EmptyCommand,

    #[error("refusing to clean artifact directory {dir}: {reason}")]
    UnsafeArtifactDir { dir: PathBuf, reason: &'static str },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot start build toolchain: {0}")]
    Spawn(#[from] RunError),

    #[error("`{command}` failed with {status}{}", tail_suffix(.stderr_tail))]
    Exit {
        command: String,
        code: Option<i32>,
        status: String,
        stderr_tail: String,
    },

    #[error("build reported success but produced no files in {dir}")]
    MissingArtifacts { dir: PathBuf },

    #[error("cannot read build output: {0}")]
    Scan(#[from] SyncError),
}

fn tail_suffix(tail: &str) -> String {
    if tail.is_empty() {
        String::new()
    } else {
        format!("\n{tail}")
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BuildError {
    BuildError::Io {
        path: path.into(),
        source,
    }
}

/// The CDN refused (or never received) the purge request.
#[derive(Debug, Error)]
pub enum InvalidationError {
    #[error("invalidation of distribution {distribution} rejected: {source}")]
    Rejected {
        distribution: DistributionId,
        #[source]
        source: ProviderError,
    },

    #[error("cannot run CDN CLI: {0}")]
    Run(#[from] RunError),

    #[error("CDN returned unexpected output: {reason}")]
    Decode { reason: String },
}

impl InvalidationError {
    /// The provider throttled the request; re-running later will likely work.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, InvalidationError::Rejected { source, .. } if source.is_rate_limit())
    }
}

/// Failure to take the single-run lock.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("another update is already running against {path}")]
    Held { path: PathBuf },

    #[error("cannot lock {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Precondition,
    Build,
    Sync,
    Invalidate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Precondition => write!(f, "precondition"),
            Stage::Build => write!(f, "build"),
            Stage::Sync => write!(f, "sync"),
            Stage::Invalidate => write!(f, "invalidate"),
        }
    }
}

/// Underlying cause of a pipeline failure.
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Locked(#[from] LockError),

    #[error("pipeline has already run; create a new one")]
    AlreadyRun,

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Invalidation(#[from] InvalidationError),
}

/// `Failed(stage, cause)`.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {cause}")]
pub struct PipelineError {
    pub stage: Stage,
    pub cause: FailureCause,
}

impl PipelineError {
    pub fn new(stage: Stage, cause: impl Into<FailureCause>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }

    /// True when content sync finished before the failure, i.e. the new site
    /// is live at the origin and only the edge purge is missing.
    pub fn content_published(&self) -> bool {
        self.stage == Stage::Invalidate
    }

    /// True when no remote state can have been touched.
    pub fn remote_untouched(&self) -> bool {
        matches!(self.stage, Stage::Precondition | Stage::Build)
    }
}
