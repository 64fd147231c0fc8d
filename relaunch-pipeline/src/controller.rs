//! Pipeline controller.
//!
//! ```text
//! Idle → RecordLoaded → Built → Synced → Invalidated → Done
//!   └──────────┴──────────┴────────┴──────────→ Failed(stage, cause)
//! ```
//!
//! Stages run strictly in sequence on the calling thread. The controller adds
//! no retries, polling or timeouts of its own and performs no rollback: a
//! failure is reported with its stage and the pipeline stops.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use relaunch_core::{record, BucketName, CommandRunner, DeploymentRecord, DistributionId};
use relaunch_sync::{mirror, ArtifactTree, ObjectStore, SyncPlan, SyncReport};

use crate::build::BuildStep;
use crate::error::{FailureCause, PipelineError, Stage};
use crate::invalidate::{invalidate_all, CdnClient, InvalidationTicket};
use crate::lock::RunLock;

/// Shown on success; CDN propagation is asynchronous.
pub const PROPAGATION_ADVISORY: &str =
    "CDN invalidation is in progress; edge caches usually refresh within 5 minutes.";

/// Explicit configuration for one run. Nothing is read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub record_path: PathBuf,
}

/// Controller states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    RecordLoaded,
    Built,
    Synced,
    Invalidated,
    Done,
    /// Terminal. `reason` is the rendered cause; the typed cause is returned
    /// from [`Pipeline::run`].
    Failed { stage: Stage, reason: String },
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::RecordLoaded => write!(f, "record-loaded"),
            PipelineState::Built => write!(f, "built"),
            PipelineState::Synced => write!(f, "synced"),
            PipelineState::Invalidated => write!(f, "invalidated"),
            PipelineState::Done => write!(f, "done"),
            PipelineState::Failed { stage, .. } => write!(f, "failed({stage})"),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub url: String,
    pub bucket: BucketName,
    pub distribution: DistributionId,
    pub sync: SyncReport,
    pub invalidation: InvalidationTicket,
    pub advisory: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Outcome of a dry run: what `run` would change.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub url: String,
    pub bucket: BucketName,
    pub artifacts: usize,
    pub artifact_bytes: u64,
    pub plan: SyncPlan,
}

/// Sequences record → build → sync → invalidate.
pub struct Pipeline<R, S, C> {
    config: PipelineConfig,
    build: BuildStep<R>,
    store: S,
    cdn: C,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl<R, S, C> Pipeline<R, S, C>
where
    R: CommandRunner,
    S: ObjectStore,
    C: CdnClient,
{
    pub fn new(config: PipelineConfig, build: BuildStep<R>, store: S, cdn: C) -> Self {
        Self {
            config,
            build,
            store,
            cdn,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Every state visited so far, starting with `Idle`.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Run the full update. Callable once.
    pub fn run(&mut self) -> Result<PipelineReport, PipelineError> {
        let started_at = Utc::now();
        let (record, _lock) = self.load_record()?;
        let tree = self.build()?;

        let sync = self.stage(Stage::Sync, |p| {
            mirror::sync(&p.store, &record.bucket_name, &tree)
        })?;
        tracing::info!(
            "synced {}: {} uploaded, {} deleted, {} unchanged",
            record.bucket_name,
            sync.uploaded.len(),
            sync.deleted.len(),
            sync.unchanged
        );
        self.transition(PipelineState::Synced);

        let invalidation = self.stage(Stage::Invalidate, |p| {
            invalidate_all(&p.cdn, &record.distribution_id)
        })?;
        self.transition(PipelineState::Invalidated);
        self.transition(PipelineState::Done);

        Ok(PipelineReport {
            url: record.public_url(),
            bucket: record.bucket_name,
            distribution: record.distribution_id,
            sync,
            invalidation,
            advisory: PROPAGATION_ADVISORY.to_string(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Load, build and diff against the bucket without mutating it.
    /// Leaves the controller in `Built`.
    pub fn plan(&mut self) -> Result<PlanReport, PipelineError> {
        let (record, _lock) = self.load_record()?;
        let tree = self.build()?;
        let plan = self.stage(Stage::Sync, |p| {
            mirror::plan_against(&p.store, &record.bucket_name, &tree)
        })?;
        Ok(PlanReport {
            url: record.public_url(),
            bucket: record.bucket_name,
            artifacts: tree.len(),
            artifact_bytes: tree.total_bytes(),
            plan,
        })
    }

    fn load_record(&mut self) -> Result<(DeploymentRecord, RunLock), PipelineError> {
        if self.state != PipelineState::Idle {
            return Err(PipelineError::new(Stage::Precondition, FailureCause::AlreadyRun));
        }
        let path = self.config.record_path.clone();
        let record = self.stage(Stage::Precondition, |_| record::load_at(&path))?;
        let lock = self.stage(Stage::Precondition, |_| RunLock::acquire(&path))?;
        tracing::info!(
            bucket = %record.bucket_name,
            distribution = %record.distribution_id,
            "deployment target: {}",
            record.public_url()
        );
        self.transition(PipelineState::RecordLoaded);
        Ok((record, lock))
    }

    fn build(&mut self) -> Result<ArtifactTree, PipelineError> {
        let tree = self.stage(Stage::Build, |p| p.build.build())?;
        self.transition(PipelineState::Built);
        Ok(tree)
    }

    /// Run one step; on error move to `Failed(stage, cause)`.
    fn stage<T, E>(
        &mut self,
        stage: Stage,
        step: impl FnOnce(&Self) -> Result<T, E>,
    ) -> Result<T, PipelineError>
    where
        E: Into<FailureCause>,
    {
        step(self).map_err(|err| {
            let err = PipelineError::new(stage, err);
            tracing::error!("{err}");
            self.transition(PipelineState::Failed {
                stage,
                reason: err.cause.to_string(),
            });
            err
        })
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!("pipeline: {} → {next}", self.state);
        self.state = next.clone();
        self.history.push(next);
    }
}
