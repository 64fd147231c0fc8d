//! Mirror sync — make the bucket equal the artifact tree.
//!
//! ## Protocol
//!
//! 1. List the bucket.
//! 2. Plan with [`crate::plan`] (pure).
//! 3. Upload assets, then HTML documents.
//! 4. Delete remote keys that no longer exist locally.
//!
//! The run is not atomic. A failure stops at the failing call and leaves the
//! bucket partly updated; re-running converges because the plan is recomputed
//! from the current remote state every time.

use serde::Serialize;

use relaunch_core::BucketName;

use crate::artifact::ArtifactTree;
use crate::error::SyncError;
use crate::plan::{plan, SyncPlan};
use crate::remote::ObjectStore;

/// What a completed sync did.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SyncReport {
    pub uploaded: Vec<String>,
    pub deleted: Vec<String>,
    pub unchanged: usize,
}

/// List the bucket and diff it against `tree` without mutating anything.
pub fn plan_against<S: ObjectStore>(
    store: &S,
    bucket: &BucketName,
    tree: &ArtifactTree,
) -> Result<SyncPlan, SyncError> {
    let remote = store.list_objects(bucket)?;
    tracing::debug!("bucket {bucket} holds {} object(s)", remote.len());
    Ok(plan(&remote, tree))
}

/// Reconcile `bucket` to equal `tree`, including deletions.
pub fn sync<S: ObjectStore>(
    store: &S,
    bucket: &BucketName,
    tree: &ArtifactTree,
) -> Result<SyncReport, SyncError> {
    let plan = plan_against(store, bucket, tree)?;
    apply(store, bucket, tree, &plan)
}

/// Execute a previously computed plan.
pub fn apply<S: ObjectStore>(
    store: &S,
    bucket: &BucketName,
    tree: &ArtifactTree,
    plan: &SyncPlan,
) -> Result<SyncReport, SyncError> {
    if plan.is_noop() {
        tracing::info!("bucket {bucket} already up to date ({} object(s))", plan.unchanged.len());
    }

    let mut report = SyncReport {
        unchanged: plan.unchanged.len(),
        ..SyncReport::default()
    };

    for upload in &plan.uploads {
        let Some(entry) = tree.get(&upload.key) else {
            return Err(SyncError::PlanMismatch {
                key: upload.key.clone(),
            });
        };
        store.put_object(bucket, entry)?;
        tracing::info!("uploaded ({:?}): {}", upload.reason, upload.key);
        report.uploaded.push(upload.key.clone());
    }

    for key in &plan.deletes {
        store.delete_object(bucket, key)?;
        tracing::info!("deleted: {key}");
        report.deleted.push(key.clone());
    }

    Ok(report)
}
