//! Pure mirror-diff planning.
//!
//! [`plan`] partitions the union of remote and local keys into uploads,
//! deletes and unchanged objects without performing any I/O. Upload order is
//! part of the plan: non-HTML assets first, HTML entry documents after them,
//! so an interrupted run never publishes a page that references a bundle that
//! has not been uploaded yet. Deletes are always applied last.

use serde::Serialize;

use crate::artifact::ArtifactTree;
use crate::remote::RemoteObjectSet;

/// Why a key is uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadReason {
    /// Absent remotely.
    New,
    /// Present remotely with a different (or unknown) digest.
    Changed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedUpload {
    pub key: String,
    pub reason: UploadReason,
}

/// The reconciliation needed to make the bucket equal the artifact tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SyncPlan {
    /// In execution order.
    pub uploads: Vec<PlannedUpload>,
    /// Remote keys absent locally, sorted.
    pub deletes: Vec<String>,
    /// Keys present on both sides with the same digest, sorted.
    pub unchanged: Vec<String>,
}

impl SyncPlan {
    /// Nothing to upload and nothing to delete.
    pub fn is_noop(&self) -> bool {
        self.uploads.is_empty() && self.deletes.is_empty()
    }
}

/// Diff `remote` against `local`.
pub fn plan(remote: &RemoteObjectSet, local: &ArtifactTree) -> SyncPlan {
    let mut assets = Vec::new();
    let mut documents = Vec::new();
    let mut unchanged = Vec::new();

    for entry in local.iter() {
        let reason = match remote.get(&entry.key) {
            None => Some(UploadReason::New),
            Some(obj) if obj.digest.as_deref() == Some(entry.digest.as_str()) => None,
            Some(_) => Some(UploadReason::Changed),
        };
        match reason {
            None => unchanged.push(entry.key.clone()),
            Some(reason) => {
                let upload = PlannedUpload {
                    key: entry.key.clone(),
                    reason,
                };
                if entry.is_html() {
                    documents.push(upload);
                } else {
                    assets.push(upload);
                }
            }
        }
    }

    let deletes = remote
        .keys()
        .filter(|key| !local.contains(key))
        .cloned()
        .collect();

    assets.extend(documents);
    SyncPlan {
        uploads: assets,
        deletes,
        unchanged,
    }
}
