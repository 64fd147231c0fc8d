//! # relaunch-sync
//!
//! Mirror synchronisation of a local artifact tree onto an object-storage
//! bucket.
//!
//! Scan the build output with [`ArtifactTree::scan`], compute the difference
//! against the bucket with [`plan`], and apply it with [`mirror::sync`]. The
//! provider is reached through the [`ObjectStore`] port; [`AwsCliObjectStore`]
//! is the production adapter.

pub mod artifact;
pub mod aws;
pub mod error;
pub mod mirror;
pub mod plan;
pub mod remote;

pub use artifact::{ArtifactEntry, ArtifactTree};
pub use aws::AwsCliObjectStore;
pub use error::{SyncError, SyncOperation};
pub use mirror::{sync, SyncReport};
pub use plan::{plan, PlannedUpload, SyncPlan, UploadReason};
pub use remote::{ObjectStore, RemoteObject, RemoteObjectSet};
