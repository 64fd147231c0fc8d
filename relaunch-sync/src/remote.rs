//! Remote object model and the object-storage provider port.

use std::collections::BTreeMap;

use serde::Serialize;

use relaunch_core::BucketName;

use crate::artifact::ArtifactEntry;
use crate::error::SyncError;

/// An object currently stored in the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteObject {
    pub key: String,
    /// SHA-256 hex digest recorded at upload time. `None` for objects this
    /// tool did not upload; those are always treated as changed.
    pub digest: Option<String>,
}

impl RemoteObject {
    pub fn new(key: impl Into<String>, digest: Option<&str>) -> Self {
        Self {
            key: key.into(),
            digest: digest.map(str::to_owned),
        }
    }
}

/// Remote objects keyed by object key.
pub type RemoteObjectSet = BTreeMap<String, RemoteObject>;

/// The three provider operations mirror sync is built from.
///
/// Every method blocks for the duration of the provider call and relies on
/// the provider's own timeout behaviour.
pub trait ObjectStore {
    fn list_objects(&self, bucket: &BucketName) -> Result<RemoteObjectSet, SyncError>;

    /// Upload `entry` under `entry.key`, recording its digest.
    fn put_object(&self, bucket: &BucketName, entry: &ArtifactEntry) -> Result<(), SyncError>;

    fn delete_object(&self, bucket: &BucketName, key: &str) -> Result<(), SyncError>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn list_objects(&self, bucket: &BucketName) -> Result<RemoteObjectSet, SyncError> {
        (**self).list_objects(bucket)
    }

    fn put_object(&self, bucket: &BucketName, entry: &ArtifactEntry) -> Result<(), SyncError> {
        (**self).put_object(bucket, entry)
    }

    fn delete_object(&self, bucket: &BucketName, key: &str) -> Result<(), SyncError> {
        (**self).delete_object(bucket, key)
    }
}
