//! `aws s3api` adapter for [`ObjectStore`].
//!
//! Content digests live in user metadata (`x-amz-meta-sha256`) because
//! listings only expose ETags, which are not content hashes for multipart
//! uploads. Listing therefore costs one `head-object` per key, and each call
//! is a separate `aws` process: a bucket with thousands of objects takes
//! minutes to list. Folder placeholder keys (ending in `/`) are listed without
//! a digest.

use serde::Deserialize;

use relaunch_core::{AwsCli, BucketName, CommandRunner, CommandSpec, ExitOutcome, ProviderError};

use crate::artifact::ArtifactEntry;
use crate::error::{SyncError, SyncOperation};
use crate::remote::{ObjectStore, RemoteObject, RemoteObjectSet};

/// User-metadata key holding the SHA-256 digest.
pub const DIGEST_METADATA_KEY: &str = "sha256";

#[derive(Debug, Deserialize)]
struct ListObjectsOutput {
    #[serde(rename = "Contents", default)]
    contents: Vec<ListedObject>,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    #[serde(rename = "Key")]
    key: String,
}

#[derive(Debug, Deserialize)]
struct HeadObjectOutput {
    #[serde(rename = "Metadata", default)]
    metadata: std::collections::HashMap<String, String>,
}

/// Object store reached through the `aws` CLI.
#[derive(Debug, Clone)]
pub struct AwsCliObjectStore<R> {
    cli: AwsCli,
    runner: R,
}

impl<R: CommandRunner> AwsCliObjectStore<R> {
    pub fn new(cli: AwsCli, runner: R) -> Self {
        Self { cli, runner }
    }

    fn call(
        &self,
        spec: CommandSpec,
        operation: SyncOperation,
        key: Option<&str>,
    ) -> Result<ExitOutcome, SyncError> {
        let outcome = self
            .runner
            .run(&spec)
            .map_err(|source| SyncError::Run { operation, source })?;
        if !outcome.success() {
            return Err(SyncError::Provider {
                operation,
                key: key.map(str::to_owned),
                source: ProviderError::from_outcome(&outcome),
            });
        }
        Ok(outcome)
    }

    fn head_digest(&self, bucket: &BucketName, key: &str) -> Result<Option<String>, SyncError> {
        let spec = self
            .cli
            .command("s3api", "head-object")
            .args(["--bucket", bucket.0.as_str(), "--key", key]);
        let outcome = self.call(spec, SyncOperation::List, Some(key))?;
        let head: HeadObjectOutput =
            serde_json::from_str(&outcome.stdout).map_err(|e| SyncError::Decode {
                operation: SyncOperation::List,
                reason: format!("head-object `{key}`: {e}"),
            })?;
        Ok(head.metadata.get(DIGEST_METADATA_KEY).cloned())
    }
}

impl<R: CommandRunner> ObjectStore for AwsCliObjectStore<R> {
    fn list_objects(&self, bucket: &BucketName) -> Result<RemoteObjectSet, SyncError> {
        let spec = self
            .cli
            .command("s3api", "list-objects-v2")
            .args(["--bucket", bucket.0.as_str()]);
        let outcome = self.call(spec, SyncOperation::List, None)?;

        // An empty bucket prints nothing at all.
        let listing = if outcome.stdout.trim().is_empty() {
            ListObjectsOutput { contents: Vec::new() }
        } else {
            serde_json::from_str(&outcome.stdout).map_err(|e| SyncError::Decode {
                operation: SyncOperation::List,
                reason: e.to_string(),
            })?
        };

        let mut objects = RemoteObjectSet::new();
        for listed in listing.contents {
            // Folder placeholders carry no digest of ours.
            let digest = if listed.key.ends_with('/') {
                None
            } else {
                self.head_digest(bucket, &listed.key)?
            };
            objects.insert(
                listed.key.clone(),
                RemoteObject {
                    key: listed.key,
                    digest,
                },
            );
        }
        Ok(objects)
    }

    fn put_object(&self, bucket: &BucketName, entry: &ArtifactEntry) -> Result<(), SyncError> {
        let body = entry.source.to_string_lossy().into_owned();
        let metadata = format!("{DIGEST_METADATA_KEY}={}", entry.digest);
        let spec = self.cli.command("s3api", "put-object").args([
            "--bucket",
            bucket.0.as_str(),
            "--key",
            entry.key.as_str(),
            "--body",
            body.as_str(),
            "--content-type",
            entry.content_type(),
            "--cache-control",
            entry.cache_control(),
            "--metadata",
            metadata.as_str(),
        ]);
        self.call(spec, SyncOperation::Put, Some(entry.key.as_str()))?;
        Ok(())
    }

    fn delete_object(&self, bucket: &BucketName, key: &str) -> Result<(), SyncError> {
        let spec = self
            .cli
            .command("s3api", "delete-object")
            .args(["--bucket", bucket.0.as_str(), "--key", key]);
        self.call(spec, SyncOperation::Delete, Some(key))?;
        Ok(())
    }
}
