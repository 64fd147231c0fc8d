//! Deployment record store.
//!
//! The record is written once by the provisioning flow and is read-only here:
//!
//! ```json
//! { "bucketName": "site-bucket", "distributionId": "DIST123", "domainName": "app.example.com" }
//! ```
//!
//! `.yaml` / `.yml` files are parsed as YAML, everything else as JSON. Extra
//! fields are ignored. A record is either complete or rejected; there is no
//! partial load.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::RecordError;
use crate::types::{BucketName, DeploymentRecord, DistributionId, DomainName};

/// File name looked up inside the project directory when none is configured.
pub const DEFAULT_RECORD_FILE: &str = "deployment-info.json";

const BUCKET_FIELD: &str = "bucketName";
const DISTRIBUTION_FIELD: &str = "distributionId";
const DOMAIN_FIELD: &str = "domainName";

/// `<project_dir>/deployment-info.json`. Pure, no I/O.
pub fn default_path_at(project_dir: &Path) -> PathBuf {
    project_dir.join(DEFAULT_RECORD_FILE)
}

/// Load and validate the record at `path`.
///
/// Returns `RecordError::RecordNotFound` if absent and
/// `RecordError::RecordMalformed` if it does not parse or any required field
/// is missing, not a string, or blank. The malformed reason lists every
/// offending field, not just the first.
pub fn load_at(path: &Path) -> Result<DeploymentRecord, RecordError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(RecordError::RecordNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(RecordError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let document = parse_document(path, &contents)?;
    let record = validate(path, &document)?;
    tracing::debug!(
        bucket = %record.bucket_name,
        distribution = %record.distribution_id,
        "loaded deployment record from {}",
        path.display()
    );
    Ok(record)
}

fn parse_document(path: &Path, contents: &str) -> Result<Value, RecordError> {
    let malformed = |reason: String| RecordError::RecordMalformed {
        path: path.to_path_buf(),
        reason,
    };

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str::<Value>(contents).map_err(|e| malformed(e.to_string()))
    } else {
        serde_json::from_str::<Value>(contents).map_err(|e| malformed(e.to_string()))
    }
}

fn validate(path: &Path, document: &Value) -> Result<DeploymentRecord, RecordError> {
    let Some(fields) = document.as_object() else {
        return Err(RecordError::RecordMalformed {
            path: path.to_path_buf(),
            reason: "expected a mapping with bucketName, distributionId, domainName".to_string(),
        });
    };

    let mut problems = Vec::new();
    let mut field = |name: &str| -> Option<String> {
        match fields.get(name) {
            None | Some(Value::Null) => {
                problems.push(format!("`{name}` is missing"));
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                problems.push(format!("`{name}` is empty"));
                None
            }
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(_) => {
                problems.push(format!("`{name}` must be a string"));
                None
            }
        }
    };

    let bucket = field(BUCKET_FIELD);
    let distribution = field(DISTRIBUTION_FIELD);
    let domain = field(DOMAIN_FIELD);

    match (bucket, distribution, domain) {
        (Some(bucket), Some(distribution), Some(domain)) => {
            let domain = DomainName::normalized(&domain);
            if domain.0.is_empty() {
                return Err(RecordError::RecordMalformed {
                    path: path.to_path_buf(),
                    reason: format!("`{DOMAIN_FIELD}` has no host"),
                });
            }
            Ok(DeploymentRecord {
                bucket_name: BucketName(bucket),
                distribution_id: DistributionId(distribution),
                domain_name: domain,
            })
        }
        _ => Err(RecordError::RecordMalformed {
            path: path.to_path_buf(),
            reason: problems.join(", "),
        }),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).expect("write record");
        path
    }

    #[test]
    fn default_path_is_in_project_dir() {
        let path = default_path_at(Path::new("/srv/app"));
        assert_eq!(path, PathBuf::from("/srv/app/deployment-info.json"));
    }

    #[test]
    fn loads_complete_json_record() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(
            &dir,
            "deployment-info.json",
            r#"{"bucketName":"site-bucket","distributionId":"DIST123","domainName":"app.example.com"}"#,
        );
        let record = load_at(&path).expect("load");
        assert_eq!(record, DeploymentRecord::new("site-bucket", "DIST123", "app.example.com"));
    }

    #[test]
    fn loads_yaml_record_by_extension() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(
            &dir,
            "deployment.yaml",
            "bucketName: site-bucket\ndistributionId: DIST123\ndomainName: app.example.com\n",
        );
        let record = load_at(&path).expect("load");
        assert_eq!(record.bucket_name.0, "site-bucket");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(
            &dir,
            "r.json",
            r#"{"bucketName":"b","distributionId":"d","domainName":"x.y","certificateArn":"arn:aws:acm:..."}"#,
        );
        assert!(load_at(&path).is_ok());
    }

    #[test]
    fn values_are_trimmed_and_domain_normalized() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(
            &dir,
            "r.json",
            r#"{"bucketName":"  b ","distributionId":"d","domainName":"https://x.y/"}"#,
        );
        let record = load_at(&path).expect("load");
        assert_eq!(record.bucket_name.0, "b");
        assert_eq!(record.domain_name.0, "x.y");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_at(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RecordError::RecordNotFound { .. }));
    }

    #[test]
    fn malformed_reason_lists_every_bad_field() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(&dir, "r.json", r#"{"bucketName":"","domainName":42}"#);
        let err = load_at(&path).unwrap_err();
        let RecordError::RecordMalformed { reason, .. } = err else {
            panic!("expected malformed, got {err:?}");
        };
        assert!(reason.contains("`bucketName` is empty"), "{reason}");
        assert!(reason.contains("`distributionId` is missing"), "{reason}");
        assert!(reason.contains("`domainName` must be a string"), "{reason}");
    }

    #[test]
    fn non_mapping_document_is_malformed() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(&dir, "r.json", "[1, 2, 3]");
        assert!(matches!(
            load_at(&path).unwrap_err(),
            RecordError::RecordMalformed { .. }
        ));
    }

    #[test]
    fn scheme_only_domain_is_malformed() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(
            &dir,
            "r.json",
            r#"{"bucketName":"b","distributionId":"d","domainName":"https://"}"#,
        );
        assert!(matches!(
            load_at(&path).unwrap_err(),
            RecordError::RecordMalformed { .. }
        ));
    }
}
