//! Domain types for a provisioned hosting target.
//!
//! All types are serializable via serde so reports can be emitted as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of the object-storage bucket holding the site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketName(pub String);

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for BucketName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BucketName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of the CDN distribution fronting the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistributionId(pub String);

impl fmt::Display for DistributionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DistributionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DistributionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Public hostname the site is served under (no scheme, no trailing slash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainName(pub String);

impl DomainName {
    /// Strip an accidental scheme and trailing slashes.
    pub fn normalized(raw: &str) -> Self {
        let trimmed = raw.trim();
        let host = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        Self(host.trim_end_matches('/').to_owned())
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DomainName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DomainName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Deployment record
// ---------------------------------------------------------------------------

/// A previously provisioned hosting target.
///
/// Only constructed by [`crate::record::load_at`] (or directly in tests), so a
/// value of this type always has three non-empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub bucket_name: BucketName,
    pub distribution_id: DistributionId,
    pub domain_name: DomainName,
}

impl DeploymentRecord {
    pub fn new(
        bucket_name: impl Into<BucketName>,
        distribution_id: impl Into<DistributionId>,
        domain_name: impl Into<DomainName>,
    ) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            distribution_id: distribution_id.into(),
            domain_name: domain_name.into(),
        }
    }

    /// `https://<domainName>`
    pub fn public_url(&self) -> String {
        format!("https://{}", self.domain_name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(BucketName::from("site-bucket").to_string(), "site-bucket");
        assert_eq!(DistributionId::from("DIST123").to_string(), "DIST123");
        assert_eq!(DomainName::from("app.example.com").to_string(), "app.example.com");
    }

    #[test]
    fn public_url_uses_https() {
        let record = DeploymentRecord::new("site-bucket", "DIST123", "app.example.com");
        assert_eq!(record.public_url(), "https://app.example.com");
    }

    #[test]
    fn domain_normalization_strips_scheme_and_slash() {
        assert_eq!(DomainName::normalized("https://app.example.com/").0, "app.example.com");
        assert_eq!(DomainName::normalized("  http://a.b  ").0, "a.b");
        assert_eq!(DomainName::normalized("plain.host").0, "plain.host");
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let record = DeploymentRecord::new("b", "d", "x.y");
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("\"bucketName\":\"b\""));
        assert!(json.contains("\"distributionId\":\"d\""));
        assert!(json.contains("\"domainName\":\"x.y\""));
    }
}
