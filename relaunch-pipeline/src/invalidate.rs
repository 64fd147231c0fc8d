//! Invalidation step — ask the CDN to drop every cached path.
//!
//! Returns as soon as the provider accepts the request. Propagation to the
//! edge is asynchronous and is not waited for.

use serde::{Deserialize, Serialize};

use relaunch_core::{AwsCli, CommandRunner, DistributionId, ProviderError};

use crate::error::InvalidationError;

/// The universal wildcard: invalidate everything.
pub const ALL_PATHS: &str = "/*";

/// An accepted purge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationTicket {
    pub id: String,
    /// Provider status at acceptance time, usually `InProgress`.
    pub status: String,
}

/// CDN provider port.
pub trait CdnClient {
    fn create_invalidation(
        &self,
        distribution: &DistributionId,
        paths: &[&str],
    ) -> Result<InvalidationTicket, InvalidationError>;
}

impl<C: CdnClient + ?Sized> CdnClient for &C {
    fn create_invalidation(
        &self,
        distribution: &DistributionId,
        paths: &[&str],
    ) -> Result<InvalidationTicket, InvalidationError> {
        (**self).create_invalidation(distribution, paths)
    }
}

/// Submit the wildcard purge for `distribution`. No retry on rejection.
pub fn invalidate_all<C: CdnClient>(
    cdn: &C,
    distribution: &DistributionId,
) -> Result<InvalidationTicket, InvalidationError> {
    let ticket = cdn.create_invalidation(distribution, &[ALL_PATHS])?;
    tracing::info!(
        "invalidation {} accepted for {distribution} ({})",
        ticket.id,
        ticket.status
    );
    Ok(ticket)
}

#[derive(Debug, Deserialize)]
struct CreateInvalidationOutput {
    #[serde(rename = "Invalidation")]
    invalidation: InvalidationBody,
}

#[derive(Debug, Deserialize)]
struct InvalidationBody {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Status", default)]
    status: String,
}

/// `aws cloudfront create-invalidation` adapter.
#[derive(Debug, Clone)]
pub struct AwsCliCdn<R> {
    cli: AwsCli,
    runner: R,
}

impl<R: CommandRunner> AwsCliCdn<R> {
    pub fn new(cli: AwsCli, runner: R) -> Self {
        Self { cli, runner }
    }
}

impl<R: CommandRunner> CdnClient for AwsCliCdn<R> {
    fn create_invalidation(
        &self,
        distribution: &DistributionId,
        paths: &[&str],
    ) -> Result<InvalidationTicket, InvalidationError> {
        let spec = self
            .cli
            .command("cloudfront", "create-invalidation")
            .args(["--distribution-id", distribution.0.as_str(), "--paths"])
            .args(paths.iter().copied());
        let outcome = self.runner.run(&spec)?;
        if !outcome.success() {
            return Err(InvalidationError::Rejected {
                distribution: distribution.clone(),
                source: ProviderError::from_outcome(&outcome),
            });
        }

        let parsed: CreateInvalidationOutput =
            serde_json::from_str(&outcome.stdout).map_err(|e| InvalidationError::Decode {
                reason: e.to_string(),
            })?;
        Ok(InvalidationTicket {
            id: parsed.invalidation.id,
            status: parsed.invalidation.status,
        })
    }
}
