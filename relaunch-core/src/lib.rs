//! Relaunch core library — domain types, deployment record store, subprocess
//! capability, errors.
//!
//! - [`types`] — newtypes and the [`DeploymentRecord`]
//! - [`record`] — read-only loader for the record written at provisioning time
//! - [`process`] — [`CommandRunner`] capability for external toolchains/CLIs
//! - [`provider`] — provider CLI error parsing
//! - [`aws`] — [`AwsCli`] invocation settings shared by the provider adapters
//! - [`error`] — [`RecordError`], [`RunError`]

pub mod aws;
pub mod error;
pub mod process;
pub mod provider;
pub mod record;
pub mod types;

pub use aws::AwsCli;
pub use error::{RecordError, RunError};
pub use process::{CommandRunner, CommandSpec, ExitOutcome, SystemRunner};
pub use provider::ProviderError;
pub use types::{BucketName, DeploymentRecord, DistributionId, DomainName};
