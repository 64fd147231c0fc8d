//! # relaunch-pipeline
//!
//! The update pipeline: build the application, mirror the output to the
//! bucket, purge the CDN.
//!
//! Build a [`Pipeline`] from a [`BuildStep`], an [`relaunch_sync::ObjectStore`]
//! and a [`CdnClient`], then call [`Pipeline::run`].

pub mod build;
pub mod controller;
mod error;
pub mod invalidate;
pub mod lock;

pub use build::{BuildConfig, BuildStep};
pub use controller::{
    Pipeline, PipelineConfig, PipelineReport, PipelineState, PlanReport, PROPAGATION_ADVISORY,
};
pub use error::{
    BuildError, FailureCause, InvalidationError, LockError, PipelineError, Stage,
};
pub use invalidate::{invalidate_all, AwsCliCdn, CdnClient, InvalidationTicket, ALL_PATHS};
pub use lock::RunLock;
