//! Flags shared by every subcommand, resolved into explicit configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use relaunch_core::{record, AwsCli, SystemRunner};
use relaunch_pipeline::{AwsCliCdn, BuildConfig, BuildStep, Pipeline, PipelineConfig};
use relaunch_sync::AwsCliObjectStore;

/// Where the record lives.
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Project root: build working directory and base for relative paths.
    #[arg(long, env = "RELAUNCH_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Deployment record written by provisioning [default: <project-dir>/deployment-info.json].
    #[arg(long, env = "RELAUNCH_RECORD")]
    pub record: Option<PathBuf>,
}

impl RecordArgs {
    pub fn record_path(&self) -> PathBuf {
        match &self.record {
            Some(path) => resolve(&self.project_dir, path),
            None => record::default_path_at(&self.project_dir),
        }
    }
}

/// Everything `update` and `plan` need.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Build output directory, removed before each build [default: <project-dir>/dist].
    /// A non-empty directory outside the project is refused.
    #[arg(long, env = "RELAUNCH_ARTIFACT_DIR")]
    pub artifact_dir: Option<PathBuf>,

    /// Production build command, split on whitespace.
    #[arg(long, env = "RELAUNCH_BUILD_CMD", default_value = "npm run build")]
    pub build_cmd: String,

    /// Provider CLI executable.
    #[arg(long, env = "RELAUNCH_AWS_BIN", default_value = "aws")]
    pub aws_bin: String,

    /// Named provider CLI profile.
    #[arg(long, env = "RELAUNCH_AWS_PROFILE")]
    pub profile: Option<String>,

    /// Provider region.
    #[arg(long, env = "RELAUNCH_AWS_REGION")]
    pub region: Option<String>,
}

pub type CliPipeline =
    Pipeline<SystemRunner, AwsCliObjectStore<SystemRunner>, AwsCliCdn<SystemRunner>>;

impl TargetArgs {
    pub fn build_config(&self) -> Result<BuildConfig> {
        let project_dir = &self.record.project_dir;
        let mut config = BuildConfig::for_project(project_dir);
        if let Some(dir) = &self.artifact_dir {
            config.artifact_dir = resolve(project_dir, dir);
        }
        config.command = self.build_cmd.split_whitespace().map(str::to_owned).collect();
        if config.command.is_empty() {
            anyhow::bail!("--build-cmd must not be empty");
        }
        Ok(config)
    }

    pub fn aws_cli(&self) -> AwsCli {
        AwsCli {
            program: self.aws_bin.clone(),
            profile: self.profile.clone(),
            region: self.region.clone(),
        }
    }

    /// Wire the production adapters into a pipeline.
    pub fn pipeline(&self) -> Result<CliPipeline> {
        if !self.record.project_dir.is_dir() {
            anyhow::bail!(
                "project directory '{}' does not exist",
                self.record.project_dir.display()
            );
        }
        let build = BuildStep::new(
            self.build_config().context("invalid build configuration")?,
            SystemRunner,
        );
        let cli = self.aws_cli();
        Ok(Pipeline::new(
            PipelineConfig {
                record_path: self.record.record_path(),
            },
            build,
            AwsCliObjectStore::new(cli.clone(), SystemRunner),
            AwsCliCdn::new(cli, SystemRunner),
        ))
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
