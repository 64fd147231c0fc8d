//! Build step — run the application's production build and hand back a
//! freshly scanned artifact tree.
//!
//! The artifact directory is deleted before the toolchain runs, so the tree
//! returned can only have been produced by this invocation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use relaunch_core::{CommandRunner, CommandSpec};
use relaunch_sync::ArtifactTree;

use crate::error::{io_err, BuildError};

/// Default toolchain invocation.
pub const DEFAULT_BUILD_COMMAND: &[&str] = &["npm", "run", "build"];

/// Default artifact directory, relative to the project directory.
pub const DEFAULT_ARTIFACT_DIR: &str = "dist";

/// Where and how to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Working directory of the toolchain.
    pub project_dir: PathBuf,
    /// Directory the toolchain writes its output to.
    pub artifact_dir: PathBuf,
    /// Program followed by its arguments.
    pub command: Vec<String>,
}

impl BuildConfig {
    /// `npm run build` in `project_dir`, output in `project_dir/dist`.
    pub fn for_project(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            artifact_dir: project_dir.join(DEFAULT_ARTIFACT_DIR),
            project_dir,
            command: DEFAULT_BUILD_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn spec(&self) -> Result<CommandSpec, BuildError> {
        let (program, args) = self.command.split_first().ok_or(BuildError::EmptyCommand)?;
        Ok(CommandSpec::new(program)
            .args(args.iter().cloned())
            .current_dir(&self.project_dir))
    }
}

/// Runs the toolchain through a [`CommandRunner`].
#[derive(Debug, Clone)]
pub struct BuildStep<R> {
    config: BuildConfig,
    runner: R,
}

impl<R: CommandRunner> BuildStep<R> {
    pub fn new(config: BuildConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Clean, build, verify, scan. No retries.
    pub fn build(&self) -> Result<ArtifactTree, BuildError> {
        let spec = self.config.spec()?;
        let artifact_dir = &self.config.artifact_dir;
        guard_artifact_dir(&self.config.project_dir, artifact_dir)?;
        clean(artifact_dir)?;

        tracing::info!("building: {spec}");
        let outcome = self.runner.run(&spec)?;
        if !outcome.success() {
            return Err(BuildError::Exit {
                command: spec.to_string(),
                code: outcome.code,
                status: outcome.status_label(),
                stderr_tail: outcome.stderr_tail(20),
            });
        }

        if !has_entries(artifact_dir) {
            return Err(BuildError::MissingArtifacts {
                dir: artifact_dir.clone(),
            });
        }
        let tree = ArtifactTree::scan(artifact_dir)?;
        if tree.is_empty() {
            return Err(BuildError::MissingArtifacts {
                dir: artifact_dir.clone(),
            });
        }
        tracing::info!(
            "build produced {} file(s), {} byte(s)",
            tree.len(),
            tree.total_bytes()
        );
        Ok(tree)
    }
}

/// Only directories inside the project, or empty/absent ones elsewhere, may
/// be removed.
fn guard_artifact_dir(project_dir: &Path, artifact_dir: &Path) -> Result<(), BuildError> {
    let project = std::fs::canonicalize(project_dir).unwrap_or_else(|_| project_dir.to_path_buf());
    let artifacts = std::fs::canonicalize(artifact_dir).unwrap_or_else(|_| artifact_dir.to_path_buf());
    let refuse = |reason| {
        Err(BuildError::UnsafeArtifactDir {
            dir: artifact_dir.to_path_buf(),
            reason,
        })
    };
    if project.starts_with(&artifacts) || artifacts.parent().is_none() {
        return refuse("it contains the project");
    }
    if !artifacts.starts_with(&project) && has_entries(artifact_dir) {
        return refuse("it is outside the project and not empty");
    }
    Ok(())
}

fn clean(dir: &Path) -> Result<(), BuildError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::debug!("removed previous artifacts at {}", dir.display());
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(dir, err)),
    }
}

fn has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
