//! `relaunch update` — build, mirror, invalidate.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use relaunch_pipeline::{PipelineError, PipelineReport};

use super::target::TargetArgs;

/// Arguments for `relaunch update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Emit the final report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl UpdateArgs {
    pub fn run(self) -> Result<()> {
        let mut pipeline = self.target.pipeline()?;
        let report = pipeline.run().map_err(explain)?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to encode report")?
            );
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

/// Attach operator guidance to a failed run.
fn explain(err: PipelineError) -> anyhow::Error {
    let headline = if err.content_published() {
        "update incomplete: new content is live at the origin, but cached copies \
         may be served until they expire; re-run `relaunch update` to purge"
    } else if err.remote_untouched() {
        "update failed: nothing was changed in the bucket"
    } else {
        "update failed: the bucket may be partially updated; re-run `relaunch update` to converge"
    };
    anyhow::Error::new(err).context(headline)
}

fn print_report(report: &PipelineReport) {
    println!("{} {}", "✓ Live at".green().bold(), report.url.bold());
    println!(
        "  {} uploaded, {} deleted, {} unchanged in {}",
        report.sync.uploaded.len(),
        report.sync.deleted.len(),
        report.sync.unchanged,
        report.bucket
    );
    println!(
        "  invalidation {} on {} ({})",
        report.invalidation.id, report.distribution, report.invalidation.status
    );
    println!("  {}", report.advisory.dimmed());
}
