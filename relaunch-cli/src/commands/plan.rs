//! `relaunch plan` — show what `update` would change in the bucket.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use relaunch_pipeline::PlanReport;
use relaunch_sync::UploadReason;

use super::target::TargetArgs;

/// Arguments for `relaunch plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "key")]
    key: String,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let mut pipeline = self.target.pipeline()?;
        let report = pipeline.plan().context("plan failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to encode plan")?
            );
            return Ok(());
        }
        print_plan(&report);
        Ok(())
    }
}

fn print_plan(report: &PlanReport) {
    println!(
        "Plan for {} ({}): {} file(s), {} byte(s) built",
        report.bucket, report.url, report.artifacts, report.artifact_bytes
    );

    let plan = &report.plan;
    if plan.is_noop() {
        println!("{} bucket already matches the build", "✓".green());
        return;
    }

    let mut rows: Vec<PlanRow> = plan
        .uploads
        .iter()
        .map(|u| PlanRow {
            action: match u.reason {
                UploadReason::New => "upload (new)".to_string(),
                UploadReason::Changed => "upload (changed)".to_string(),
            },
            key: u.key.clone(),
        })
        .collect();
    rows.extend(plan.deletes.iter().map(|key| PlanRow {
        action: "delete".to_string(),
        key: key.clone(),
    }));

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "{} to upload, {} to delete, {} unchanged",
        plan.uploads.len(),
        plan.deletes.len(),
        plan.unchanged.len()
    );
}
