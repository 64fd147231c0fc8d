//! `relaunch status` — show the recorded deployment target.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use relaunch_core::record;

use super::target::RecordArgs;

/// Arguments for `relaunch status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson<'a> {
    record: String,
    bucket: &'a str,
    distribution: &'a str,
    url: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let path = self.record.record_path();
        let target = record::load_at(&path).context("cannot read deployment target")?;

        if self.json {
            let payload = StatusJson {
                record: path.display().to_string(),
                bucket: &target.bucket_name.0,
                distribution: &target.distribution_id.0,
                url: target.public_url(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to encode status")?
            );
            return Ok(());
        }

        println!("{} {}", "record".dimmed(), path.display());
        println!("{} {}", "bucket".dimmed(), target.bucket_name);
        println!("{} {}", "distribution".dimmed(), target.distribution_id);
        println!("{} {}", "url".dimmed(), target.public_url().bold());
        Ok(())
    }
}
