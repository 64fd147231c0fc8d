//! Shared invocation settings for the `aws` command-line interface.

use crate::process::CommandSpec;

/// Program name used when none is configured.
pub const DEFAULT_AWS_PROGRAM: &str = "aws";

/// How to reach the provider CLI: which binary, which named profile, which
/// region. Passed explicitly to every adapter; nothing is read from the
/// environment here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsCli {
    pub program: String,
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl Default for AwsCli {
    fn default() -> Self {
        Self {
            program: DEFAULT_AWS_PROGRAM.to_string(),
            profile: None,
            region: None,
        }
    }
}

impl AwsCli {
    /// `aws <service> <operation> [--profile P] [--region R] --output json`
    pub fn command(&self, service: &str, operation: &str) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program).args([service, operation]);
        if let Some(profile) = &self.profile {
            spec = spec.args(["--profile", profile.as_str()]);
        }
        if let Some(region) = &self.region {
            spec = spec.args(["--region", region.as_str()]);
        }
        spec.args(["--output", "json"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_command_has_json_output_only() {
        let spec = AwsCli::default().command("s3api", "list-objects-v2");
        assert_eq!(spec.to_string(), "aws s3api list-objects-v2 --output json");
    }

    #[test]
    fn profile_and_region_are_forwarded() {
        let cli = AwsCli {
            program: "/opt/aws".to_string(),
            profile: Some("deploy".to_string()),
            region: Some("us-east-1".to_string()),
        };
        let spec = cli.command("cloudfront", "create-invalidation");
        assert_eq!(spec.program, "/opt/aws");
        assert_eq!(
            spec.args,
            vec![
                "cloudfront",
                "create-invalidation",
                "--profile",
                "deploy",
                "--region",
                "us-east-1",
                "--output",
                "json"
            ]
        );
    }
}
