//! Provider CLI error parsing.
//!
//! Cloud CLIs report failures on stderr as
//! `An error occurred (AccessDenied) when calling the PutObject operation: Access Denied`.
//! The code in parentheses is what an operator needs for remediation, so it is
//! kept separately from the message.

use std::fmt;

use serde::Serialize;

use crate::process::ExitOutcome;

/// A failure reported by a storage or CDN provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderError {
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_owned),
            message: message.into(),
        }
    }

    /// Build from a failed CLI invocation.
    pub fn from_outcome(outcome: &ExitOutcome) -> Self {
        if let Some(parsed) = Self::parse(&outcome.stderr) {
            return parsed;
        }
        let tail = outcome.stderr_tail(3);
        if tail.is_empty() {
            Self::new(None, format!("provider CLI failed with {}", outcome.status_label()))
        } else {
            Self::new(None, tail)
        }
    }

    /// Extract `(Code)` and the message after `operation:` from CLI stderr.
    pub fn parse(stderr: &str) -> Option<Self> {
        let line = stderr.lines().find(|l| l.contains("An error occurred ("))?;
        let after = &line[line.find("An error occurred (")? + "An error occurred (".len()..];
        let close = after.find(')')?;
        let code = after[..close].trim();
        let message = match after.find("operation:") {
            Some(idx) => after[idx + "operation:".len()..].trim(),
            None => after[close + 1..].trim(),
        };
        Some(Self::new(
            (!code.is_empty()).then_some(code),
            message.to_string(),
        ))
    }

    /// Whether the code names a provider-side throttle.
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self.code.as_deref(),
            Some("TooManyInvalidationsInProgress")
                | Some("Throttling")
                | Some("ThrottlingException")
                | Some("SlowDown")
                | Some("TooManyRequests")
        )
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProviderError {}
