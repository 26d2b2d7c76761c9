// Scanner module
// Normalized finding types and the per-family strategy interface.

pub mod executor;
pub mod nikto;
pub mod nmap;
pub mod probe;
pub mod severity;
pub mod sslscan;
pub mod tls_probe;
pub mod wpscan;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::process::Command;

/// Severity of a normalized finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized issue extracted from tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub category: String,
    pub description: String,
    pub severity: Severity,
}

impl Finding {
    pub fn new(
        category: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
            severity,
        }
    }
}

/// Terminal result of one scan execution. `failed` marks outcomes the
/// supervisor records as a failed scan (timeout, execution error).
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub findings: Vec<Finding>,
    pub summary: String,
    pub failed: bool,
}

impl ScanOutcome {
    pub fn completed(findings: Vec<Finding>, summary: impl Into<String>) -> Self {
        Self {
            findings,
            summary: summary.into(),
            failed: false,
        }
    }

    pub fn empty(summary: impl Into<String>) -> Self {
        Self::completed(Vec::new(), summary)
    }

    pub fn failure(summary: impl Into<String>) -> Self {
        Self {
            findings: Vec::new(),
            summary: summary.into(),
            failed: true,
        }
    }
}

/// Findings plus a human-readable summary line.
pub type ParsedOutput = (Vec<Finding>, String);

/// Tool-family strategy: how to invoke one class of external scanner
/// and turn its raw stdout into findings.
#[async_trait]
pub trait ToolStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// External binary the strategy shells out to.
    fn binary(&self) -> &'static str;

    /// Wall-clock budget for one invocation.
    fn timeout(&self) -> Duration;

    fn command(&self, target: &str) -> Command;

    /// Best-effort parse of captured stdout. Never fails: malformed
    /// structured output degrades to heuristic line scanning or an
    /// empty finding list.
    fn parse(&self, raw: &str) -> ParsedOutput;

    /// Ran when the binary is missing; a strategy may probe the target
    /// directly instead of giving up.
    async fn fallback(&self, _target: &str) -> Option<ScanOutcome> {
        None
    }
}

/// Contract the supervisor drives: run one scan to a terminal outcome.
#[async_trait]
pub trait ScanRunner: Send + Sync {
    async fn run(&self, tool: &str, target: &str, network: &str) -> ScanOutcome;
}

/// Web scanners want a URL, not a bare host.
pub(crate) fn ensure_http_scheme(target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    }
}

/// Host part of a target that may carry a scheme, port or path.
pub(crate) fn host_only(target: &str) -> &str {
    let stripped = target
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let stripped = stripped.split('/').next().unwrap_or(stripped);
    stripped.split(':').next().unwrap_or(stripped)
}
