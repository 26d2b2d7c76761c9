// Scan executor - runs a single scan to a terminal outcome. Its public
// contract never propagates an error to the caller: every internal
// failure is folded into the ScanOutcome.

use super::nikto::NiktoStrategy;
use super::nmap::NmapStrategy;
use super::sslscan::SslScanStrategy;
use super::wpscan::WpScanStrategy;
use super::{probe, ScanOutcome, ScanRunner, ToolStrategy};
use crate::error::ScanError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::time::timeout;
use tracing::{info, warn};

/// Fixed tool set reported by the capability endpoint.
pub const SCAN_TOOLS: &[&str] = &["nmap", "nikto", "wpscan", "sslscan"];

/// Picks the tool-family strategy for a free-text tool identifier by
/// case-insensitive substring match. Unrecognized names fall back to
/// the port-scan family.
pub fn select_strategy(tool: &str) -> Box<dyn ToolStrategy> {
    let tool = tool.to_lowercase();
    if tool.contains("nikto") {
        Box::new(NiktoStrategy)
    } else if tool.contains("wpscan") {
        Box::new(WpScanStrategy)
    } else if tool.contains("ssl") {
        Box::new(SslScanStrategy)
    } else {
        Box::new(NmapStrategy::new())
    }
}

#[derive(Clone, Default)]
pub struct ScanExecutor;

impl ScanExecutor {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, tool: &str, target: &str) -> ScanOutcome {
        let strategy = select_strategy(tool);
        info!(tool, strategy = strategy.name(), target, "executing scan");
        self.run_strategy(strategy.as_ref(), target).await
    }

    pub async fn run_strategy(&self, strategy: &dyn ToolStrategy, target: &str) -> ScanOutcome {
        if !probe::is_available(strategy.binary()).await {
            if let Some(outcome) = strategy.fallback(target).await {
                return outcome;
            }
            return ScanOutcome::empty(format!(
                "{} is not installed on the scan host",
                strategy.binary()
            ));
        }

        match self.invoke(strategy, target).await {
            Ok(raw) => {
                let (findings, summary) = strategy.parse(&raw);
                ScanOutcome::completed(findings, summary)
            }
            Err(ScanError::Timeout { secs }) => {
                warn!(strategy = strategy.name(), target, secs, "scan timed out");
                ScanOutcome::failure(format!(
                    "{} scan timed out after {}s",
                    strategy.name(),
                    secs
                ))
            }
            Err(e) => {
                warn!(strategy = strategy.name(), target, error = %e, "scan failed");
                ScanOutcome::failure(format!("{} scan failed: {}", strategy.name(), e))
            }
        }
    }

    async fn invoke(
        &self,
        strategy: &dyn ToolStrategy,
        target: &str,
    ) -> Result<String, ScanError> {
        let mut cmd = strategy.command(target);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            // the process is force-killed when the timeout drops it
            .kill_on_drop(true);

        let child = cmd.spawn()?;
        let budget = strategy.timeout();
        let output = timeout(budget, child.wait_with_output())
            .await
            .map_err(|_| ScanError::Timeout {
                secs: budget.as_secs(),
            })??;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ScanRunner for ScanExecutor {
    async fn run(&self, tool: &str, target: &str, _network: &str) -> ScanOutcome {
        self.execute(tool, target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{Finding, ParsedOutput, Severity};
    use std::time::{Duration, Instant};
    use tokio::process::Command;

    // Shell-backed strategy so the tests do not depend on any security
    // tool being installed.
    struct ScriptStrategy {
        script: &'static str,
        budget: Duration,
    }

    #[async_trait]
    impl ToolStrategy for ScriptStrategy {
        fn name(&self) -> &'static str {
            "script"
        }

        fn binary(&self) -> &'static str {
            "sh"
        }

        fn timeout(&self) -> Duration {
            self.budget
        }

        fn command(&self, _target: &str) -> Command {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", self.script]);
            cmd
        }

        fn parse(&self, raw: &str) -> ParsedOutput {
            let findings: Vec<Finding> = raw
                .lines()
                .filter(|line| line.contains("hit"))
                .map(|line| Finding::new("test", line, Severity::Low))
                .collect();
            let summary = format!("{} hits", findings.len());
            (findings, summary)
        }
    }

    struct MissingBinaryStrategy;

    #[async_trait]
    impl ToolStrategy for MissingBinaryStrategy {
        fn name(&self) -> &'static str {
            "missing"
        }

        fn binary(&self) -> &'static str {
            "scout-no-such-binary-xyz"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        fn command(&self, _target: &str) -> Command {
            Command::new(self.binary())
        }

        fn parse(&self, _raw: &str) -> ParsedOutput {
            (Vec::new(), String::new())
        }
    }

    #[test]
    fn strategy_selection_matches_family_substrings() {
        assert_eq!(select_strategy("Nikto 2.5").name(), "nikto");
        assert_eq!(select_strategy("WPScan").name(), "wpscan");
        assert_eq!(select_strategy("SSLScan").name(), "sslscan");
        assert_eq!(select_strategy("testssl.sh").name(), "sslscan");
        assert_eq!(select_strategy("nmap").name(), "nmap");
        // unknown tools default to the port-scan family
        assert_eq!(select_strategy("some-unknown-tool").name(), "nmap");
    }

    #[tokio::test]
    async fn captured_output_flows_through_the_parser() {
        let strategy = ScriptStrategy {
            script: "printf 'hit one\\nmiss\\nhit two\\n'",
            budget: Duration::from_secs(10),
        };
        let outcome = ScanExecutor::new()
            .run_strategy(&strategy, "127.0.0.1")
            .await;
        assert!(!outcome.failed);
        assert_eq!(outcome.findings.len(), 2);
        assert_eq!(outcome.summary, "2 hits");
    }

    #[tokio::test]
    async fn timeout_produces_a_failed_outcome_promptly() {
        let strategy = ScriptStrategy {
            script: "sleep 10",
            budget: Duration::from_millis(200),
        };
        let start = Instant::now();
        let outcome = ScanExecutor::new()
            .run_strategy(&strategy, "127.0.0.1")
            .await;
        assert!(outcome.failed);
        assert!(outcome.findings.is_empty());
        assert!(outcome.summary.contains("timed out"));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_binary_short_circuits_with_explanation() {
        let outcome = ScanExecutor::new()
            .run_strategy(&MissingBinaryStrategy, "127.0.0.1")
            .await;
        assert!(!outcome.failed);
        assert!(outcome.findings.is_empty());
        assert!(outcome.summary.contains("not installed"));
    }
}
