// Web-vulnerability family. Prefers Nikto's JSON output and falls back
// to keyword line scanning when the output is not valid JSON.

use super::severity;
use super::{ensure_http_scheme, Finding, ParsedOutput, Severity, ToolStrategy};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;

pub struct NiktoStrategy;

#[async_trait]
impl ToolStrategy for NiktoStrategy {
    fn name(&self) -> &'static str {
        "nikto"
    }

    fn binary(&self) -> &'static str {
        "nikto"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(180)
    }

    fn command(&self, target: &str) -> Command {
        let mut cmd = Command::new(self.binary());
        cmd.args([
            "-h",
            &ensure_http_scheme(target),
            "-Tuning",
            "x",
            "-Format",
            "json",
            "-timeout",
            "10",
        ]);
        cmd
    }

    fn parse(&self, raw: &str) -> ParsedOutput {
        let findings = match serde_json::from_str::<Value>(raw) {
            Ok(data) => data
                .get("vulnerabilities")
                .and_then(Value::as_array)
                .map(|vulns| {
                    vulns
                        .iter()
                        .map(|vuln| {
                            let msg = vuln
                                .get("msg")
                                .and_then(Value::as_str)
                                .unwrap_or("Unknown issue");
                            Finding::new("Web Vulnerability", msg, map_severity(vuln))
                        })
                        .collect()
                })
                .unwrap_or_default(),
            Err(_) => heuristic_lines(raw),
        };

        let summary = format!("Found {} web vulnerabilities", findings.len());
        (findings, summary)
    }
}

fn map_severity(vuln: &Value) -> Severity {
    let text = vuln.to_string().to_lowercase();
    let has_osvdb = match vuln.get("OSVDB") {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };

    if text.contains("critical") {
        Severity::Critical
    } else if has_osvdb || text.contains("vulnerability") {
        Severity::High
    } else {
        Severity::Medium
    }
}

// Nikto prefixes its report lines with '+'
fn heuristic_lines(raw: &str) -> Vec<Finding> {
    raw.lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            line.contains('+')
                && severity::WEB_VULN_KEYWORDS
                    .iter()
                    .any(|keyword| lower.contains(keyword))
        })
        .map(|line| Finding::new("Web Vulnerability", line.trim(), Severity::Medium))
        .collect()
}
