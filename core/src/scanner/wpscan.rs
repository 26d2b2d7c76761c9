// CMS-plugin family. Parses WPScan's JSON enumeration of vulnerable
// plugins, themes and users.

use super::{ensure_http_scheme, Finding, ParsedOutput, Severity, ToolStrategy};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;

pub struct WpScanStrategy;

#[async_trait]
impl ToolStrategy for WpScanStrategy {
    fn name(&self) -> &'static str {
        "wpscan"
    }

    fn binary(&self) -> &'static str {
        "wpscan"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(300)
    }

    fn command(&self, target: &str) -> Command {
        let mut cmd = Command::new(self.binary());
        cmd.args([
            "--url",
            &ensure_http_scheme(target),
            "--enumerate",
            "vp,vt,u",
            "--format",
            "json",
            "--disable-tls-checks",
        ]);
        cmd
    }

    fn parse(&self, raw: &str) -> ParsedOutput {
        let data = match serde_json::from_str::<Value>(raw) {
            Ok(data) => data,
            // No heuristic text form exists for wpscan; treat the
            // output as absent.
            Err(_) => return (Vec::new(), "No parseable WPScan output".to_string()),
        };

        let mut findings = Vec::new();
        collect_component_vulns(&data, "plugins", "WordPress Plugin", &mut findings);
        collect_component_vulns(&data, "themes", "WordPress Theme", &mut findings);

        let user_count = data
            .get("users")
            .map(|users| match users {
                Value::Object(map) => map.len(),
                Value::Array(list) => list.len(),
                _ => 0,
            })
            .unwrap_or(0);
        if user_count > 0 {
            findings.push(Finding::new(
                "Information Disclosure",
                format!(
                    "WordPress user enumeration possible. Found {} users",
                    user_count
                ),
                Severity::Medium,
            ));
        }

        let summary = format!(
            "WPScan completed. Found {} WordPress vulnerabilities",
            findings.len()
        );
        (findings, summary)
    }
}

fn collect_component_vulns(data: &Value, key: &str, category: &str, findings: &mut Vec<Finding>) {
    let Some(components) = data.get(key).and_then(Value::as_object) else {
        return;
    };
    for (name, details) in components {
        let Some(vulns) = details.get("vulnerabilities").and_then(Value::as_array) else {
            continue;
        };
        for vuln in vulns {
            let title = vuln
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("Unknown vulnerability");
            findings.push(Finding::new(
                category,
                format!("{}: {}", name, title),
                Severity::High,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_and_theme_vulns_become_high_findings() {
        let raw = r#"{
            "plugins": {
                "contact-form-7": {"vulnerabilities": [
                    {"title": "CF7 <= 5.3.1 - Unrestricted File Upload"}
                ]},
                "akismet": {"vulnerabilities": []}
            },
            "themes": {
                "twentytwenty": {"vulnerabilities": [
                    {"title": "Stored XSS"}
                ]}
            }
        }"#;
        let (findings, summary) = WpScanStrategy.parse(raw);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.severity == Severity::High));
        assert!(findings
            .iter()
            .any(|f| f.description.starts_with("contact-form-7:")));
        assert!(summary.contains("2 WordPress vulnerabilities"));
    }

    #[test]
    fn enumerated_users_yield_one_medium_disclosure_finding() {
        let raw = r#"{"users": {"admin": {}, "editor": {}}}"#;
        let (findings, _) = WpScanStrategy.parse(raw);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert!(findings[0].description.contains("Found 2 users"));
    }

    #[test]
    fn malformed_json_is_treated_as_absent_output() {
        let (findings, summary) = WpScanStrategy.parse("wpscan aborted: connection refused");
        assert!(findings.is_empty());
        assert_eq!(summary, "No parseable WPScan output");
    }
}
