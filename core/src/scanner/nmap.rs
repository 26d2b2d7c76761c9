// Port-scan family. Also the default strategy for unrecognized tool
// names, since it only needs a reachable host.

use super::severity;
use super::{Finding, ParsedOutput, Severity, ToolStrategy};
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tokio::process::Command;

pub struct NmapStrategy {
    port_line: Regex,
}

impl NmapStrategy {
    pub fn new() -> Self {
        Self {
            port_line: Regex::new(r"(?P<port>\d+)/tcp\s+open\s+(?P<service>\S+)").unwrap(),
        }
    }
}

impl Default for NmapStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolStrategy for NmapStrategy {
    fn name(&self) -> &'static str {
        "nmap"
    }

    fn binary(&self) -> &'static str {
        "nmap"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(300)
    }

    fn command(&self, target: &str) -> Command {
        let mut cmd = Command::new(self.binary());
        cmd.args([
            "-p", "1-1000", "--open", "-sV", "--script", "vuln", "-T4", target,
        ]);
        cmd
    }

    fn parse(&self, raw: &str) -> ParsedOutput {
        let mut findings = Vec::new();
        let mut open_ports = 0usize;

        for line in raw.lines() {
            if let Some(caps) = self.port_line.captures(line) {
                open_ports += 1;
                let port: u16 = caps["port"].parse().unwrap_or(0);
                if let Some(issue) = severity::port_issue(port) {
                    findings.push(Finding::new(
                        format!("{} Service", issue.service),
                        format!("{} (port {})", issue.issue, port),
                        issue.severity,
                    ));
                }
            }

            // NSE script hits count as high severity regardless of port
            if line.contains('|') && (line.contains("VULNERABLE") || line.contains("CVE-")) {
                findings.push(Finding::new(
                    "Script Detection",
                    line.trim(),
                    Severity::High,
                ));
            }
        }

        let summary = format!(
            "Found {} open ports, {} potential vulnerabilities",
            open_ports,
            findings.len()
        );
        (findings, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Starting Nmap 7.94 ( https://nmap.org )
Nmap scan report for 10.0.0.5
PORT     STATE SERVICE  VERSION
21/tcp   open  ftp      vsftpd 3.0.3
445/tcp  open  microsoft-ds
80/tcp   open  http     nginx 1.18.0
| smb-vuln-ms17-010: VULNERABLE: Remote Code Execution (CVE-2017-0143)
Nmap done: 1 IP address (1 host up)";

    #[test]
    fn flags_well_known_ports_with_table_severities() {
        let strategy = NmapStrategy::new();
        let (findings, summary) = strategy.parse(SAMPLE);

        let ftp: Vec<_> = findings
            .iter()
            .filter(|f| f.category == "FTP Service")
            .collect();
        assert_eq!(ftp.len(), 1);
        assert_eq!(ftp[0].severity, Severity::Medium);

        let smb: Vec<_> = findings
            .iter()
            .filter(|f| f.category == "SMB Service")
            .collect();
        assert_eq!(smb.len(), 1);
        assert_eq!(smb[0].severity, Severity::Critical);

        // port 80 is open but not on the allow-list
        assert!(!findings.iter().any(|f| f.description.contains("port 80")));
        assert!(summary.contains("3 open ports"));
    }

    #[test]
    fn script_lines_with_cve_become_high_findings() {
        let strategy = NmapStrategy::new();
        let (findings, _) = strategy.parse(SAMPLE);

        let script: Vec<_> = findings
            .iter()
            .filter(|f| f.category == "Script Detection")
            .collect();
        assert_eq!(script.len(), 1);
        assert_eq!(script[0].severity, Severity::High);
        assert!(script[0].description.contains("CVE-2017-0143"));
    }

    #[test]
    fn parse_is_deterministic() {
        let strategy = NmapStrategy::new();
        assert_eq!(strategy.parse(SAMPLE).0, strategy.parse(SAMPLE).0);
    }

    #[test]
    fn empty_output_yields_no_findings() {
        let strategy = NmapStrategy::new();
        let (findings, summary) = strategy.parse("");
        assert!(findings.is_empty());
        assert!(summary.contains("0 open ports"));
    }
}
