// TLS/SSL family. Parses sslscan text output; when the binary is not
// installed, falls back to a direct TLS handshake probe of the target.

use super::severity;
use super::{host_only, tls_probe, Finding, ParsedOutput, ScanOutcome, Severity, ToolStrategy};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;

pub struct SslScanStrategy;

#[async_trait]
impl ToolStrategy for SslScanStrategy {
    fn name(&self) -> &'static str {
        "sslscan"
    }

    fn binary(&self) -> &'static str {
        "sslscan"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn command(&self, target: &str) -> Command {
        let mut cmd = Command::new(self.binary());
        cmd.args(["--no-colour", host_only(target)]);
        cmd
    }

    fn parse(&self, raw: &str) -> ParsedOutput {
        let mut findings = Vec::new();
        let mut weak_ciphers = 0usize;

        for line in raw.lines() {
            let deprecated = severity::DEPRECATED_TLS_PROTOCOLS
                .iter()
                .any(|proto| line.contains(proto));
            if deprecated && line.contains("enabled") {
                findings.push(Finding::new(
                    "Weak SSL/TLS Protocol",
                    format!("Insecure protocol detected: {}", line.trim()),
                    Severity::High,
                ));
            }

            if severity::WEAK_CIPHER_MARKERS
                .iter()
                .any(|marker| line.contains(marker))
            {
                weak_ciphers += 1;
            }

            // sslscan's verdict lines are all lowercase
            let lower = line.to_lowercase();
            if lower.contains("heartbleed")
                && lower.contains("vulnerable")
                && !lower.contains("not vulnerable")
            {
                findings.push(Finding::new(
                    "Heartbleed Vulnerability",
                    "Server is vulnerable to Heartbleed (CVE-2014-0160)",
                    Severity::Critical,
                ));
            }
        }

        if weak_ciphers > 0 {
            findings.push(Finding::new(
                "Weak Cipher Suites",
                format!("Found {} weak cipher suites", weak_ciphers),
                Severity::Medium,
            ));
        }

        let summary = format!(
            "SSL/TLS scan completed. Found {} issues",
            findings.len()
        );
        (findings, summary)
    }

    async fn fallback(&self, target: &str) -> Option<ScanOutcome> {
        Some(tls_probe::probe(target).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Testing SSL server example.com on port 443

  SSL/TLS Protocols:
SSLv2     disabled
SSLv3     enabled
TLSv1.0   enabled
TLSv1.2   enabled

  Supported Server Cipher(s):
Accepted  TLSv1.0  56 bits   DES-CBC-SHA
Accepted  SSLv3    0 bits    NULL-MD5
Accepted  TLSv1.2  256 bits  AES256-GCM-SHA384

  Heartbleed:
TLSv1.2 not vulnerable to heartbleed";

    #[test]
    fn enabled_deprecated_protocols_are_high() {
        let (findings, _) = SslScanStrategy.parse(SAMPLE);
        let protos: Vec<_> = findings
            .iter()
            .filter(|f| f.category == "Weak SSL/TLS Protocol")
            .collect();
        // SSLv3 and TLSv1.0 are enabled; disabled SSLv2 is not flagged
        assert_eq!(protos.len(), 2);
        assert!(protos.iter().all(|f| f.severity == Severity::High));
        assert!(!protos.iter().any(|f| f.description.contains("SSLv2")));
    }

    #[test]
    fn weak_ciphers_aggregate_into_one_medium_finding() {
        let (findings, _) = SslScanStrategy.parse(SAMPLE);
        let weak: Vec<_> = findings
            .iter()
            .filter(|f| f.category == "Weak Cipher Suites")
            .collect();
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].severity, Severity::Medium);
        assert!(weak[0].description.contains("2 weak cipher suites"));
    }

    #[test]
    fn not_vulnerable_heartbleed_line_is_ignored() {
        let (findings, _) = SslScanStrategy.parse(SAMPLE);
        assert!(!findings
            .iter()
            .any(|f| f.category == "Heartbleed Vulnerability"));
    }

    #[test]
    fn positive_heartbleed_indicator_is_critical() {
        let raw = "Heartbleed:\nTLSv1.1 vulnerable to heartbleed";
        let (findings, _) = SslScanStrategy.parse(raw);
        let hb: Vec<_> = findings
            .iter()
            .filter(|f| f.category == "Heartbleed Vulnerability")
            .collect();
        assert_eq!(hb.len(), 1);
        assert_eq!(hb[0].severity, Severity::Critical);
    }
}
