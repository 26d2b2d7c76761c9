// Declarative severity tables shared by the output parsers, so the
// same indicator always maps to the same severity across tool families.

use super::Severity;

/// Issue attached to a well-known exposed port.
#[derive(Debug)]
pub struct PortIssue {
    pub port: u16,
    pub service: &'static str,
    pub issue: &'static str,
    pub severity: Severity,
}

pub const WELL_KNOWN_PORTS: &[PortIssue] = &[
    PortIssue {
        port: 21,
        service: "FTP",
        issue: "FTP allows unencrypted data transfer",
        severity: Severity::Medium,
    },
    PortIssue {
        port: 23,
        service: "Telnet",
        issue: "Telnet is insecure - use SSH instead",
        severity: Severity::High,
    },
    PortIssue {
        port: 25,
        service: "SMTP",
        issue: "Check for open relay configuration",
        severity: Severity::Medium,
    },
    PortIssue {
        port: 53,
        service: "DNS",
        issue: "Check for zone transfer vulnerability",
        severity: Severity::Medium,
    },
    PortIssue {
        port: 445,
        service: "SMB",
        issue: "SMB vulnerable to EternalBlue and other exploits",
        severity: Severity::Critical,
    },
    PortIssue {
        port: 3306,
        service: "MySQL",
        issue: "Database exposed - should not be publicly accessible",
        severity: Severity::High,
    },
    PortIssue {
        port: 3389,
        service: "RDP",
        issue: "RDP exposed - ensure NLA is enabled",
        severity: Severity::High,
    },
    PortIssue {
        port: 5432,
        service: "PostgreSQL",
        issue: "Database exposed - should not be publicly accessible",
        severity: Severity::High,
    },
    PortIssue {
        port: 27017,
        service: "MongoDB",
        issue: "MongoDB exposed - check authentication",
        severity: Severity::High,
    },
];

pub fn port_issue(port: u16) -> Option<&'static PortIssue> {
    WELL_KNOWN_PORTS.iter().find(|p| p.port == port)
}

/// Protocol versions flagged as deprecated when a scan shows them
/// enabled. `TLSv1 ` would also match TLSv1.2, hence the dotted forms.
pub const DEPRECATED_TLS_PROTOCOLS: &[&str] = &["SSLv2", "SSLv3", "TLSv1.0", "TLSv1.1"];

/// Cipher-suite markers aggregated into one weak-cipher finding.
pub const WEAK_CIPHER_MARKERS: &[&str] = &["NULL", "EXPORT", "DES"];

/// Keywords that promote a raw output line to a web-vuln finding when
/// structured output is not parseable.
pub const WEB_VULN_KEYWORDS: &[&str] = &["vulnerable", "outdated", "exposed", "error"];

/// Certificates expiring within this window get a medium finding.
pub const CERT_EXPIRY_WARN_DAYS: i64 = 30;

/// RSA keys under this size get a medium finding.
pub const MIN_PUBLIC_KEY_BITS: usize = 2048;
