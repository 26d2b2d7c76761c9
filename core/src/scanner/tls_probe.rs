// Direct TLS probe used when sslscan is not installed: handshake with
// the target, inspect the certificate and the accepted protocol floor.

use super::severity;
use super::{host_only, Finding, ScanOutcome, Severity};
use chrono::{DateTime, Utc};
use native_tls::{Protocol, TlsConnector};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, warn};
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const TLS_PORT: u16 = 443;

pub async fn probe(target: &str) -> ScanOutcome {
    let host = host_only(target).to_string();
    debug!(host = %host, "sslscan unavailable, falling back to direct TLS probe");

    match tokio::task::spawn_blocking(move || probe_blocking(&host)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "TLS probe task panicked");
            ScanOutcome::failure(format!("SSL check failed: {}", e))
        }
    }
}

fn probe_blocking(host: &str) -> ScanOutcome {
    match inspect(host) {
        Ok(findings) => {
            let summary = format!("SSL check completed. Found {} issues", findings.len());
            ScanOutcome::completed(findings, summary)
        }
        Err(e) => ScanOutcome::empty(format!("SSL check failed: {}", e)),
    }
}

fn inspect(host: &str) -> Result<Vec<Finding>, String> {
    // Invalid certs are accepted on purpose: an expired chain is
    // exactly what the probe needs to look at.
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| format!("TlsConnector error: {}", e))?;

    let stream = connect(host)?;
    let stream = connector
        .connect(host, stream)
        .map_err(|e| format!("TLS handshake failed: {}", e))?;

    let mut findings = Vec::new();

    match stream.peer_certificate() {
        Ok(Some(cert)) => {
            let der = cert
                .to_der()
                .map_err(|e| format!("could not read peer certificate: {}", e))?;
            if let Ok((_, x509)) = parse_x509_certificate(&der) {
                inspect_certificate(&x509, &mut findings);
            }
        }
        Ok(None) => debug!(host, "handshake succeeded but no peer certificate"),
        Err(e) => warn!(host, error = %e, "could not retrieve peer certificate"),
    }
    drop(stream);

    // A second handshake capped at TLSv1.1 tells us whether the server
    // still accepts deprecated protocol versions.
    if accepts_deprecated_protocol(host) {
        findings.push(Finding::new(
            "Outdated SSL/TLS Version",
            "Server accepts TLSv1.1 or older, which is deprecated",
            Severity::High,
        ));
    }

    Ok(findings)
}

fn inspect_certificate(cert: &X509Certificate<'_>, findings: &mut Vec<Finding>) {
    let not_after = DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0)
        .unwrap_or_default();
    let days_left = not_after.signed_duration_since(Utc::now()).num_days();

    if days_left < 0 {
        findings.push(Finding::new(
            "Expired Certificate",
            "SSL certificate has expired",
            Severity::Critical,
        ));
    } else if days_left < severity::CERT_EXPIRY_WARN_DAYS {
        findings.push(Finding::new(
            "Expiring Certificate",
            format!("SSL certificate expires in {} days", days_left),
            Severity::Medium,
        ));
    }

    // native-tls does not expose the negotiated cipher strength, so key
    // size stands in for the weak-crypto check.
    if let Ok(PublicKey::RSA(rsa)) = cert.public_key().parsed() {
        let bits = rsa.key_size();
        if bits < severity::MIN_PUBLIC_KEY_BITS {
            findings.push(Finding::new(
                "Weak Public Key",
                format!("RSA key is only {} bits", bits),
                Severity::Medium,
            ));
        }
    }
}

fn accepts_deprecated_protocol(host: &str) -> bool {
    let connector = match TlsConnector::builder()
        .max_protocol_version(Some(Protocol::Tlsv11))
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
    {
        Ok(connector) => connector,
        Err(_) => return false,
    };

    match connect(host) {
        Ok(stream) => connector.connect(host, stream).is_ok(),
        Err(_) => false,
    }
}

fn connect(host: &str) -> Result<TcpStream, String> {
    let mut addrs = (host, TLS_PORT)
        .to_socket_addrs()
        .map_err(|e| format!("could not resolve {}: {}", host, e))?;
    let addr = addrs
        .next()
        .ok_or_else(|| format!("no address for {}", host))?;
    TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
        .map_err(|e| format!("TCP connection failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unresolvable_host_degrades_to_empty_outcome() {
        let outcome = probe("no-such-host.invalid").await;
        assert!(!outcome.failed);
        assert!(outcome.findings.is_empty());
        assert!(outcome.summary.contains("SSL check failed"));
    }
}
