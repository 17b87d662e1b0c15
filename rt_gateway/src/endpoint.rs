//! Base-URL validation for the remote service endpoint.
//!
//! The bridge issues requests to an operator-supplied URL, so the URL is
//! validated against scheme and address-space policy before any client is
//! constructed: plaintext only when explicitly permitted, and no loopback,
//! private-range, link-local, or cloud-metadata destinations.
//!
//! Hostnames that merely *resolve* to a blocked address are not caught here;
//! that residual risk is accepted because validation runs before any DNS
//! lookup exists to consult.

use std::net::{Ipv4Addr, Ipv6Addr};

use thiserror::Error;
use url::{Host, Url};

/// A candidate endpoint URL failed validation.
#[derive(Debug, Error)]
#[error("invalid endpoint: {reason}")]
pub struct InvalidEndpoint {
    /// Human-readable description of the failed check.
    pub reason: String,
}

impl InvalidEndpoint {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Hostnames that are never acceptable destinations.
const BLOCKED_HOSTNAMES: [&str; 4] = [
    "localhost",
    "localhost.localdomain",
    "metadata.google.internal",
    "metadata.internal",
];

/// Validates a service base URL, returning it unchanged when acceptable.
///
/// `allow_http` permits plaintext transport for test deployments; the scheme
/// must be `http` or `https` in every case.
pub fn validate_endpoint(url: &str, allow_http: bool) -> Result<&str, InvalidEndpoint> {
    if url.is_empty() {
        return Err(InvalidEndpoint::new("URL cannot be empty"));
    }

    let parsed =
        Url::parse(url).map_err(|err| InvalidEndpoint::new(format!("Invalid URL format: {err}")))?;

    match parsed.scheme() {
        "https" => {}
        "http" if allow_http => {}
        "http" => {
            return Err(InvalidEndpoint::new("Only HTTPS URLs are allowed"));
        }
        scheme => {
            return Err(InvalidEndpoint::new(format!("Invalid URL scheme: {scheme}")));
        }
    }

    match parsed.host() {
        None => Err(InvalidEndpoint::new("URL must include a hostname")),
        Some(Host::Domain(domain)) => {
            let lower = domain.to_ascii_lowercase();
            if BLOCKED_HOSTNAMES.contains(&lower.as_str()) {
                return Err(InvalidEndpoint::new(format!("Blocked hostname: {domain}")));
            }
            if lower.ends_with(".internal") || lower.ends_with(".local") {
                return Err(InvalidEndpoint::new(format!(
                    "Blocked hostname pattern: {domain}"
                )));
            }
            Ok(url)
        }
        Some(Host::Ipv4(v4)) => {
            if is_blocked_v4(v4) {
                return Err(InvalidEndpoint::new(format!("Blocked IP range: {v4}")));
            }
            Ok(url)
        }
        Some(Host::Ipv6(v6)) => {
            if is_blocked_v6(v6) {
                return Err(InvalidEndpoint::new(format!("Blocked IP range: {v6}")));
            }
            Ok(url)
        }
    }
}

/// 10/8, 172.16/12, 192.168/16, 127/8, and 169.254/16 (the cloud metadata
/// endpoint lives in the last).
fn is_blocked_v4(ip: Ipv4Addr) -> bool {
    ip.is_private() || ip.is_loopback() || ip.is_link_local()
}

/// ::1/128, fe80::/10, and fc00::/7.
fn is_blocked_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback() || (first & 0xffc0) == 0xfe80 || (first & 0xfe00) == 0xfc00
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_https() {
        assert_eq!(
            validate_endpoint("https://rt.example.com", false).expect("valid"),
            "https://rt.example.com"
        );
        assert!(validate_endpoint("https://rt.example.com/rt", false).is_ok());
    }

    #[test]
    fn rejects_plaintext_unless_permitted() {
        assert!(validate_endpoint("http://rt.example.com", false).is_err());
        assert!(validate_endpoint("http://rt.example.com", true).is_ok());
    }

    #[test]
    fn rejects_non_http_schemes() {
        let err = validate_endpoint("ftp://rt.example.com", true).unwrap_err();
        assert!(err.reason.contains("scheme"));
        assert!(validate_endpoint("", false).is_err());
        assert!(validate_endpoint("not a url", false).is_err());
    }

    #[test]
    fn rejects_blocked_hostnames_and_patterns() {
        for url in [
            "http://localhost/",
            "http://LOCALHOST/",
            "http://localhost.localdomain/",
            "http://metadata.google.internal/",
            "http://metadata.internal/",
            "http://foo.internal/",
            "http://printer.local/",
        ] {
            assert!(validate_endpoint(url, true).is_err(), "{url} should be rejected");
        }
    }

    #[test]
    fn rejects_private_and_metadata_addresses() {
        for url in [
            "http://169.254.169.254/",
            "http://10.0.0.5/",
            "http://172.16.0.1/",
            "http://192.168.1.10/",
            "http://127.0.0.1/",
            "http://[::1]/",
            "http://[fe80::1]/",
            "http://[fd00::1]/",
        ] {
            assert!(validate_endpoint(url, true).is_err(), "{url} should be rejected");
        }
        assert!(validate_endpoint("http://[2001:db8::1]/", true).is_ok());
        assert!(validate_endpoint("http://8.8.8.8/", true).is_ok());
    }
}
