// src/core/scanner/ssl_scanner.rs

use tracing::{debug, error, info, warn};

use crate::core::models::CertificateAssessment;
use chrono::{DateTime, Utc};
use native_tls::TlsConnector;
use std::future::Future;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;
use tokio::net::lookup_host;
use tokio::task::spawn_blocking;
use x509_parser::prelude::*;

const SECONDS_PER_DAY: i64 = 86_400;

/// Capability to fetch and summarize the certificate a host presents on `port`.
///
/// Implementations never fail: every problem becomes `CertificateAssessment::failed`.
pub trait CertificateProbe: Sync {
    fn inspect(&self, hostname: &str, port: u16) -> impl Future<Output = CertificateAssessment> + Send;
}

/// Reads the peer certificate over a real TLS handshake.
///
/// Chain and hostname verification are disabled; expiry shows up in `days_remaining`.
/// The timeout bounds name resolution, connect, and every read and write.
#[derive(Debug, Clone)]
pub struct TlsCertificateInspector {
    timeout: Duration,
}

impl TlsCertificateInspector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CertificateProbe for TlsCertificateInspector {
    async fn inspect(&self, hostname: &str, port: u16) -> CertificateAssessment {
        info!(host = hostname, port, "Starting SSL/TLS certificate check.");
        let target_owned = hostname.to_string();
        let timeout = self.timeout;

        let scan_result = match resolve(hostname, port, timeout).await {
            Ok(addrs) => {
                debug!("Spawning blocking task for TLS connection.");
                spawn_blocking(move || perform_tls_scan(&target_owned, &addrs, timeout))
                    .await
                    .unwrap_or_else(|e| {
                        error!(panic = %e, "Blocking SSL scan task panicked!");
                        Err(format!("Task panicked: {}", e))
                    })
            }
            Err(e) => Err(e),
        };

        let assessment = scan_result.unwrap_or_else(|e| {
            warn!(host = hostname, error = %e, "Certificate check failed.");
            CertificateAssessment::failed(e)
        });

        info!(valid = assessment.valid, days_remaining = assessment.days_remaining, "SSL/TLS certificate check finished.");
        assessment
    }
}

async fn resolve(target: &str, port: u16, timeout: Duration) -> Result<Vec<SocketAddr>, String> {
    match tokio::time::timeout(timeout, lookup_host((target, port))).await {
        Ok(Ok(addrs)) => Ok(addrs.collect()),
        Ok(Err(e)) => {
            error!(error = %e, "Address resolution failed");
            Err(format!("DNS Resolution Error: {}", e))
        }
        Err(_) => {
            error!(?timeout, "Address resolution timed out");
            Err(format!("DNS Resolution Error: timed out after {:?}", timeout))
        }
    }
}

fn connect(target: &str, addrs: &[SocketAddr], timeout: Duration) -> Result<TcpStream, String> {
    let mut last_error = None;
    for addr in addrs {
        debug!(%addr, "Connecting TCP stream.");
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }

    Err(match last_error {
        Some(e) => format!("TCP Connection Error: {}", e),
        None => format!("TCP Connection Error: no address found for {}", target),
    })
}

fn perform_tls_scan(target: &str, addrs: &[SocketAddr], timeout: Duration) -> Result<CertificateAssessment, String> {
    debug!(host = target, "Performing TLS connection and handshake.");

    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to create TlsConnector");
            format!("TlsConnector Error: {}", e)
        })?;

    let stream = connect(target, addrs, timeout)?;
    stream
        .set_read_timeout(Some(timeout))
        .and_then(|_| stream.set_write_timeout(Some(timeout)))
        .map_err(|e| format!("Socket Configuration Error: {}", e))?;

    let stream = connector.connect(target, stream).map_err(|e| {
        error!(error = %e, "TLS handshake failed");
        format!("TLS Handshake Error: {}", e)
    })?;

    let cert = stream
        .peer_certificate()
        .map_err(|e| format!("Could not get peer certificate: {}", e))?
        .ok_or_else(|| "Server did not provide a certificate.".to_string())?;

    let cert_der = cert.to_der().map_err(|e| {
        error!(error = %e, "Failed to convert certificate to DER format");
        format!("Could not convert certificate to DER: {}", e)
    })?;

    let (_, x509) = parse_x509_certificate(&cert_der).map_err(|e| {
        error!(error = %e, "Failed to parse X.509 certificate");
        format!("X.509 Parse Error: {}", e)
    })?;

    info!(subject = %x509.subject(), issuer = %x509.issuer(), "Successfully parsed certificate.");
    Ok(assess_certificate(&x509, Utc::now()))
}

fn assess_certificate(x509: &X509Certificate<'_>, now: DateTime<Utc>) -> CertificateAssessment {
    let validity = x509.validity();
    let not_before = asn1_time_to_chrono_utc(&validity.not_before);
    let not_after = asn1_time_to_chrono_utc(&validity.not_after);

    CertificateAssessment::inspected(
        now >= not_before,
        days_until(not_after, now),
        common_name(x509.issuer()),
        common_name(x509.subject()),
        format_expiry(not_after),
    )
}

fn common_name(name: &X509Name<'_>) -> String {
    name.iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .unwrap_or("Unknown")
        .to_string()
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

/// Whole days left until `expiry`, rounded towards negative infinity.
fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    expiry.signed_duration_since(now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Renders a timestamp the way certificate tooling prints notAfter, e.g. `Jun  1 12:00:00 2026 GMT`.
fn format_expiry(time: DateTime<Utc>) -> String {
    time.format("%b %e %H:%M:%S %Y GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    // Self-signed, valid Jan  1 00:00:00 2026 GMT to Apr  1 12:00:00 2026 GMT.
    const CN_CERT: &[u8] = include_bytes!("../../../testdata/cn_cert.pem");
    // Same validity window, subject has O and OU but no CN.
    const NO_CN_CERT: &[u8] = include_bytes!("../../../testdata/no_cn_cert.pem");

    fn assess_pem(pem_bytes: &[u8], now: DateTime<Utc>) -> CertificateAssessment {
        let (_, pem) = x509_parser::pem::parse_x509_pem(pem_bytes).unwrap();
        let x509 = pem.parse_x509().unwrap();
        assess_certificate(&x509, now)
    }

    #[test]
    fn certificate_inside_its_window_is_valid() {
        let assessment = assess_pem(CN_CERT, at(2026, 3, 1, 0));

        assert!(assessment.valid);
        assert_eq!(assessment.days_remaining, 31);
        assert_eq!(assessment.issuer.as_deref(), Some("vanguard.test"));
        assert_eq!(assessment.subject.as_deref(), Some("vanguard.test"));
        assert_eq!(assessment.raw_expiry.as_deref(), Some("Apr  1 12:00:00 2026 GMT"));
        assert!(assessment.error.is_none());
    }

    #[test]
    fn certificate_before_not_before_is_invalid() {
        let assessment = assess_pem(CN_CERT, at(2025, 12, 31, 0));
        assert!(!assessment.valid);
        assert_eq!(assessment.raw_expiry.as_deref(), Some("Apr  1 12:00:00 2026 GMT"));
    }

    #[test]
    fn expired_certificate_stays_valid_with_negative_days() {
        let assessment = assess_pem(CN_CERT, at(2026, 4, 3, 12));
        assert!(assessment.valid);
        assert_eq!(assessment.days_remaining, -2);
    }

    #[test]
    fn names_without_common_name_fall_back_to_unknown() {
        let assessment = assess_pem(NO_CN_CERT, at(2026, 2, 1, 0));
        assert!(assessment.valid);
        assert_eq!(assessment.issuer.as_deref(), Some("Unknown"));
        assert_eq!(assessment.subject.as_deref(), Some("Unknown"));
    }

    #[tokio::test]
    async fn unresolvable_host_yields_dns_failure() {
        let inspector = TlsCertificateInspector::new(Duration::from_secs(2));
        let assessment = inspector.inspect("no-such-host.invalid", 443).await;

        assert!(!assessment.valid);
        assert_eq!(assessment.days_remaining, 0);
        assert!(assessment.error.as_deref().unwrap_or_default().starts_with("DNS Resolution Error"));
    }

    #[test]
    fn days_until_floors_partial_days() {
        let now = at(2026, 1, 10, 12);
        assert_eq!(days_until(now + ChronoDuration::days(60), now), 60);
        assert_eq!(days_until(now + ChronoDuration::hours(30), now), 1);
        assert_eq!(days_until(now + ChronoDuration::hours(5), now), 0);
        assert_eq!(days_until(now - ChronoDuration::hours(5), now), -1);
        assert_eq!(days_until(now - ChronoDuration::days(3), now), -3);
    }

    #[test]
    fn expiry_is_rendered_with_padded_day() {
        assert_eq!(format_expiry(at(2026, 6, 1, 12)), "Jun  1 12:00:00 2026 GMT");
        assert_eq!(format_expiry(at(2027, 11, 23, 8)), "Nov 23 08:00:00 2027 GMT");
    }

    #[tokio::test]
    async fn closed_port_yields_structured_failure() {
        let port = {
            let spare = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            spare.local_addr().unwrap().port()
        };

        let inspector = TlsCertificateInspector::new(Duration::from_secs(2));
        let assessment = inspector.inspect("127.0.0.1", port).await;

        assert!(!assessment.valid);
        assert_eq!(assessment.days_remaining, 0);
        assert!(assessment.error.as_deref().unwrap_or_default().starts_with("TCP Connection Error"));
        assert!(assessment.issuer.is_none());
    }

    #[tokio::test]
    async fn non_tls_server_yields_handshake_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            if let Ok((mut stream, _)) = listener.accept().await {
                let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n").await;
            }
        });

        let inspector = TlsCertificateInspector::new(Duration::from_secs(2));
        let assessment = inspector.inspect("127.0.0.1", port).await;

        assert!(!assessment.valid);
        assert!(assessment.error.as_deref().unwrap_or_default().starts_with("TLS Handshake Error"));
    }
}
