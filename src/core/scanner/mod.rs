// src/core/scanner/mod.rs

// Probe collaborators and the port scan engine.
pub mod headers_scanner;
pub mod nmap_scanner;
pub mod port_scanner;
pub mod ssl_scanner;

use chrono::Utc;
use tracing::{info, warn};
use url::{Host, Url};

use crate::config::ScanConfig;
use crate::core::models::{CompletedReport, ScanReport};
use crate::core::risk::compute_risk;
use self::headers_scanner::{HeaderProbe, HttpHeaderInspector};
use self::nmap_scanner::{CommandRunner, TokioCommandRunner, run_network_map};
use self::port_scanner::{ReachabilityProbe, TcpConnectProbe, scan_ports};
use self::ssl_scanner::{CertificateProbe, TlsCertificateInspector};

/// Runs one assessment: the three probe collaborators plus the port scan engine, then scoring.
#[derive(Debug)]
pub struct Assessor<C, H, P, R> {
    config: ScanConfig,
    certificates: C,
    headers: H,
    ports: P,
    runner: R,
}

impl Assessor<TlsCertificateInspector, HttpHeaderInspector, TcpConnectProbe, TokioCommandRunner> {
    /// Wires the real network-backed collaborators.
    pub fn with_defaults(config: ScanConfig) -> Self {
        let certificates = TlsCertificateInspector::new(config.certificate_timeout);
        let headers = HttpHeaderInspector::new(&config.user_agent, config.header_timeout);
        Self::new(config, certificates, headers, TcpConnectProbe, TokioCommandRunner)
    }
}

impl<C, H, P, R> Assessor<C, H, P, R>
where
    C: CertificateProbe,
    H: HeaderProbe,
    P: ReachabilityProbe,
    R: CommandRunner,
{
    pub fn new(config: ScanConfig, certificates: C, headers: H, ports: P, runner: R) -> Self {
        Self { config, certificates, headers, ports, runner }
    }

    /// Assesses the host named by `url`.
    ///
    /// Probes run concurrently with `tokio::join!`; each one degrades on its own and the
    /// report always carries every section. A URL without a host yields
    /// `ScanReport::Rejected` and nothing is probed.
    pub async fn assess(&self, url: &str) -> ScanReport {
        let Some(hostname) = target_host(url) else {
            warn!(url, "Rejecting URL without a resolvable host.");
            return ScanReport::Rejected {
                error: "Invalid URL provided".to_string(),
                url: url.to_string(),
            };
        };

        info!(url, host = %hostname, "Starting vulnerability scan.");
        let config = &self.config;

        let (ssl, headers, ports, nmap) = tokio::join!(
            self.certificates.inspect(&hostname, config.certificate_port),
            self.headers.inspect(url, &config.recognized_headers),
            scan_ports(
                &self.ports,
                &hostname,
                &config.candidate_ports,
                config.port_timeout,
                config.max_concurrency,
            ),
            run_network_map(&self.runner, &hostname, &config.mapper)
        );

        let risk = compute_risk(&ssl, &headers, &ports);
        info!(score = risk.score, tier = %risk.tier, recommendations = risk.recommendations.len(), "Scan complete.");

        ScanReport::Completed(Box::new(CompletedReport {
            url: url.to_string(),
            timestamp: Utc::now(),
            ssl,
            headers,
            ports,
            nmap,
            risk,
        }))
    }
}

/// Extracts the host to probe. IPv6 literals come back without brackets.
fn target_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.host()? {
        Host::Domain(domain) if !domain.is_empty() => Some(domain.to_string()),
        Host::Domain(_) => None,
        Host::Ipv4(ip) => Some(ip.to_string()),
        Host::Ipv6(ip) => Some(ip.to_string()),
    }
}
