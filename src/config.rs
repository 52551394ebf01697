// src/config.rs

use std::time::Duration;

/// Ports probed by the port scan engine when nothing else is configured.
pub const DEFAULT_CANDIDATE_PORTS: &[u16] = &[80, 443, 8080, 8443, 3000, 3001, 22, 21, 25, 53, 110, 993, 995];

/// Security headers the header inspector looks for, in report order.
pub const DEFAULT_RECOGNIZED_HEADERS: &[&str] = &[
    "strict-transport-security",
    "content-security-policy",
    "x-frame-options",
    "x-content-type-options",
    "x-xss-protection",
    "referrer-policy",
];

/// Ports a public web host is expected to expose. Anything else reachable is "unexpected".
pub const EXPECTED_PORTS: &[u16] = &[80, 443];

/// Settings for the optional external network mapper.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    pub program: String,
    /// Flags passed before the hostname.
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            program: "nmap".to_string(),
            args: ["-sS", "-O", "--top-ports", "100"].iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Everything a single assessment needs to know besides the target.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub candidate_ports: Vec<u16>,
    pub recognized_headers: Vec<String>,
    pub port_timeout: Duration,
    pub max_concurrency: usize,
    pub certificate_port: u16,
    pub certificate_timeout: Duration,
    pub header_timeout: Duration,
    pub user_agent: String,
    pub mapper: MapperConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            candidate_ports: DEFAULT_CANDIDATE_PORTS.to_vec(),
            recognized_headers: DEFAULT_RECOGNIZED_HEADERS.iter().map(|s| s.to_string()).collect(),
            port_timeout: Duration::from_secs(3),
            max_concurrency: 20,
            certificate_port: 443,
            certificate_timeout: Duration::from_secs(10),
            header_timeout: Duration::from_secs(10),
            user_agent: format!("VanguardRS/{}", env!("CARGO_PKG_VERSION")),
            mapper: MapperConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Applies the optional command-line overrides on top of the defaults.
    pub fn with_overrides(mut self, port_timeout_secs: Option<u64>, max_concurrency: Option<usize>) -> Self {
        if let Some(secs) = port_timeout_secs {
            self.port_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = max_concurrency {
            self.max_concurrency = n;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_probe_sets() {
        let config = ScanConfig::default();
        assert_eq!(config.candidate_ports.len(), 13);
        assert_eq!(config.recognized_headers.len(), 6);
        assert_eq!(config.port_timeout, Duration::from_secs(3));
        assert_eq!(config.max_concurrency, 20);
        assert_eq!(config.mapper.timeout, Duration::from_secs(30));
        assert!(config.recognized_headers.iter().all(|h| h.chars().all(|c| !c.is_ascii_uppercase())));
    }

    #[test]
    fn overrides_only_touch_what_was_given() {
        let config = ScanConfig::default().with_overrides(Some(1), None);
        assert_eq!(config.port_timeout, Duration::from_secs(1));
        assert_eq!(config.max_concurrency, 20);

        let config = ScanConfig::default().with_overrides(None, Some(4));
        assert_eq!(config.port_timeout, Duration::from_secs(3));
        assert_eq!(config.max_concurrency, 4);
    }
}
