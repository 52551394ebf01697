//! Static catalogue of every recommendation the risk aggregator can emit.
//! Wording lives here so the scoring code only deals in finding codes.

use crate::core::models::Severity;
use std::fmt;

pub const SSL_EXPIRING_SOON: &str = "SSL_EXPIRING_SOON";
pub const SSL_EXPIRED: &str = "SSL_EXPIRED";
pub const SSL_INVALID: &str = "SSL_INVALID";
pub const HEADERS_CSP_MISSING: &str = "HEADERS_CSP_MISSING";
pub const HEADERS_X_FRAME_OPTIONS_MISSING: &str = "HEADERS_X_FRAME_OPTIONS_MISSING";
pub const HEADERS_HSTS_MISSING: &str = "HEADERS_HSTS_MISSING";
pub const PORTS_UNEXPECTED_OPEN: &str = "PORTS_UNEXPECTED_OPEN";
pub const PORTS_MULTIPLE_UNEXPECTED: &str = "PORTS_MULTIPLE_UNEXPECTED";

/// High-level grouping of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingCategory {
    /// SSL/TLS certificate state.
    Ssl,
    /// HTTP security headers.
    Http,
    /// Reachable network ports.
    Network,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::Ssl => write!(f, "SSL/TLS Certificate"),
            FindingCategory::Http => write!(f, "HTTP Security Headers"),
            FindingCategory::Network => write!(f, "Network Exposure"),
        }
    }
}

/// Everything known about one finding code.
pub struct FindingDetail {
    /// Machine-readable identifier, e.g. "SSL_EXPIRED".
    pub code: &'static str,
    pub title: &'static str,
    pub category: FindingCategory,
    pub severity: Severity,
    /// Text shown in the report. Port findings contain a `{ports}` placeholder.
    pub recommendation: &'static str,
}

static FINDINGS: &[FindingDetail] = &[
    // --- SSL/TLS ---
    FindingDetail {
        code: SSL_EXPIRING_SOON,
        title: "SSL Certificate Expiring Soon",
        category: FindingCategory::Ssl,
        severity: Severity::Warning,
        recommendation: "SSL certificate expires soon - consider renewal",
    },
    FindingDetail {
        code: SSL_EXPIRED,
        title: "SSL Certificate Expired",
        category: FindingCategory::Ssl,
        severity: Severity::Critical,
        recommendation: "SSL certificate has expired - critical security issue",
    },
    FindingDetail {
        code: SSL_INVALID,
        title: "SSL Certificate Unusable",
        category: FindingCategory::Ssl,
        severity: Severity::Critical,
        recommendation: "Fix SSL certificate issues - critical security vulnerability",
    },

    // --- HTTP headers ---
    FindingDetail {
        code: HEADERS_CSP_MISSING,
        title: "CSP Header Missing",
        category: FindingCategory::Http,
        severity: Severity::Warning,
        recommendation: "Add Content-Security-Policy header to prevent XSS attacks",
    },
    FindingDetail {
        code: HEADERS_X_FRAME_OPTIONS_MISSING,
        title: "X-Frame-Options Missing",
        category: FindingCategory::Http,
        severity: Severity::Warning,
        recommendation: "Enable X-Frame-Options to prevent clickjacking",
    },
    FindingDetail {
        code: HEADERS_HSTS_MISSING,
        title: "HSTS Header Missing",
        category: FindingCategory::Http,
        severity: Severity::Warning,
        recommendation: "Add Strict-Transport-Security header for HTTPS enforcement",
    },

    // --- Network exposure ---
    FindingDetail {
        code: PORTS_UNEXPECTED_OPEN,
        title: "Unnecessary Ports Open",
        category: FindingCategory::Network,
        severity: Severity::Warning,
        recommendation: "Consider closing unnecessary ports: {ports}",
    },
    FindingDetail {
        code: PORTS_MULTIPLE_UNEXPECTED,
        title: "Multiple Unnecessary Ports Open",
        category: FindingCategory::Network,
        severity: Severity::Critical,
        recommendation: "Multiple unnecessary ports open: {ports} - security risk",
    },
];

/// Looks up the catalogue entry for `code`.
pub fn get_finding_detail(code: &str) -> Option<&'static FindingDetail> {
    FINDINGS.iter().find(|f| f.code == code)
}

/// Renders the recommendation text for `code`, substituting `ports` as a comma-separated list.
///
/// Returns `None` for codes missing from the catalogue.
pub fn render_recommendation(code: &str, ports: &[u16]) -> Option<String> {
    let detail = get_finding_detail(code)?;
    if !detail.recommendation.contains("{ports}") {
        return Some(detail.recommendation.to_string());
    }
    let list = ports.iter().map(u16::to_string).collect::<Vec<_>>().join(", ");
    Some(detail.recommendation.replace("{ports}", &list))
}
