// src/core/risk.rs

use tracing::debug;

use crate::config::EXPECTED_PORTS;
use crate::core::knowledge_base::{self, get_finding_detail, render_recommendation};
use crate::core::models::{
    AnalysisFinding, CertificateAssessment, HeaderAssessment, PortScanResult, RiskAssessment, RiskTier,
};

const CERTIFICATE_WEIGHT: u8 = 40;
const CERTIFICATE_EXPIRING_WEIGHT: u8 = 25;
const HEADERS_WEIGHT: u32 = 40;
const PORTS_WEIGHT: u8 = 20;
const PORTS_PARTIAL_WEIGHT: u8 = 10;

/// A certificate closer than this to expiry only earns the reduced weight.
const EXPIRY_WARNING_DAYS: i64 = 30;

/// Headers that earn a targeted recommendation when missing, in report order.
const TARGETED_HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", knowledge_base::HEADERS_CSP_MISSING),
    ("x-frame-options", knowledge_base::HEADERS_X_FRAME_OPTIONS_MISSING),
    ("strict-transport-security", knowledge_base::HEADERS_HSTS_MISSING),
];

/// Accumulates findings in evaluation order.
#[derive(Default)]
struct Verdict {
    score: u8,
    findings: Vec<AnalysisFinding>,
    recommendations: Vec<String>,
}

impl Verdict {
    fn flag(&mut self, code: &str, ports: &[u16]) {
        let Some(detail) = get_finding_detail(code) else {
            return;
        };
        debug!(code, title = detail.title, category = %detail.category, "Risk finding raised.");
        self.findings.push(AnalysisFinding::new(detail.severity, code));
        if let Some(text) = render_recommendation(code, ports) {
            self.recommendations.push(text);
        }
    }
}

/// Fuses the three probe results into a weighted score, a tier and ordered recommendations.
///
/// Certificate is worth 40 points, header coverage 40, port exposure 20. Failed probes
/// take their worst-case contribution. Recommendations follow evaluation order:
/// certificate, then CSP / X-Frame-Options / HSTS, then ports.
pub fn compute_risk(
    certificate: &CertificateAssessment,
    headers: &HeaderAssessment,
    ports: &PortScanResult,
) -> RiskAssessment {
    let mut verdict = Verdict::default();

    score_certificate(&mut verdict, certificate);
    score_headers(&mut verdict, headers);
    score_ports(&mut verdict, ports);

    let tier = RiskTier::from_score(verdict.score);
    debug!(score = verdict.score, tier = %tier, "Risk assessment computed.");

    RiskAssessment {
        tier,
        score: verdict.score,
        recommendations: verdict.recommendations,
        findings: verdict.findings,
    }
}

fn score_certificate(verdict: &mut Verdict, certificate: &CertificateAssessment) {
    if !certificate.valid {
        verdict.flag(knowledge_base::SSL_INVALID, &[]);
        return;
    }
    match certificate.days_remaining {
        days if days > EXPIRY_WARNING_DAYS => verdict.score += CERTIFICATE_WEIGHT,
        days if days > 0 => {
            verdict.score += CERTIFICATE_EXPIRING_WEIGHT;
            verdict.flag(knowledge_base::SSL_EXPIRING_SOON, &[]);
        }
        _ => verdict.flag(knowledge_base::SSL_EXPIRED, &[]),
    }
}

fn score_headers(verdict: &mut Verdict, headers: &HeaderAssessment) {
    // Integer form of round(coverage / 100 * 40); a half can never occur for integer coverage.
    let coverage = u32::from(headers.coverage_score.min(100));
    verdict.score += ((coverage * HEADERS_WEIGHT + 50) / 100) as u8;

    for (header, code) in TARGETED_HEADERS {
        if headers.missing.iter().any(|m| m.eq_ignore_ascii_case(header)) {
            verdict.flag(code, &[]);
        }
    }
}

fn score_ports(verdict: &mut Verdict, ports: &PortScanResult) {
    let mut unexpected: Vec<u16> = ports
        .reachable
        .iter()
        .copied()
        .filter(|p| !EXPECTED_PORTS.contains(p))
        .collect();
    unexpected.sort_unstable();
    unexpected.dedup();

    match unexpected.len() {
        0 => verdict.score += PORTS_WEIGHT,
        1..=2 => {
            verdict.score += PORTS_PARTIAL_WEIGHT;
            verdict.flag(knowledge_base::PORTS_UNEXPECTED_OPEN, &unexpected);
        }
        _ => verdict.flag(knowledge_base::PORTS_MULTIPLE_UNEXPECTED, &unexpected),
    }
}
