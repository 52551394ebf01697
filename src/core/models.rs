// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

// --- Findings ---

// Severity of a single finding produced by the risk aggregator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

// A machine-readable finding: which rule fired and how bad it is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisFinding {
    pub severity: Severity,
    pub code: String,
}

impl AnalysisFinding {
    pub fn new(severity: Severity, code: &str) -> Self {
        Self { severity, code: code.to_string() }
    }
}

// --- Certificate Inspector ---

/// Outcome of inspecting the TLS certificate presented by the target.
///
/// On failure only `valid` (false), `days_remaining` (0) and `error` are set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateAssessment {
    pub valid: bool,
    pub days_remaining: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "expires", skip_serializing_if = "Option::is_none")]
    pub raw_expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CertificateAssessment {
    pub fn inspected(valid: bool, days_remaining: i64, issuer: String, subject: String, raw_expiry: String) -> Self {
        Self {
            valid,
            days_remaining,
            issuer: Some(issuer),
            subject: Some(subject),
            raw_expiry: Some(raw_expiry),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            days_remaining: 0,
            issuer: None,
            subject: None,
            raw_expiry: None,
            error: Some(error.into()),
        }
    }
}

// --- Header Inspector ---

/// Which recognized security headers the target's response carried.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderAssessment {
    pub missing: Vec<String>,
    pub present: Vec<String>,
    #[serde(rename = "score")]
    pub coverage_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HeaderAssessment {
    /// Builds a successful assessment; coverage is the rounded share of headers that are present.
    pub fn observed(present: Vec<String>, missing: Vec<String>, status_code: u16) -> Self {
        let total = present.len() + missing.len();
        Self {
            coverage_score: coverage_score(present.len(), total),
            missing,
            present,
            status_code: Some(status_code),
            error: None,
        }
    }

    /// A failed request counts every recognized header as missing.
    pub fn failed(recognized: &[String], error: impl Into<String>) -> Self {
        Self {
            missing: recognized.to_vec(),
            present: Vec::new(),
            coverage_score: 0,
            status_code: None,
            error: Some(error.into()),
        }
    }
}

/// Percentage of recognized headers present, rounded half to even. An empty set scores 0.
pub fn coverage_score(present: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (present.min(total) as f64 / total as f64) * 100.0;
    pct.round_ties_even() as u8
}

// --- Port Scan Engine ---

/// Partition of the candidate ports into reachable and unreachable, both ascending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortScanResult {
    #[serde(rename = "open")]
    pub reachable: Vec<u16>,
    #[serde(rename = "closed")]
    pub unreachable: Vec<u16>,
    #[serde(rename = "total")]
    pub total_candidates: usize,
}

// --- External Network Mapper ---

// One row of the mapper's open-port table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappedPort {
    pub port: u16,
    pub protocol: String,
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapperAssessment {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub open_ports: Vec<MappedPort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MapperAssessment {
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            available: false,
            output: None,
            summary: None,
            open_ports: Vec::new(),
            error: Some(error.into()),
        }
    }
}

// --- Risk Aggregator ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
pub enum RiskTier {
    #[serde(rename = "LOW RISK")]
    #[strum(serialize = "LOW RISK")]
    Low,
    #[serde(rename = "MEDIUM RISK")]
    #[strum(serialize = "MEDIUM RISK")]
    Medium,
    #[serde(rename = "HIGH RISK")]
    #[strum(serialize = "HIGH RISK")]
    High,
}

impl RiskTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => RiskTier::Low,
            50..=79 => RiskTier::Medium,
            _ => RiskTier::High,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskAssessment {
    #[serde(rename = "overall_risk")]
    pub tier: RiskTier,
    #[serde(rename = "security_score")]
    pub score: u8,
    pub recommendations: Vec<String>,
    pub findings: Vec<AnalysisFinding>,
}

// --- Main Report ---

/// Every probe section plus the flattened risk verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedReport {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub ssl: CertificateAssessment,
    pub headers: HeaderAssessment,
    pub ports: PortScanResult,
    pub nmap: MapperAssessment,
    #[serde(flatten)]
    pub risk: RiskAssessment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScanReport {
    Completed(Box<CompletedReport>),
    /// The input had no usable host, nothing was probed.
    Rejected { error: String, url: String },
}
