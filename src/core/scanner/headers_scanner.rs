// src/core/scanner/headers_scanner.rs

use tracing::{debug, error, info};
use crate::core::models::HeaderAssessment;
use reqwest::header::HeaderMap;
use std::future::Future;
use std::time::Duration;

/// Capability to report which of the `recognized` security headers a URL responds with.
///
/// Request failures are reported through `HeaderAssessment::failed`, never as errors.
pub trait HeaderProbe: Sync {
    fn inspect(&self, url: &str, recognized: &[String]) -> impl Future<Output = HeaderAssessment> + Send;
}

/// Issues a single HTTP HEAD request with redirects followed.
#[derive(Debug, Clone)]
pub struct HttpHeaderInspector {
    client: Result<reqwest::Client, String>,
}

impl HttpHeaderInspector {
    /// Builds the HTTP client up front. A build failure is kept and reported on every inspection.
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build HTTP client for headers scan.");
                format!("Failed to build HTTP client: {}", e)
            });
        Self { client }
    }
}

impl HeaderProbe for HttpHeaderInspector {
    async fn inspect(&self, url: &str, recognized: &[String]) -> HeaderAssessment {
        info!(url, "Starting headers scan.");

        let client = match &self.client {
            Ok(c) => c,
            Err(e) => return HeaderAssessment::failed(recognized, e.clone()),
        };

        match client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                info!(status = %status, final_url = %response.url(), "Received HTTP response for headers scan.");
                let assessment = classify_headers(response.headers(), recognized, status.as_u16());
                info!(score = assessment.coverage_score, missing = assessment.missing.len(), "Headers scan finished.");
                assessment
            }
            Err(e) => {
                error!(url, error = %e, "HTTP request failed for headers scan.");
                HeaderAssessment::failed(recognized, format!("HTTP request failed: {}", e))
            }
        }
    }
}

/// Splits `recognized` into present and missing, keeping the configured order.
///
/// Header names are matched case-insensitively; the report uses the lowercase form.
fn classify_headers(headers: &HeaderMap, recognized: &[String], status_code: u16) -> HeaderAssessment {
    let mut present = Vec::new();
    let mut missing = Vec::new();

    for name in recognized {
        let name = name.to_ascii_lowercase();
        if headers.contains_key(name.as_str()) {
            debug!(header_name = %name, "Header found.");
            present.push(name);
        } else {
            debug!(header_name = %name, "Header not found.");
            missing.push(name);
        }
    }

    HeaderAssessment::observed(present, missing, status_code)
}
