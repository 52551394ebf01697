// src/core/scanner/port_scanner.rs

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::core::models::PortScanResult;

/// Capability to decide whether a single `(hostname, port)` accepts connections.
///
/// Implementations need not enforce a deadline; the engine bounds every call.
pub trait ReachabilityProbe: Sync {
    fn is_reachable(&self, hostname: &str, port: u16) -> impl Future<Output = bool> + Send;
}

/// Plain TCP connect(). Any failure (refused, unreachable, DNS) is "not reachable".
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnectProbe;

impl ReachabilityProbe for TcpConnectProbe {
    async fn is_reachable(&self, hostname: &str, port: u16) -> bool {
        match TcpStream::connect((hostname, port)).await {
            Ok(_) => true,
            Err(e) => {
                debug!(port, error = %e, "Connection attempt failed.");
                false
            }
        }
    }
}

async fn probe_port<P: ReachabilityProbe>(probe: &P, hostname: &str, port: u16, timeout: Duration) -> (u16, bool) {
    let reachable = tokio::time::timeout(timeout, probe.is_reachable(hostname, port))
        .await
        .unwrap_or_else(|_| {
            debug!(port, "Connection attempt timed out.");
            false
        });
    debug!(port, reachable, "Port probed.");
    (port, reachable)
}

/// Probes every candidate port with at most `max_concurrency` attempts in flight.
///
/// Returns only once every probe has finished. Each candidate lands in exactly one of
/// `reachable` / `unreachable`, both sorted ascending. Duplicate candidates are probed once.
pub async fn scan_ports<P: ReachabilityProbe>(
    probe: &P,
    hostname: &str,
    candidate_ports: &[u16],
    per_connection_timeout: Duration,
    max_concurrency: usize,
) -> PortScanResult {
    let start = Instant::now();
    let candidates: BTreeSet<u16> = candidate_ports.iter().copied().collect();
    let window = max_concurrency.max(1);
    info!(host = hostname, candidates = candidates.len(), window, "Starting port scan.");

    let mut pending = candidates.iter().copied();
    let mut in_flight = FuturesUnordered::new();
    let mut reachable = Vec::new();
    let mut unreachable = Vec::new();

    for port in pending.by_ref().take(window) {
        in_flight.push(probe_port(probe, hostname, port, per_connection_timeout));
    }

    while let Some((port, is_open)) = in_flight.next().await {
        if is_open {
            reachable.push(port);
        } else {
            unreachable.push(port);
        }
        if let Some(next) = pending.next() {
            in_flight.push(probe_port(probe, hostname, next, per_connection_timeout));
        }
    }

    reachable.sort_unstable();
    unreachable.sort_unstable();

    info!(
        open = reachable.len(),
        closed = unreachable.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Port scan finished."
    );

    PortScanResult {
        reachable,
        unreachable,
        total_candidates: candidates.len(),
    }
}
