// src/core/scanner/nmap_scanner.rs

use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::MapperConfig;
use crate::core::models::{MappedPort, MapperAssessment};

/// Matches rows like `22/tcp   open  ssh` in the mapper's port table.
static OPEN_PORT_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(\d{1,5})/(tcp|udp|sctp)\s+open\s+(\S+)").expect("open port pattern is valid")
});

/// Captured result of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0} not installed")]
    NotFound(String),
    #[error("command timed out after {0:?}")]
    TimedOut(Duration),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs an external program to completion and captures its output.
pub trait CommandRunner: Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send;
}

/// `tokio::process` backed runner. The child is killed if the deadline passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput, CommandError> {
        debug!(program, ?args, "Spawning external command.");
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => CommandError::NotFound(program.to_string()),
                _ => CommandError::Io(e),
            })?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| CommandError::TimedOut(timeout))??;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs the external network mapper against `hostname`.
///
/// A missing binary, a non-zero exit or a timeout are all reported as `available: false`.
pub async fn run_network_map<R: CommandRunner>(runner: &R, hostname: &str, config: &MapperConfig) -> MapperAssessment {
    info!(host = hostname, program = %config.program, "Starting external network map.");

    let mut args = config.args.clone();
    args.push(hostname.to_string());

    match runner.run(&config.program, &args, config.timeout).await {
        Ok(output) if output.success => {
            let open_ports = parse_open_ports(&output.stdout);
            info!(open_ports = open_ports.len(), "External network map finished.");
            MapperAssessment {
                available: true,
                output: Some(output.stdout),
                summary: Some("Nmap scan completed successfully".to_string()),
                open_ports,
                error: None,
            }
        }
        Ok(output) => {
            warn!(stderr = %output.stderr.trim(), "External network map exited with failure.");
            MapperAssessment::unavailable("Nmap scan failed")
        }
        Err(CommandError::NotFound(program)) => {
            warn!(%program, "External network mapper is not installed.");
            MapperAssessment::unavailable("Nmap not installed")
        }
        Err(CommandError::TimedOut(after)) => {
            warn!(?after, "External network map timed out.");
            MapperAssessment::unavailable("Nmap scan timeout")
        }
        Err(e) => {
            warn!(error = %e, "External network map could not run.");
            MapperAssessment::unavailable(e.to_string())
        }
    }
}

fn parse_open_ports(stdout: &str) -> Vec<MappedPort> {
    OPEN_PORT_ROW
        .captures_iter(stdout)
        .filter_map(|caps| {
            Some(MappedPort {
                port: caps[1].parse().ok()?,
                protocol: caps[2].to_string(),
                service: caps[3].to_string(),
            })
        })
        .collect()
}
