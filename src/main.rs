// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

mod config;
mod core;
mod logging;

use crate::config::ScanConfig;
use crate::core::models::ScanReport;
use crate::core::scanner::Assessor;

/// Point-in-time security posture assessment of a single web host.
#[derive(Parser, Debug)]
#[command(name = "vanguard-rs-assessor", version, about = "Web vulnerability scanner")]
struct Args {
    /// Target URL to scan
    #[arg(value_name = "URL")]
    url: String,

    /// Output file (JSON format). Defaults to stdout.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Per-port connection timeout in seconds
    #[arg(long = "port-timeout", value_name = "SECS")]
    port_timeout: Option<u64>,

    /// Maximum concurrent port probes
    #[arg(long = "max-concurrency", value_name = "N")]
    max_concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    logging::initialize_logging()?;

    let config = ScanConfig::default().with_overrides(args.port_timeout, args.max_concurrency);
    let report = Assessor::with_defaults(config).assess(&args.url).await;

    write_report(&report, args.output.as_deref(), &mut std::io::stdout().lock())
}

/// Writes the pretty-printed report to `output`, or to `stdout` when no file is given.
///
/// The "Results saved" notice goes straight to stderr so log filtering cannot hide it.
fn write_report(report: &ScanReport, output: Option<&Path>, stdout: &mut impl Write) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report).wrap_err("Failed to serialize scan report")?;

    match output {
        Some(path) => {
            std::fs::write(path, json_output)
                .wrap_err_with(|| format!("Failed to write results to {}", path.display()))?;
            debug!(path = %path.display(), "Report written.");
            eprintln!("{}", saved_notice(path));
        }
        None => writeln!(stdout, "{}", json_output).wrap_err("Failed to write results to stdout")?,
    }

    Ok(())
}

fn saved_notice(path: &Path) -> String {
    format!("Results saved to {}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn rejected() -> ScanReport {
        ScanReport::Rejected {
            error: "Invalid URL provided".to_string(),
            url: "example.com".to_string(),
        }
    }

    #[test]
    fn report_goes_to_stdout_without_output_flag() {
        let mut stdout = Vec::new();
        write_report(&rejected(), None, &mut stdout).unwrap();

        let text = String::from_utf8(stdout).unwrap();
        assert!(text.ends_with('\n'));
        assert!(text.contains("\n  \"error\": \"Invalid URL provided\""));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["url"], "example.com");
    }

    #[test]
    fn report_goes_to_file_with_output_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut stdout = Vec::new();

        write_report(&rejected(), Some(path.as_path()), &mut stdout).unwrap();

        assert!(stdout.is_empty());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, serde_json::to_string_pretty(&rejected()).unwrap());
        assert_eq!(saved_notice(&path), format!("Results saved to {}", path.display()));
    }

    #[test]
    fn unwritable_output_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("report.json");
        assert!(write_report(&rejected(), Some(path.as_path()), &mut Vec::new()).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn url_is_required_and_output_is_optional() {
        assert!(Args::try_parse_from(["vanguard-rs-assessor"]).is_err());

        let args = Args::try_parse_from(["vanguard-rs-assessor", "https://example.com"]).unwrap();
        assert_eq!(args.url, "https://example.com");
        assert!(args.output.is_none());

        let args = Args::try_parse_from(["vanguard-rs-assessor", "https://example.com", "-o", "report.json"]).unwrap();
        assert_eq!(args.output, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn tuning_flags_override_defaults() {
        let args = Args::try_parse_from([
            "vanguard-rs-assessor",
            "https://example.com",
            "--port-timeout",
            "1",
            "--max-concurrency",
            "5",
        ])
        .unwrap();
        let config = ScanConfig::default().with_overrides(args.port_timeout, args.max_concurrency);
        assert_eq!(config.port_timeout, std::time::Duration::from_secs(1));
        assert_eq!(config.max_concurrency, 5);
    }
}
