/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Rel-Info Core. Scans release checkouts and
    package directories, then emits the JSON manifest consumed
    by the download site.

  Security / Safety Notes:
    Operates within user privileges. Reads descriptor files as
    data and writes only the configured manifest and log.

  Dependencies:
    clap for CLI parsing, chrono for session stamps.

  Operational Scope:
    Invoked by the download site's scheduler after packaging
    runs, or by operators regenerating the manifest by hand.

  Revision History:
    2025-11-12 COD  Authored Rel-Info Core runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use relinfo_core::config::RelinfoConfig;
use relinfo_core::error::Result;
use relinfo_core::logger::Logger;
use relinfo_core::manifest::{build_manifest, check_preconditions, write_manifest, ManifestDocument};

/// Command-line arguments for Rel-Info-Core.
#[derive(Debug, Parser)]
#[command(
    name = "Rel-Info-Core",
    version,
    author = "Synavera Systems",
    about = "Release manifest builder for the download site"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override manifest output path.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Limit the scan to specific template families.
    #[arg(long = "family", value_name = "NAME", action = ArgAction::Append)]
    families: Vec<String>,
    /// Do not write the manifest; emit summary only.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Indent the JSON output.
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Rel-Info-Core] {}", err);
            err.exit_code()
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = RelinfoConfig::load_from_optional_path(cli.config.as_deref())?;
    let output = cli.output.clone().unwrap_or_else(|| config.manifest_path());

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| config.log_dir().join(format!("relinfo_{session_stamp}.log")));
    let logger = Logger::open_or_stderr(log_path, cli.verbose);
    logger.info("INIT", "Rel-Info Core starting.");

    if !cli.dry_run {
        if let Err(err) = check_preconditions(&config, &output) {
            logger.error("PRECONDITION", err.to_string());
            logger.seal();
            return Err(err);
        }
    }

    let document = build_manifest(&config, &cli.families, &logger)?;

    if cli.dry_run {
        print_summary(&document);
    } else {
        write_manifest(&document, &output, cli.pretty)?;
        logger.info(
            "MANIFEST",
            format!("Manifest written to {}", output.display()),
        );
    }

    logger.info(
        "SUMMARY",
        format!(
            "releases={} macospackages={}",
            document.releases.len(),
            document.macospackages.len()
        ),
    );
    logger.info("COMPLETE", "Manifest run complete.");
    logger.seal();

    Ok(ExitCode::SUCCESS)
}

fn print_summary(document: &ManifestDocument) {
    println!(
        "→ Manifest dry-run. Releases={} macOS packages={}",
        document.releases.len(),
        document.macospackages.len()
    );
    for release in &document.releases {
        println!(
            "  {} ({}) → {}",
            release.version.release, release.version.branch, release.download
        );
    }
}
