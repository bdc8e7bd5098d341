use clap::Parser;
use anyhow::{bail, Result};
use std::path::PathBuf;
use log::debug;

use crate::logging::{self, LogFormat};

/// Addon Update Orchestrator
#[derive(Parser, Debug)]
#[command(name = "addonup")]
#[command(about = "Addon update orchestrator for a set-top video streaming front-end: concurrent repository checks, consent-gated updates, restart tracking")]
#[command(version)]
pub struct Args {
    /// Directory of repository manifests (defaults to the configured directory)
    pub repositories: Option<String>,

    /// Raise console logging to debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Show only errors on the console
    #[arg(short, long)]
    pub quiet: bool,

    /// Trace-level console logging
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Report pending updates without applying anything
    #[arg(long)]
    pub check_only: bool,

    /// Answer yes to the consent dialog (non-interactive runs)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    let chosen: Vec<&str> = [
        ("--verbose", args.verbose),
        ("--quiet", args.quiet),
        ("--debug", args.debug),
    ]
    .into_iter()
    .filter_map(|(name, set)| set.then_some(name))
    .collect();
    if chosen.len() > 1 {
        bail!("{} cannot be combined, pick one console level flag", chosen.join(" and "));
    }

    // the logging module owns the accepted names, validate through it
    args.log_format
        .parse::<LogFormat>()
        .map_err(anyhow::Error::msg)?;
    if let Some(level) = &args.log_file_level {
        logging::parse_log_level(level)?;
        if args.log_file.is_none() {
            bail!("--log-file-level only makes sense together with --log-file");
        }
    }

    if args.check_only && args.yes {
        bail!("--check-only already declines every update, drop --yes");
    }

    Ok(())
}

/// Console log level derived from the flag trio
pub fn console_level(args: &Args) -> log::LevelFilter {
    if args.debug {
        log::LevelFilter::Trace
    } else if args.verbose {
        log::LevelFilter::Debug
    } else if args.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            repositories: None,
            verbose: false,
            quiet: false,
            debug: false,
            log_format: "text".to_string(),
            log_file: None,
            log_file_level: None,
            config_file: None,
            check_only: false,
            yes: false,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(validate_args(&base_args()).is_ok());
    }

    #[test]
    fn test_conflicting_log_flags_rejected() {
        let mut args = base_args();
        args.verbose = true;
        args.quiet = true;
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_conflict_message_names_the_flags() {
        let mut args = base_args();
        args.quiet = true;
        args.debug = true;
        let message = validate_args(&args).unwrap_err().to_string();
        assert!(message.contains("--quiet"));
        assert!(message.contains("--debug"));
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let mut args = base_args();
        args.log_format = "xml".to_string();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_file_level_requires_file() {
        let mut args = base_args();
        args.log_file_level = Some("debug".to_string());
        assert!(validate_args(&args).is_err());

        args.log_file = Some(PathBuf::from("/tmp/addonup.log"));
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_check_only_conflicts_with_yes() {
        let mut args = base_args();
        args.check_only = true;
        args.yes = true;
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_console_level_mapping() {
        let mut args = base_args();
        assert_eq!(console_level(&args), log::LevelFilter::Info);
        args.verbose = true;
        assert_eq!(console_level(&args), log::LevelFilter::Debug);
        args.verbose = false;
        args.quiet = true;
        assert_eq!(console_level(&args), log::LevelFilter::Error);
        args.quiet = false;
        args.debug = true;
        assert_eq!(console_level(&args), log::LevelFilter::Trace);
    }
}
