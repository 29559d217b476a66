//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::SourceKind;
use clap::Parser;
use std::path::PathBuf;

/// Expert Dashboard - talent id list in, expert profile statistics out
///
/// Serves an HTTP API that accepts an uploaded talent_ids.txt, builds a
/// record per id and exposes aggregate statistics per upload session.
///
/// Examples:
///   expert-dashboard
///   expert-dashboard --port 3000 --session-ttl 3600
///   expert-dashboard --source remote --remote-url http://talent.internal/api/experts
///   expert-dashboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Bind address (default: 127.0.0.1)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Bind port (default: 8080)
    #[arg(short, long, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .expert-dashboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Expire sessions after this many seconds
    #[arg(long, value_name = "SECS")]
    pub session_ttl: Option<u64>,

    /// Record source backing the dashboard
    #[arg(long, value_name = "SOURCE")]
    pub source: Option<SourceKind>,

    /// Endpoint for the remote record source
    #[arg(long, value_name = "URL", env = "EXPERT_DASHBOARD_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Generate a default .expert-dashboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.port == Some(0) {
            return Err("Port must be between 1 and 65535".to_string());
        }

        if self.session_ttl == Some(0) {
            return Err("Session TTL must be at least 1 second".to_string());
        }

        if let Some(ref url) = self.remote_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Remote URL must start with 'http://' or 'https://'".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            host: None,
            port: None,
            config: None,
            verbose: false,
            quiet: false,
            session_ttl: None,
            source: None,
            remote_url: None,
            init_config: false,
        }
    }

    #[test]
    fn test_default_args_are_valid() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_remote_url() {
        let mut args = make_args();
        args.remote_url = Some("talent.internal".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_ttl() {
        let mut args = make_args();
        args.session_ttl = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "expert-dashboard",
            "--port",
            "3000",
            "--source",
            "remote",
            "--remote-url",
            "http://localhost:9000/experts",
        ])
        .unwrap();
        assert_eq!(args.port, Some(3000));
        assert_eq!(args.source, Some(SourceKind::Remote));
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
