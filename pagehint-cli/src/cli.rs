//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pagehint_core::types::Severity;

/// pagehint -- audit web pages against a set of hints.
///
/// Use `pagehint <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "pagehint", version, about, long_about = None)]
pub struct Cli {
    /// Path to the pagehint.toml configuration file.
    ///
    /// When omitted, `pagehint.toml` in the current directory is used if present,
    /// otherwise built-in defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a local file, directory or file:// URL.
    Scan(ScanArgs),

    /// Inspect the built-in hints.
    Hints(HintsArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Run every enabled hint against one target.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Target to scan (file path, directory, or file:// URL).
    pub target: String,

    /// Exit with code 4 when problems at or above this severity are found.
    #[arg(long, default_value = "error")]
    pub fail_on: FailOn,

    /// Run only the given hint (repeatable).
    #[arg(long = "hint", value_name = "ID")]
    pub hints: Vec<String>,

    /// Abort the scan after this many seconds.
    #[arg(long, value_name = "N")]
    pub timeout_secs: Option<u64>,
}

/// Severity threshold that makes `scan` fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    /// Fail on errors only.
    Error,
    /// Fail on warnings and errors.
    Warning,
    /// Never fail because of problems.
    Off,
}

impl FailOn {
    pub fn severity(self) -> Severity {
        match self {
            Self::Error => Severity::Error,
            Self::Warning => Severity::Warning,
            Self::Off => Severity::Off,
        }
    }
}

// ---- hints ----

/// Inspect the built-in hints.
#[derive(Args, Debug)]
pub struct HintsArgs {
    #[command(subcommand)]
    pub action: HintsAction,
}

#[derive(Subcommand, Debug)]
pub enum HintsAction {
    /// List built-in hints with their effective severity.
    List {
        /// Filter by category (accessibility, compatibility, interoperability, security, ...).
        #[arg(long)]
        category: Option<String>,
    },
}

// ---- config ----

/// Manage pagehint configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file, including hint ids and options.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, scan, hints).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_scan_defaults() {
        let cli = Cli::try_parse_from(["pagehint", "scan", "site/index.html"])
            .expect("should parse 'scan' subcommand");
        match cli.command {
            Commands::Scan(scan_args) => {
                assert_eq!(scan_args.target, "site/index.html");
                assert_eq!(scan_args.fail_on, FailOn::Error);
                assert!(scan_args.hints.is_empty(), "no hint filter by default");
                assert!(scan_args.timeout_secs.is_none());
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parse_scan_requires_target() {
        let args = Cli::try_parse_from(["pagehint", "scan"]);
        assert!(args.is_err(), "scan without a target should fail");
    }

    #[test]
    fn test_cli_parse_scan_repeated_hints() {
        let cli = Cli::try_parse_from([
            "pagehint",
            "scan",
            ".",
            "--hint",
            "image-alt",
            "--hint",
            "no-broken-links",
            "--fail-on",
            "warning",
            "--timeout-secs",
            "30",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Scan(scan_args) => {
                assert_eq!(scan_args.hints, vec!["image-alt", "no-broken-links"]);
                assert_eq!(scan_args.fail_on, FailOn::Warning);
                assert_eq!(scan_args.timeout_secs, Some(30));
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parse_scan_invalid_fail_on() {
        let args = Cli::try_parse_from(["pagehint", "scan", ".", "--fail-on", "critical"]);
        assert!(args.is_err(), "unknown fail-on value should be rejected");
    }

    #[test]
    fn test_fail_on_maps_to_severity() {
        assert_eq!(FailOn::Error.severity(), Severity::Error);
        assert_eq!(FailOn::Warning.severity(), Severity::Warning);
        assert_eq!(FailOn::Off.severity(), Severity::Off);
    }

    #[test]
    fn test_cli_parse_hints_list_with_category() {
        let cli = Cli::try_parse_from(["pagehint", "hints", "list", "--category", "security"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Hints(hints_args) => match hints_args.action {
                HintsAction::List { category } => {
                    assert_eq!(category, Some("security".to_owned()));
                }
            },
            _ => panic!("expected Hints command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["pagehint", "config", "show", "--section", "scan"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Show { section } => {
                    assert_eq!(section, Some("scan".to_owned()));
                }
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pagehint",
            "config",
            "validate",
            "-c",
            "/custom/pagehint.toml",
            "--output",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("parse succeeded");
        assert_eq!(
            cli.config,
            Some(std::path::PathBuf::from("/custom/pagehint.toml"))
        );
        assert!(matches!(cli.output, OutputFormat::Json));
        assert_eq!(cli.log_level, Some("debug".to_owned()));
    }

    #[test]
    fn test_cli_parse_missing_command_fails() {
        let args = Cli::try_parse_from(["pagehint"]);
        assert!(args.is_err(), "should fail when no command provided");
    }

    #[test]
    fn test_cli_verify_command_structure() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "pagehint");

        let subcommands: Vec<_> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        assert_eq!(subcommands, vec!["scan", "hints", "config"]);
    }
}
