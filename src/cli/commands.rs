//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: poll forever (default)
//! - once: run a single polling cycle
//! - check: validate configuration without touching the network

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// casebridge - turns tagged Kibana security cases into Gitea issues
#[derive(Parser, Debug)]
#[command(name = "casebridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Poll for tagged cases until interrupted
    Run,

    /// Run a single polling cycle and exit
    Once,

    /// Load and validate the configuration, then exit
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["casebridge"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["casebridge", "-v"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["casebridge", "-c", "/etc/casebridge.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/etc/casebridge.yml")));
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::try_parse_from(["casebridge", "run"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Run));
    }

    #[test]
    fn test_once_command_with_global_flags() {
        let cli = Cli::try_parse_from(["casebridge", "once", "--config", "x.yml", "--verbose"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Once));
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.yml")));
    }

    #[test]
    fn test_check_command() {
        let cli = Cli::try_parse_from(["casebridge", "check"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Check));
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(Cli::try_parse_from(["casebridge", "sync"]).is_err());
    }

    #[test]
    fn test_help_works() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["casebridge", "--version"]);
        // Version flag causes early exit with error (expected)
        assert!(result.is_err());
    }
}
