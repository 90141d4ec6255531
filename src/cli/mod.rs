//! CLI module for casebridge - command-line interface and subcommands.
//!
//! With no subcommand the bridge polls forever; `once` runs a single cycle
//! and `check` validates the configuration.

pub mod commands;

pub use commands::Cli;
