//! CLI module for armgrab - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for launching,
//! configuration checking and resource discovery.

pub mod commands;

pub use commands::{Cli, Commands, LaunchArgs};
