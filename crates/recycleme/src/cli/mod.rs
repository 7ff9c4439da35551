//! Command-line interface for recycleme.
//!
//! This module provides the CLI structure for the `recycleme` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    CheckCommand, ConfigCommand, ImportCommand, MissesAction, MissesCommand, OutputFormat,
    ServeCommand, StatusCommand,
};

/// recycleme - Find out whether something can be recycled where you live
///
/// Serves a small web form that looks up an item by location and material,
/// and keeps a log of the lookups it could not answer.
#[derive(Debug, Parser)]
#[command(name = "recycleme")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeCommand),

    /// Look up a single item
    Check(CheckCommand),

    /// Load catalog files into the database
    Import(ImportCommand),

    /// List or clear logged lookup misses
    Misses(MissesCommand),

    /// Show database status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
