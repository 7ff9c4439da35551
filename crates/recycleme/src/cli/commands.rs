//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Web server arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Interface to listen on (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, 0 for any free port (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Where the item would be recycled
    pub location: String,

    /// What the item is made of
    pub material: String,

    /// The item itself
    pub item: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Catalog files with one `location: material: item, item` entry per line
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Misses command arguments.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct MissesCommand {
    /// Maximum number of rows to show from each log
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Optional action on the miss logs
    #[command(subcommand)]
    pub action: Option<MissesAction>,
}

/// Actions on the miss logs.
#[derive(Debug, Subcommand)]
pub enum MissesAction {
    /// Delete every logged miss
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_serve_command_debug() {
        let cmd = ServeCommand {
            host: Some("127.0.0.1".to_string()),
            port: None,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("127.0.0.1"));
    }

    #[test]
    fn test_misses_command_defaults_to_listing() {
        let cmd = MissesCommand {
            limit: 20,
            json: false,
            action: None,
        };
        assert!(cmd.action.is_none());
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }

    #[test]
    fn test_output_format_debug() {
        assert_eq!(format!("{:?}", OutputFormat::Json), "Json");
    }
}
