use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "cursor-rules")]
#[command(author, version, about = "Rule loader and resolver for AI assistant rule files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Project root; working file paths are resolved relative to it
    #[arg(long, global = true, env = "CURSOR_RULES_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Rules directory, overriding the configured one (relative to the root)
    #[arg(long, global = true)]
    pub rules_dir: Option<PathBuf>,
}

/// Output format for CLI results.
/// - Text: Human-readable text output (default)
/// - Json: Single JSON object per command
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the rules that apply to a set of working files
    Resolve {
        /// Files currently open or being edited
        files: Vec<PathBuf>,

        /// List rule names instead of printing rule bodies
        #[arg(long)]
        names: bool,
    },

    /// List all loaded rules by kind
    List,

    /// Show a single rule by name
    Show {
        /// Rule name (e.g. frontend/react), file path, or unique file stem
        name: String,
    },

    /// Validate rule files and report problems
    Check,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,
}
