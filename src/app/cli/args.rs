//! Command line arguments
//!
//! Global options shared by every subcommand, plus the subcommands
//! themselves. Values left unset here fall back to the configuration file and
//! then to built-in defaults (see [`crate::app::cli::config`]).

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "plugcalc")]
#[command(about = "Calculator with hot-reloadable operation plugins")]
#[command(version, long_version = crate::core::version::long_version())]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Plugin directory override
    #[arg(short = 'p', long = "plugin-dir", value_name = "DIR", global = true)]
    pub plugin_dir: Option<PathBuf>,

    /// Plugins to exclude from discovery*
    #[arg(long = "exclude-plugin", value_name = "NAMES", action = ArgAction::Append, global = true)]
    pub plugin_exclusions: Vec<String>,

    /// Do not register the compiled-in plugins
    #[arg(long = "no-builtins", global = true)]
    pub no_builtins: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", global = true,
          value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", global = true,
          value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(long = "color", conflicts_with = "no_color", global = true)]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// More log output (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive calculator loop (default)
    Repl,

    /// Dispatch one operation and print its result
    Call {
        /// Operation name
        operation: String,

        /// Arguments: numbers or lists such as [1,2,3]
        #[arg(allow_hyphen_values = true)]
        arguments: Vec<String>,
    },

    /// List the loaded plugins and their operations
    Plugins,
}

impl Args {
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Repl)
    }

    /// `--color` -> Some(true), `--no-color` -> Some(false), neither -> None
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Exclusions from every `--exclude-plugin`, split on commas
    pub fn excluded_plugins(&self) -> Vec<String> {
        split_comma_separated(&self.plugin_exclusions)
    }

    /// Net verbosity: positive is more verbose
    pub fn verbosity(&self) -> i8 {
        self.verbose.min(4) as i8 - self.quiet.min(4) as i8
    }
}

/// Split comma-separated values, trimming and dropping empties and duplicates
pub fn split_comma_separated<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for item in values
        .iter()
        .flat_map(|value| value.as_ref().split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
    {
        if !result.iter().any(|existing| existing == item) {
            result.push(item.to_string());
        }
    }
    result
}
