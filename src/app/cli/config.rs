//! TOML configuration file loading and settings resolution
//!
//! Settings are resolved with the precedence command line > configuration
//! file > defaults.

use super::args::{split_comma_separated, Args};
use crate::core::logging::LogFormat;
use crate::plugin::api::{DiscoveryConfig, DEFAULT_PLUGIN_PATTERN};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// A single string or a list of strings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StringList {
    One(String),
    Many(Vec<String>),
}

impl StringList {
    fn values(&self) -> Vec<String> {
        match self {
            StringList::One(value) => split_comma_separated(&[value]),
            StringList::Many(values) => split_comma_separated(values),
        }
    }
}

/// Contents of `plugcalc.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub plugin_dir: Option<PathBuf>,
    pub exclude_plugins: Option<StringList>,
    pub plugin_pattern: Option<String>,
    pub include_builtins: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<String>,
    pub color: Option<bool>,
}

impl FileConfig {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `<config_dir>/Plugcalc/plugcalc.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("Plugcalc").join("plugcalc.toml"))
}

/// Load the configuration file
///
/// An explicitly requested file must exist; a missing default file simply
/// yields no configuration.
pub fn load_config_file(explicit: Option<&Path>) -> Result<Option<FileConfig>, ConfigError> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            })
        }
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    log::debug!("Loading configuration from {}", path.display());
    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    FileConfig::parse(&path, &text).map(Some)
}

/// Fully resolved host settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub discovery: DiscoveryConfig,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    /// None means decide from the terminal
    pub color: Option<bool>,
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl Settings {
    pub fn resolve(args: &Args, file: Option<&FileConfig>) -> Result<Self, ConfigError> {
        let file = file.cloned().unwrap_or_default();

        let mut discovery = DiscoveryConfig::default();
        if let Some(dir) = args.plugin_dir.clone().or(file.plugin_dir) {
            discovery.search_path = Some(dir);
        }
        discovery.pattern = file
            .plugin_pattern
            .unwrap_or_else(|| DEFAULT_PLUGIN_PATTERN.to_string());
        if glob::Pattern::new(&discovery.pattern).is_err() {
            return Err(ConfigError::Invalid {
                key: "plugin_pattern",
                reason: format!("'{}' is not a valid glob", discovery.pattern),
            });
        }
        // exclusions accumulate from both sources
        let mut excluded = file.exclude_plugins.map(|list| list.values()).unwrap_or_default();
        for name in args.excluded_plugins() {
            if !excluded.contains(&name) {
                excluded.push(name);
            }
        }
        discovery.excluded_plugins = excluded;
        discovery.include_builtins = !args.no_builtins && file.include_builtins.unwrap_or(true);

        let base_level = match args.log_level.clone().or(file.log_level) {
            Some(level) if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) => {
                level.to_ascii_lowercase()
            }
            Some(level) => {
                return Err(ConfigError::Invalid {
                    key: "log_level",
                    reason: format!("unknown level '{}'", level),
                })
            }
            None => "warn".to_string(),
        };
        let log_level = adjust_level(&base_level, args.verbosity());

        let log_format = match args.log_format.clone().or(file.log_format) {
            Some(format) => LogFormat::from_str(&format).map_err(|_| ConfigError::Invalid {
                key: "log_format",
                reason: format!("expected text, ext or json, got '{}'", format),
            })?,
            None => LogFormat::default(),
        };

        let log_file = match args.log_file.clone() {
            Some(path) => disabled_path(path),
            None => file.log_file.map(PathBuf::from).and_then(disabled_path),
        };

        Ok(Self {
            discovery,
            log_level,
            log_format,
            log_file,
            color: args.color_override().or(file.color),
        })
    }
}

/// "none" and "-" disable file logging
fn disabled_path(path: PathBuf) -> Option<PathBuf> {
    match path.to_str() {
        Some(text) if text.eq_ignore_ascii_case("none") || text == "-" => None,
        _ => Some(path),
    }
}

/// Shift a level by `-v`/`-q` steps, clamped to `off..=trace`
fn adjust_level(level: &str, verbosity: i8) -> String {
    let index = LOG_LEVELS
        .iter()
        .position(|candidate| *candidate == level)
        .unwrap_or(2) as i8;
    let shifted = (index + verbosity).clamp(0, LOG_LEVELS.len() as i8 - 1);
    LOG_LEVELS[shifted as usize].to_string()
}
