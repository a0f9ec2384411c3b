//! Plugin Discovery
//!
//! Enumerates candidate sources: compiled-in builtins first, then script
//! files in the configured directory in sorted path order.

use crate::plugin::builtin::api::get_all_builtin_plugins;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::source::{identity_from_path, PluginSource, ScriptSource};
use std::path::PathBuf;
use std::sync::Arc;

/// Default glob for script plugins
pub const DEFAULT_PLUGIN_PATTERN: &str = "*.rhai";

/// Configuration for plugin discovery
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Plugin directory to search
    pub search_path: Option<PathBuf>,
    /// File name glob matched inside `search_path`
    pub pattern: String,
    /// Plugins to exclude from discovery
    pub excluded_plugins: Vec<String>,
    /// Whether to include built-in plugins
    pub include_builtins: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_path: get_default_plugin_path(),
            pattern: DEFAULT_PLUGIN_PATTERN.to_string(),
            excluded_plugins: Vec::new(),
            include_builtins: true,
        }
    }
}

impl DiscoveryConfig {
    /// Discovery limited to `dir`, with builtins included
    pub fn with_path(dir: impl Into<PathBuf>) -> Self {
        Self {
            search_path: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn excluding<I, S>(mut self, plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_plugins
            .extend(plugins.into_iter().map(Into::into));
        self
    }

    pub fn without_builtins(mut self) -> Self {
        self.include_builtins = false;
        self
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded_plugins.iter().any(|excluded| excluded == id)
    }
}

/// Platform default plugin directory, falling back to `./plugins`
pub fn get_default_plugin_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("Plugcalc").join("plugins"))
        .filter(|dir| dir.is_dir())
        .or_else(|| Some(PathBuf::from("plugins")))
}

/// Collect every candidate source the configuration describes
///
/// A missing search directory is not an error; an invalid pattern is.
pub fn collect_candidates(config: &DiscoveryConfig) -> PluginResult<Vec<Arc<dyn PluginSource>>> {
    let mut candidates: Vec<Arc<dyn PluginSource>> = Vec::new();

    if config.include_builtins {
        let builtins = get_all_builtin_plugins();
        log::debug!("Found {} builtin plugins", builtins.len());
        candidates.extend(
            builtins
                .into_iter()
                .map(|source| Arc::new(source) as Arc<dyn PluginSource>),
        );
    }

    if let Some(dir) = &config.search_path {
        if dir.is_dir() {
            let scripts = scan_directory(dir, &config.pattern)?;
            log::debug!("Found {} script plugins in {}", scripts.len(), dir.display());
            candidates.extend(scripts);
        } else {
            log::debug!("Plugin directory {} does not exist", dir.display());
        }
    }

    let before_exclusions = candidates.len();
    candidates.retain(|source| !config.is_excluded(source.identity()));
    log::debug!(
        "After exclusions {:?}: {} candidates (was {})",
        config.excluded_plugins,
        candidates.len(),
        before_exclusions
    );

    Ok(candidates)
}

fn scan_directory(
    dir: &std::path::Path,
    pattern: &str,
) -> PluginResult<Vec<Arc<dyn PluginSource>>> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = std::path::Path::new(&escaped_dir).join(pattern);
    let discovery_error = |cause: String| PluginError::Discovery {
        path: dir.display().to_string(),
        cause,
    };

    let entries = glob::glob(&full_pattern.to_string_lossy())
        .map_err(|e| discovery_error(format!("invalid pattern '{}': {}", pattern, e)))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping unreadable plugin path: {}", e),
        }
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .filter_map(|path| {
            let id = identity_from_path(&path)?;
            // private/helper files
            if id.starts_with('_') {
                log::trace!("Skipping {}", path.display());
                return None;
            }
            Some(Arc::new(ScriptSource::new(id, path)) as Arc<dyn PluginSource>)
        })
        .collect())
}
