//! Public API for the plugin system
//!
//! External modules should import from here rather than directly from
//! internal modules.

use std::sync::LazyLock;

// Lifecycle management
pub use crate::plugin::manager::{PluginManager, SharedPluginManager};

// Error handling
pub use crate::plugin::error::{PluginError, PluginResult};

// Records, exports and reports
pub use crate::plugin::types::{
    DiscoveryReport, ExportedOperation, Fingerprint, LoadedSource, OperationSpec, PluginExport,
    PluginId, PluginInfo, PluginMetadata, PluginState, ReloadOutcome, SourceKind,
};

// Sources and discovery
pub use crate::plugin::discovery::{DiscoveryConfig, DEFAULT_PLUGIN_PATTERN};
pub use crate::plugin::source::{BuiltinSource, FnSource, PluginSource, ScriptSource};

// Builtin registration
pub use crate::plugin::builtin::api::{get_all_builtin_plugins, BuiltinPluginEntry};

/// Process-wide plugin runtime
static PLUGIN_RUNTIME: LazyLock<SharedPluginManager> = LazyLock::new(|| {
    log::trace!("Initializing plugin runtime");
    SharedPluginManager::default()
});

/// Access the process-wide plugin runtime
///
/// Every call returns a handle to the same shared manager. Hosts that need
/// isolated runtimes (tests, embedding) should build their own
/// [`SharedPluginManager`] instead.
///
/// # Examples
/// ```no_run
/// # use plugcalc::plugin::api::{plugin_runtime, DiscoveryConfig};
/// # use plugcalc::operation::Value;
/// let runtime = plugin_runtime();
/// runtime.write().set_config(DiscoveryConfig::with_path("plugins"));
/// let report = runtime.discover()?;
/// println!("{}", report);
/// let sum = runtime.dispatch("+", &[Value::Number(2.0), Value::Number(3.0)])?;
/// # Ok::<(), plugcalc::plugin::api::PluginError>(())
/// ```
pub fn plugin_runtime() -> SharedPluginManager {
    PLUGIN_RUNTIME.clone()
}
