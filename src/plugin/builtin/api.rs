//! API for builtin plugin registration and discovery
//!
//! Builtin plugins use the `builtin!` macro to register a factory that
//! produces a fresh export on every load.

use crate::plugin::source::BuiltinSource;
use crate::plugin::types::PluginExport;
use inventory;

/// Entry for a builtin plugin in the dynamic registry
pub struct BuiltinPluginEntry {
    pub id: &'static str,
    pub factory: fn() -> PluginExport,
}

// Collect all builtin plugin entries
inventory::collect!(BuiltinPluginEntry);

/// Macro for registering builtin plugins
///
/// ```ignore
/// builtin!("core", core_export);
/// ```
#[macro_export]
macro_rules! builtin {
    ($id:expr, $factory_expr:expr) => {
        inventory::submit!($crate::plugin::builtin::api::BuiltinPluginEntry {
            id: $id,
            factory: $factory_expr
        });
    };
}

/// Get sources for all registered builtin plugins, sorted by identity
pub fn get_all_builtin_plugins() -> Vec<BuiltinSource> {
    let mut entries: Vec<&BuiltinPluginEntry> = inventory::iter::<BuiltinPluginEntry>().collect();
    entries.sort_by_key(|entry| entry.id);
    entries
        .into_iter()
        .map(|entry| BuiltinSource::new(entry.id, entry.factory))
        .collect()
}
