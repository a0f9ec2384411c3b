//! Plugin Loader
//!
//! Owns the catalog of known sources, executes a source on demand and turns
//! a validated export into a [`PluginRecord`].

use crate::core::error_handling::panic_message;
use crate::operation::is_valid_operation_name;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::source::{PluginSource, ScriptSource, SCRIPT_EXTENSION};
use crate::plugin::types::{PluginExport, PluginId, PluginRecord};
use chrono::Local;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

pub struct PluginLoader {
    /// Sources known by identity; `load(id)` resolves through here
    catalog: BTreeMap<PluginId, Arc<dyn PluginSource>>,
    /// Directory searched for `<id>.rhai` when an identity is not catalogued
    search_path: Option<PathBuf>,
    generation: u64,
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("catalog", &self.catalog.keys().collect::<Vec<_>>())
            .field("search_path", &self.search_path)
            .field("generation", &self.generation)
            .finish()
    }
}

impl PluginLoader {
    pub fn new(search_path: Option<PathBuf>) -> Self {
        Self {
            catalog: BTreeMap::new(),
            search_path,
            generation: 0,
        }
    }

    pub fn set_search_path(&mut self, search_path: Option<PathBuf>) {
        self.search_path = search_path;
    }

    /// Add or replace the catalogued source for its identity
    pub fn register_source(&mut self, source: Arc<dyn PluginSource>) {
        let id = source.identity().to_string();
        if let Some(previous) = self.catalog.insert(id.clone(), source) {
            log::debug!(
                "Replaced catalogued source for '{}' (was {})",
                id,
                previous.location()
            );
        }
    }

    pub fn source(&self, id: &str) -> Option<Arc<dyn PluginSource>> {
        self.catalog.get(id).cloned()
    }

    /// Find the source for `id`, probing the search path for a script file
    pub fn resolve(&mut self, id: &str) -> PluginResult<Arc<dyn PluginSource>> {
        if let Some(source) = self.source(id) {
            return Ok(source);
        }

        if let Some(dir) = &self.search_path {
            let candidate = dir.join(format!("{}.{}", id, SCRIPT_EXTENSION));
            if candidate.is_file() {
                log::debug!("Resolved plugin '{}' to {}", id, candidate.display());
                let source: Arc<dyn PluginSource> = Arc::new(ScriptSource::new(id, candidate));
                self.register_source(Arc::clone(&source));
                return Ok(source);
            }
        }

        Err(PluginError::load_failure(id, "no plugin source found"))
    }

    pub fn catalog_ids(&self) -> Vec<PluginId> {
        self.catalog.keys().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.catalog.clear();
    }

    /// Execute `source` once and validate its export
    ///
    /// Panics raised by the source's top-level code are reported as
    /// `LoadFailure` rather than unwinding into the host.
    pub fn load(&mut self, source: &Arc<dyn PluginSource>) -> PluginResult<PluginRecord> {
        let id = source.identity();
        log::trace!("Executing plugin source '{}' ({})", id, source.location());

        let loaded = catch_unwind(AssertUnwindSafe(|| source.execute())).map_err(|payload| {
            PluginError::load_failure(
                id,
                format!("plugin code panicked: {}", panic_message(payload.as_ref())),
            )
        })??;

        let operations = validate_export(id, &loaded.export)?;
        self.generation += 1;

        Ok(PluginRecord {
            id: id.to_string(),
            location: source.location(),
            kind: source.kind(),
            metadata: loaded.export.metadata.clone(),
            operations,
            fingerprint: loaded.fingerprint,
            loaded_at: Local::now(),
            enabled: true,
            module: Arc::new(loaded.export),
            generation: self.generation,
        })
    }
}

/// Check the export contract and return its operation-name set
fn validate_export(id: &str, export: &PluginExport) -> PluginResult<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for name in export.operation_names() {
        if name.is_empty() {
            return Err(PluginError::contract(id, "operation with an empty name"));
        }
        if !is_valid_operation_name(name) {
            return Err(PluginError::contract(
                id,
                format!("invalid operation name '{}'", name),
            ));
        }
        if !names.insert(name.to_string()) {
            return Err(PluginError::contract(
                id,
                format!("duplicate operation name '{}'", name),
            ));
        }
    }
    Ok(names)
}
