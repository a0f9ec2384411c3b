//! Plugin Manager
//!
//! Lifecycle manager for plugins: owns the loader, the live records, the
//! operation registry and the observer hub, and drives every
//! `load -> register -> unload -> reload` transition.

use crate::notifications::api::{
    EventFilter, EventKind, NotificationError, Observer, ObserverHub, PluginEvent,
    SubscriptionHandle,
};
use crate::operation::Value;
use crate::plugin::discovery::{collect_candidates, DiscoveryConfig};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::loader::PluginLoader;
use crate::plugin::registry::OperationRegistry;
use crate::plugin::source::{PluginSource, ScriptSource};
use crate::plugin::types::{
    DiscoveryReport, PluginId, PluginInfo, PluginRecord, PluginState, ReloadOutcome,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub struct PluginManager {
    loader: PluginLoader,
    registry: OperationRegistry,
    records: BTreeMap<PluginId, PluginRecord>,
    states: HashMap<PluginId, PluginState>,
    observers: ObserverHub,
    config: DiscoveryConfig,
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginManager {
    pub fn new() -> Self {
        Self::with_config(DiscoveryConfig::default())
    }

    pub fn with_config(config: DiscoveryConfig) -> Self {
        Self {
            loader: PluginLoader::new(config.search_path.clone()),
            registry: OperationRegistry::new(),
            records: BTreeMap::new(),
            states: HashMap::new(),
            observers: ObserverHub::new(),
            config,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DiscoveryConfig) {
        self.loader.set_search_path(config.search_path.clone());
        self.config = config;
    }

    // ----- observers -------------------------------------------------------

    pub fn subscribe(
        &mut self,
        filter: impl Into<EventFilter>,
        observer: Arc<dyn Observer>,
    ) -> SubscriptionHandle {
        self.observers.subscribe(filter, observer)
    }

    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> PluginResult<()> {
        Ok(self.observers.unsubscribe(handle)?)
    }

    /// Drain observer failures collected since the last call
    pub fn take_observer_failures(&mut self) -> Vec<NotificationError> {
        self.observers.take_failures()
    }

    /// Notify observers; failures are logged and summarized in one `error` event
    fn emit(&mut self, event: PluginEvent) {
        let failures = self.observers.notify(&event);
        if failures.is_empty() {
            return;
        }
        for failure in &failures {
            log::warn!("{}", failure);
        }
        if event.kind == EventKind::Error {
            // never report failures of the error event through another error event
            return;
        }
        let message = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        let summary = PluginEvent::with_message(EventKind::Error, event.plugin.clone(), message);
        for failure in self.observers.notify(&summary) {
            log::warn!("{}", failure);
        }
    }

    fn emit_error(&mut self, plugin: &str, error: &PluginError) {
        self.emit(PluginEvent::with_message(
            EventKind::Error,
            plugin,
            error.to_string(),
        ));
    }

    // ----- state -----------------------------------------------------------

    fn transition(&mut self, id: &str, next: PluginState) {
        let current = self.state(id);
        if !current.can_transition_to(next) {
            log::error!(
                "Invalid state transition for '{}': {} -> {}",
                id,
                current,
                next
            );
        }
        log::trace!("Plugin '{}': {} -> {}", id, current, next);
        if next == PluginState::Unloaded {
            self.states.remove(id);
        } else {
            self.states.insert(id.to_string(), next);
        }
    }

    pub fn state(&self, id: &str) -> PluginState {
        self.states
            .get(id)
            .copied()
            .unwrap_or(PluginState::Unloaded)
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    // ----- lifecycle -------------------------------------------------------

    /// Add a source to the catalog without loading it
    pub fn register_source(&mut self, source: Arc<dyn PluginSource>) {
        self.loader.register_source(source);
    }

    /// Register `source` in the catalog and load it
    pub fn load_source(&mut self, source: Arc<dyn PluginSource>) -> PluginResult<Vec<String>> {
        let id = source.identity().to_string();
        if self.records.contains_key(&id) {
            return Err(PluginError::AlreadyLoaded { plugin: id });
        }
        self.loader.register_source(source);
        self.load(&id)
    }

    /// Load a script plugin from an explicit path; identity is the file stem
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> PluginResult<Vec<String>> {
        let source = ScriptSource::from_path(path.as_ref())?;
        self.load_source(Arc::new(source))
    }

    /// Load the plugin known as `id`, returning the operations it registered
    pub fn load(&mut self, id: &str) -> PluginResult<Vec<String>> {
        if self.records.contains_key(id) {
            return Err(PluginError::AlreadyLoaded {
                plugin: id.to_string(),
            });
        }

        let source = match self.loader.resolve(id) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("{}", e);
                self.emit_error(id, &e);
                return Err(e);
            }
        };

        self.transition(id, PluginState::Loading);
        match self.install(&source) {
            Ok(operations) => {
                self.transition(id, PluginState::Registered);
                log::info!(
                    "Loaded plugin '{}' from {} ({} operations)",
                    id,
                    source.location(),
                    operations.len()
                );
                self.emit(PluginEvent::new(EventKind::Loaded, id).operations(operations.clone()));
                Ok(operations)
            }
            Err(e) => {
                self.transition(id, PluginState::Unloaded);
                log::warn!("{}", e);
                self.emit_error(id, &e);
                Err(e)
            }
        }
    }

    /// Execute `source`, check collisions and register its operations
    ///
    /// Nothing is registered unless every step succeeds.
    fn install(&mut self, source: &Arc<dyn PluginSource>) -> PluginResult<Vec<String>> {
        let record = self.loader.load(source)?;
        self.registry.register(
            &record.id,
            record
                .module
                .operations
                .iter()
                .map(|op| (op.spec.name.clone(), op.operation.clone())),
        )?;

        let operations: Vec<String> = record.operations.iter().cloned().collect();
        self.records.insert(record.id.clone(), record);
        Ok(operations)
    }

    /// Unload a live plugin without re-invoking any of its code
    pub fn unload(&mut self, id: &str) -> PluginResult<Vec<String>> {
        if !self.records.contains_key(id) {
            return Err(PluginError::NotLoaded {
                plugin: id.to_string(),
            });
        }

        self.transition(id, PluginState::Unloading);
        let operations = self.remove_record(id);
        self.transition(id, PluginState::Unloaded);

        log::info!("Unloaded plugin '{}' ({} operations)", id, operations.len());
        self.emit(PluginEvent::new(EventKind::Unloaded, id).operations(operations.clone()));
        Ok(operations)
    }

    fn remove_record(&mut self, id: &str) -> Vec<String> {
        match self.records.remove(id) {
            Some(record) => {
                self.registry.unregister(id, &record.operations);
                record.operations.into_iter().collect()
            }
            None => Vec::new(),
        }
    }

    /// Reload a live plugin if its source content changed
    ///
    /// An unchanged fingerprint is a no-op that still emits `reloaded`. A
    /// failed load leaves the plugin unloaded; there is no rollback.
    pub fn reload(&mut self, id: &str) -> PluginResult<ReloadOutcome> {
        let (previous_fingerprint, previous_operations, was_enabled) = match self.records.get(id) {
            Some(record) => (
                record.fingerprint.clone(),
                record.operations.clone(),
                record.enabled,
            ),
            None => {
                return Err(PluginError::NotLoaded {
                    plugin: id.to_string(),
                })
            }
        };
        let source = self.loader.resolve(id)?;

        match source.fingerprint() {
            Ok(current) if current.same_content(&previous_fingerprint) => {
                if current.modified != previous_fingerprint.modified {
                    if let Some(record) = self.records.get_mut(id) {
                        log::trace!("Refreshing fingerprint timestamp of '{}'", id);
                        record.fingerprint = current;
                    }
                }
                log::info!("Plugin '{}' unchanged; reload skipped", id);
                self.emit(
                    PluginEvent::new(EventKind::Reloaded, id)
                        .operations(previous_operations)
                        .changed(false),
                );
                return Ok(ReloadOutcome::Unchanged);
            }
            Ok(_) => {}
            Err(e) => log::debug!("Fingerprint of '{}' unavailable, reloading: {}", id, e),
        }

        self.transition(id, PluginState::Unloading);
        self.remove_record(id);
        self.transition(id, PluginState::Loading);

        match self.install(&source) {
            Ok(operations) => {
                self.transition(id, PluginState::Registered);
                let added: Vec<String> = operations
                    .iter()
                    .filter(|name| !previous_operations.contains(*name))
                    .cloned()
                    .collect();
                let removed: Vec<String> = previous_operations
                    .iter()
                    .filter(|name| !operations.contains(name))
                    .cloned()
                    .collect();
                if !was_enabled {
                    log::debug!("Plugin '{}' re-enabled by content change", id);
                }
                log::info!(
                    "Reloaded plugin '{}' (+{} -{} operations)",
                    id,
                    added.len(),
                    removed.len()
                );
                self.emit(
                    PluginEvent::new(EventKind::Reloaded, id)
                        .operations(operations)
                        .changed(true),
                );
                Ok(ReloadOutcome::Reloaded { added, removed })
            }
            Err(e) => {
                self.transition(id, PluginState::Unloaded);
                log::error!("Reload of '{}' failed, plugin is now unloaded: {}", id, e);
                self.emit_error(id, &e);
                Err(e)
            }
        }
    }

    /// Load every candidate the discovery configuration describes
    ///
    /// Per-source failures are collected; only a broken configuration
    /// (such as an invalid pattern) fails the whole call.
    pub fn discover(&mut self) -> PluginResult<DiscoveryReport> {
        let candidates = collect_candidates(&self.config)?;
        let mut report = DiscoveryReport::default();

        for source in candidates {
            let id = source.identity().to_string();
            if let Some(record) = self.records.get(&id) {
                if record.location == source.location() {
                    report.skipped.push(id);
                } else {
                    report.attempted += 1;
                    report.failures.push((
                        id.clone(),
                        PluginError::AlreadyLoaded { plugin: id },
                    ));
                }
                continue;
            }

            report.attempted += 1;
            self.loader.register_source(source);
            match self.load(&id) {
                Ok(_) => report.loaded.push(id),
                Err(e) => report.failures.push((id, e)),
            }
        }

        if report.is_clean() {
            log::info!("Plugin discovery: {}", report);
        } else {
            log::warn!("Plugin discovery: {}", report);
        }
        Ok(report)
    }

    pub fn enable(&mut self, id: &str) -> PluginResult<()> {
        self.set_enabled(id, true)
    }

    pub fn disable(&mut self, id: &str) -> PluginResult<()> {
        self.set_enabled(id, false)
    }

    fn set_enabled(&mut self, id: &str, enabled: bool) -> PluginResult<()> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| PluginError::NotLoaded {
                plugin: id.to_string(),
            })?;
        record.enabled = enabled;
        let operations: Vec<String> = record.operations.iter().cloned().collect();
        self.registry.set_enabled(id, enabled);

        let kind = if enabled {
            EventKind::Enabled
        } else {
            EventKind::Disabled
        };
        log::info!("Plugin '{}' {}", id, kind);
        self.emit(PluginEvent::new(kind, id).operations(operations));
        Ok(())
    }

    /// Unload every live plugin, forget all sources and drop all observers
    pub fn shutdown(&mut self) {
        let ids: Vec<PluginId> = self.records.keys().cloned().collect();
        for id in ids {
            if let Err(e) = self.unload(&id) {
                log::warn!("Failed to unload '{}' during shutdown: {}", id, e);
            }
        }
        self.registry.clear();
        self.loader.clear();
        self.observers.clear();
        log::debug!("Plugin runtime shut down");
    }

    // ----- dispatch & introspection ---------------------------------------

    pub fn dispatch(&self, name: &str, args: &[Value]) -> PluginResult<Value> {
        self.registry.dispatch(name, args)
    }

    pub fn list_plugins(&self) -> Vec<PluginId> {
        self.records.keys().cloned().collect()
    }

    pub fn plugin_info(&self, id: &str) -> PluginResult<PluginInfo> {
        self.records
            .get(id)
            .map(PluginRecord::info)
            .ok_or_else(|| PluginError::NotLoaded {
                plugin: id.to_string(),
            })
    }

    pub fn plugin_operations(&self, id: &str) -> PluginResult<Vec<String>> {
        self.records
            .get(id)
            .map(|record| record.operations.iter().cloned().collect())
            .ok_or_else(|| PluginError::NotLoaded {
                plugin: id.to_string(),
            })
    }

    /// Every registered operation name mapped to its owning plugin
    pub fn operations(&self) -> BTreeMap<String, String> {
        self.registry.entries()
    }

    /// Identities with a known source, whether or not they are loaded
    pub fn catalog(&self) -> Vec<PluginId> {
        self.loader.catalog_ids()
    }
}

/// Thread-safe handle to a [`PluginManager`]
///
/// Lifecycle operations take the write lock; `dispatch` and introspection
/// take the read lock, so dispatch never observes a half-registered plugin.
#[derive(Clone, Default)]
pub struct SharedPluginManager {
    inner: Arc<RwLock<PluginManager>>,
}

impl SharedPluginManager {
    pub fn new(manager: PluginManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    /// Shared access, recovering from a poisoned lock
    pub fn read(&self) -> RwLockReadGuard<'_, PluginManager> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, PluginManager> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dispatch(&self, name: &str, args: &[Value]) -> PluginResult<Value> {
        self.read().dispatch(name, args)
    }

    pub fn load(&self, id: &str) -> PluginResult<Vec<String>> {
        self.write().load(id)
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> PluginResult<Vec<String>> {
        self.write().load_path(path)
    }

    pub fn load_source(&self, source: Arc<dyn PluginSource>) -> PluginResult<Vec<String>> {
        self.write().load_source(source)
    }

    pub fn unload(&self, id: &str) -> PluginResult<Vec<String>> {
        self.write().unload(id)
    }

    pub fn reload(&self, id: &str) -> PluginResult<ReloadOutcome> {
        self.write().reload(id)
    }

    pub fn discover(&self) -> PluginResult<DiscoveryReport> {
        self.write().discover()
    }

    pub fn enable(&self, id: &str) -> PluginResult<()> {
        self.write().enable(id)
    }

    pub fn disable(&self, id: &str) -> PluginResult<()> {
        self.write().disable(id)
    }

    pub fn subscribe(
        &self,
        filter: impl Into<EventFilter>,
        observer: Arc<dyn Observer>,
    ) -> SubscriptionHandle {
        self.write().subscribe(filter, observer)
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> PluginResult<()> {
        self.write().unsubscribe(handle)
    }

    pub fn list_plugins(&self) -> Vec<PluginId> {
        self.read().list_plugins()
    }

    pub fn plugin_info(&self, id: &str) -> PluginResult<PluginInfo> {
        self.read().plugin_info(id)
    }

    pub fn operations(&self) -> BTreeMap<String, String> {
        self.read().operations()
    }

    pub fn catalog(&self) -> Vec<PluginId> {
        self.read().catalog()
    }

    pub fn shutdown(&self) {
        self.write().shutdown()
    }
}
