//! Type definitions for the plugin system
//!
//! Records, exports, fingerprints and the small reporting types returned by
//! the lifecycle manager.

use crate::operation::{Arity, DomainError, Operation, Value};
use crate::plugin::error::PluginError;
use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use strum_macros::{Display, EnumString};

/// Stable plugin identity (the source file stem for script plugins)
pub type PluginId = String;

/// Where a plugin's code comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SourceKind {
    Script,
    Builtin,
    Closure,
}

/// Content fingerprint of a plugin source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub modified: Option<SystemTime>,
    /// Hex encoded SHA-256 of the source bytes
    pub digest: String,
}

impl Fingerprint {
    pub fn from_bytes(bytes: &[u8], modified: Option<SystemTime>) -> Self {
        let digest = Sha256::digest(bytes)
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect();
        Self { modified, digest }
    }

    /// Two fingerprints describe the same content when their digests match
    pub fn same_content(&self, other: &Fingerprint) -> bool {
        self.digest == other.digest
    }

    pub fn short_digest(&self) -> &str {
        &self.digest[..self.digest.len().min(12)]
    }
}

/// Optional descriptive metadata a plugin may export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginMetadata {
    pub description: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
}

/// Operation metadata carried next to the callable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    pub name: String,
    pub description: Option<String>,
    pub arity: Arity,
}

#[derive(Debug, Clone)]
pub struct ExportedOperation {
    pub spec: OperationSpec,
    pub operation: Operation,
}

/// The single export every plugin source produces: name -> callable
///
/// Entries are kept in declaration order so the loader can report
/// duplicate names instead of silently keeping the last one.
#[derive(Debug, Clone, Default)]
pub struct PluginExport {
    pub metadata: PluginMetadata,
    pub operations: Vec<ExportedOperation>,
}

impl PluginExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.metadata.version = Some(version.into());
        self
    }

    /// Add an operation built from a plain function or closure
    pub fn operation<F>(mut self, name: impl Into<String>, arity: Arity, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, DomainError> + Send + Sync + 'static,
    {
        self.operations.push(ExportedOperation {
            spec: OperationSpec {
                name: name.into(),
                description: None,
                arity,
            },
            operation: Operation::new(arity, func),
        });
        self
    }

    pub fn push(&mut self, spec: OperationSpec, operation: Operation) {
        self.operations.push(ExportedOperation { spec, operation });
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|op| op.spec.name.as_str())
    }
}

/// Export plus the fingerprint of the exact bytes that produced it
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub export: PluginExport,
    pub fingerprint: Fingerprint,
}

/// Per-identity lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PluginState {
    Unloaded,
    Loading,
    Registered,
    Unloading,
}

impl PluginState {
    /// Whether the lifecycle manager may move from `self` to `next`
    ///
    /// `Unloading -> Loading` is the middle of a reload.
    pub fn can_transition_to(&self, next: PluginState) -> bool {
        use PluginState::*;
        matches!(
            (self, next),
            (Unloaded, Loading)
                | (Loading, Registered)
                | (Loading, Unloaded)
                | (Registered, Unloading)
                | (Unloading, Unloaded)
                | (Unloading, Loading)
        )
    }
}

/// A live plugin
#[derive(Debug, Clone)]
pub struct PluginRecord {
    pub id: PluginId,
    pub location: String,
    pub kind: SourceKind,
    pub metadata: PluginMetadata,
    pub operations: BTreeSet<String>,
    pub fingerprint: Fingerprint,
    pub loaded_at: DateTime<Local>,
    pub enabled: bool,
    /// Loaded module instance; the registry holds clones of its callables
    pub module: Arc<PluginExport>,
    /// Increments on every successful load of any plugin
    pub generation: u64,
}

impl PluginRecord {
    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            id: self.id.clone(),
            location: self.location.clone(),
            kind: self.kind,
            description: self.metadata.description.clone(),
            version: self.metadata.version.clone(),
            operations: self.operations.iter().cloned().collect(),
            enabled: self.enabled,
            loaded_at: self.loaded_at,
            digest: self.fingerprint.digest.clone(),
        }
    }
}

/// Read-only summary of a live plugin
#[derive(Debug, Clone, PartialEq)]
pub struct PluginInfo {
    pub id: PluginId,
    pub location: String,
    pub kind: SourceKind,
    pub description: Option<String>,
    pub version: Option<String>,
    pub operations: Vec<String>,
    pub enabled: bool,
    pub loaded_at: DateTime<Local>,
    pub digest: String,
}

/// Result of a successful `reload`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Fingerprint unchanged; registry untouched
    Unchanged,
    Reloaded {
        added: Vec<String>,
        removed: Vec<String>,
    },
}

/// Aggregated outcome of `discover`
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub attempted: usize,
    pub loaded: Vec<PluginId>,
    /// Candidates already live from the same location
    pub skipped: Vec<PluginId>,
    pub failures: Vec<(PluginId, PluginError)>,
}

impl DiscoveryReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for DiscoveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loaded {} of {} plugins, {} failures",
            self.loaded.len(),
            self.attempted,
            self.failures.len()
        )?;
        if !self.skipped.is_empty() {
            write!(f, " ({} already loaded)", self.skipped.len())?;
        }
        Ok(())
    }
}
