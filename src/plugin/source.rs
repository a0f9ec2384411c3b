//! Plugin Sources
//!
//! A [`PluginSource`] is anything the loader can execute to obtain a fresh
//! [`PluginExport`]: Rhai script files on disk, compiled-in builtin
//! factories, and closures supplied by an embedding host.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::{Fingerprint, LoadedSource, PluginExport, SourceKind};
use crate::script::compile_script;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Seam between the loader and concrete plugin kinds
pub trait PluginSource: Send + Sync {
    /// Stable identity the plugin is registered under
    fn identity(&self) -> &str;

    /// Human readable location (a path for scripts)
    fn location(&self) -> String;

    fn kind(&self) -> SourceKind;

    /// Fingerprint of the source as it currently exists, without executing it
    fn fingerprint(&self) -> PluginResult<Fingerprint>;

    /// Run the source's top-level code and return its export
    ///
    /// Every call executes fresh; implementations must not cache exports.
    fn execute(&self) -> PluginResult<LoadedSource>;
}

impl fmt::Debug for dyn PluginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSource")
            .field("identity", &self.identity())
            .field("kind", &self.kind())
            .field("location", &self.location())
            .finish()
    }
}

/// Derive a plugin identity from a source path (its file stem)
pub fn identity_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

/// File extension of script plugins
pub const SCRIPT_EXTENSION: &str = "rhai";

/// A `*.rhai` script plugin on disk
#[derive(Debug, Clone)]
pub struct ScriptSource {
    id: String,
    path: PathBuf,
}

impl ScriptSource {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// Build a source whose identity is the file stem of `path`
    pub fn from_path(path: impl Into<PathBuf>) -> PluginResult<Self> {
        let path = path.into();
        let id = identity_from_path(&path).ok_or_else(|| {
            PluginError::load_failure(&path.display().to_string(), "path has no usable file stem")
        })?;
        Ok(Self { id, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> PluginResult<(Vec<u8>, Fingerprint)> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            PluginError::load_failure(
                &self.id,
                format!("cannot read {}: {}", self.path.display(), e),
            )
        })?;
        let modified = std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok();
        let fingerprint = Fingerprint::from_bytes(&bytes, modified);
        Ok((bytes, fingerprint))
    }
}

impl PluginSource for ScriptSource {
    fn identity(&self) -> &str {
        &self.id
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Script
    }

    fn fingerprint(&self) -> PluginResult<Fingerprint> {
        self.read().map(|(_, fingerprint)| fingerprint)
    }

    fn execute(&self) -> PluginResult<LoadedSource> {
        let (bytes, fingerprint) = self.read()?;
        let text = String::from_utf8(bytes)
            .map_err(|_| PluginError::load_failure(&self.id, "source is not valid UTF-8"))?;
        let export = compile_script(&self.id, &text)?;
        Ok(LoadedSource {
            export,
            fingerprint,
        })
    }
}

/// A compiled-in plugin factory
#[derive(Debug, Clone)]
pub struct BuiltinSource {
    id: &'static str,
    factory: fn() -> PluginExport,
}

impl BuiltinSource {
    pub fn new(id: &'static str, factory: fn() -> PluginExport) -> Self {
        Self { id, factory }
    }
}

impl PluginSource for BuiltinSource {
    fn identity(&self) -> &str {
        self.id
    }

    fn location(&self) -> String {
        format!("builtin:{}", self.id)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Builtin
    }

    fn fingerprint(&self) -> PluginResult<Fingerprint> {
        // builtin code only changes with the binary
        let marker = format!("builtin:{}:{}", self.id, crate::PACKAGE_VERSION);
        Ok(Fingerprint::from_bytes(marker.as_bytes(), None))
    }

    fn execute(&self) -> PluginResult<LoadedSource> {
        Ok(LoadedSource {
            export: (self.factory)(),
            fingerprint: self.fingerprint()?,
        })
    }
}

type ExportFactory = dyn Fn() -> PluginResult<PluginExport> + Send + Sync;

/// A plugin backed by a closure, for embedding hosts and tests
///
/// The fingerprint is derived from a revision counter; call [`bump`] after
/// changing what the closure produces so `reload` picks it up.
///
/// [`bump`]: FnSource::bump
pub struct FnSource {
    id: String,
    revision: AtomicU64,
    factory: Arc<ExportFactory>,
}

impl FnSource {
    pub fn new<F>(id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> PluginResult<PluginExport> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            revision: AtomicU64::new(0),
            factory: Arc::new(factory),
        }
    }

    pub fn bump(&self) {
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}

impl PluginSource for FnSource {
    fn identity(&self) -> &str {
        &self.id
    }

    fn location(&self) -> String {
        format!("closure:{}", self.id)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Closure
    }

    fn fingerprint(&self) -> PluginResult<Fingerprint> {
        let marker = format!("closure:{}:{}", self.id, self.revision());
        Ok(Fingerprint::from_bytes(marker.as_bytes(), None))
    }

    fn execute(&self) -> PluginResult<LoadedSource> {
        // read the revision first so a concurrent bump forces another reload
        let fingerprint = self.fingerprint()?;
        Ok(LoadedSource {
            export: (self.factory)()?,
            fingerprint,
        })
    }
}
