//! Operation Registry
//!
//! Operation name -> (callable, owning plugin). The single source of truth
//! for dispatch; mutated only by the lifecycle manager.

use crate::operation::{Operation, Value};
use crate::plugin::error::{PluginError, PluginResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone)]
struct RegistryEntry {
    operation: Operation,
    owner: String,
    enabled: bool,
}

#[derive(Debug, Default)]
pub struct OperationRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `NameCollision` if any name is owned by another plugin
    ///
    /// Names are checked in sorted order so the reported collision is stable.
    pub fn check_collisions<'a, I>(&self, requested_by: &str, names: I) -> PluginResult<()>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let sorted: BTreeSet<&String> = names.into_iter().collect();
        for name in sorted {
            if let Some(entry) = self.entries.get(name) {
                if entry.owner != requested_by {
                    return Err(PluginError::NameCollision {
                        operation: name.clone(),
                        requested_by: requested_by.to_string(),
                        owner: entry.owner.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Register every operation for `owner`, or none of them
    pub fn register<I>(&mut self, owner: &str, operations: I) -> PluginResult<()>
    where
        I: IntoIterator<Item = (String, Operation)>,
    {
        let operations: Vec<(String, Operation)> = operations.into_iter().collect();
        self.check_collisions(owner, operations.iter().map(|(name, _)| name))?;

        for (name, operation) in operations {
            self.entries.insert(
                name,
                RegistryEntry {
                    operation,
                    owner: owner.to_string(),
                    enabled: true,
                },
            );
        }
        Ok(())
    }

    /// Remove the given names if (and only if) `owner` still owns them
    pub fn unregister(&mut self, owner: &str, names: &BTreeSet<String>) -> usize {
        let mut removed = 0;
        for name in names {
            if self.entries.get(name).is_some_and(|entry| entry.owner == owner) {
                self.entries.remove(name);
                removed += 1;
            }
        }
        removed
    }

    pub fn set_enabled(&mut self, owner: &str, enabled: bool) {
        for entry in self.entries.values_mut() {
            if entry.owner == owner {
                entry.enabled = enabled;
            }
        }
    }

    pub fn dispatch(&self, name: &str, args: &[Value]) -> PluginResult<Value> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| PluginError::UnknownOperation {
                operation: name.to_string(),
            })?;

        if !entry.enabled {
            return Err(PluginError::OperationDisabled {
                operation: name.to_string(),
                plugin: entry.owner.clone(),
            });
        }

        entry
            .operation
            .call(args)
            .map_err(|cause| PluginError::OperationFailed {
                operation: name.to_string(),
                cause,
            })
    }

    pub fn owner(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|entry| entry.owner.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All registered names with their owners, sorted by name
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.owner.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
