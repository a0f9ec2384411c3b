//! Plugin System Module
//!
//! Discovers, loads, registers, dispatches, unloads and hot-reloads
//! operation plugins inside a long-lived host.

// Internal modules - all access should go through api module
pub mod builtin;
pub(crate) mod discovery;
pub(crate) mod error;
pub(crate) mod loader;
pub(crate) mod manager;
pub(crate) mod registry;
pub(crate) mod source;
pub(crate) mod types;

// Public API module - the only public interface for the plugin system
pub mod api;

#[cfg(test)]
mod tests;
