//! Built-in Plugin Implementations
//!
//! Built-in plugins are compiled into the binary and discovered alongside
//! script plugins. They obey the same lifecycle and collision rules.

pub mod api;
pub mod arithmetic;
