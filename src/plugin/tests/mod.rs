//! Test modules for the plugin system
//!
//! Lifecycle, reload, collision, discovery and observer behaviour of the
//! manager, plus contract validation of script sources.

mod utils;
