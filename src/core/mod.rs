//! Core services shared by the runtime and the host

pub mod error_handling;
pub mod logging;
pub mod styles; // centralized styling palette for CLI output
pub mod version;
