pub mod app;
pub mod core;
pub mod notifications;
pub mod operation;
pub mod plugin;
pub mod script;

pub use crate::core::version::PACKAGE_VERSION;
