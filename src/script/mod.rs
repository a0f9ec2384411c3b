//! Rhai Script Plugins
//!
//! Script plugins are [Rhai](https://rhai.rs) files. Loading one compiles it
//! on a fresh, resource-limited [`rhai::Engine`], runs its top-level code
//! once and reads the export from the resulting scope:
//!
//! ```text
//! let plugin_description = "Descriptive statistics";
//! let plugin_version = "1.0";
//!
//! fn mean(args) { sum(args) / args.len() }
//! fn scale(x, k) { x * k }
//!
//! let operations = #{ mean: Fn("mean"), scale: Fn("scale"), "+": |a, b| a + b };
//! let descriptions = #{ mean: "Arithmetic mean" };
//! ```
//!
//! A function whose only parameter is named `args` is variadic and receives
//! every argument flattened into one array. Other functions take exactly as
//! many arguments as they declare (minus captured variables for closures).
//! `throw "message"` inside an operation becomes a domain error.

pub(crate) mod convert;
pub(crate) mod engine;
pub(crate) mod export;

pub use engine::new_engine;
pub use export::compile_script;

#[cfg(test)]
mod tests;
