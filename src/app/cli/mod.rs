//! CLI module: arguments, configuration file and output formatting

pub mod args;
pub mod config;
pub mod display;

#[cfg(test)]
mod tests;
