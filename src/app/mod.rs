//! Application module

pub mod cli;
pub mod repl;
pub mod startup;
