//! Test modules for script plugins
//!
//! Host helpers registered on the engine, and resource limits on hostile
//! or runaway scripts.

mod helpers;
