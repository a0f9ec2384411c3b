pub mod demo_plugins;
pub mod global;
pub mod hot_reload;
pub mod linear_algebra;
pub mod pathological;
