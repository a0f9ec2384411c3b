//! Shared helpers for integration tests

#![allow(dead_code)]

use plugcalc::operation::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// The demo plugins shipped in the repository
pub fn demo_plugin_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("plugins")
}

pub fn write_plugin(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(format!("{}.rhai", name));
    fs::write(&path, content).unwrap();
    path
}

pub fn numbers(values: &[f64]) -> Vec<Value> {
    values.iter().map(|v| Value::Number(*v)).collect()
}

pub fn as_number(value: Value) -> f64 {
    match value {
        Value::Number(n) => n,
        other => panic!("expected a number, got {}", other),
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}
