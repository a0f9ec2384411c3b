//! Hostile plugin sources and extreme arguments leave the host usable

use crate::common::{as_number, numbers, write_plugin};
use plugcalc::plugin::api::{DiscoveryConfig, PluginError, PluginManager, SharedPluginManager};

const RUNAWAY: &str = r#"
fn spin(x) { let n = 0; loop { n += 1; } }
fn grow(n) { let items = []; for i in 0..n.to_int() { items.push(i); } items }
let operations = #{ spin: Fn("spin"), grow: Fn("grow") };
"#;

fn host(dir: &std::path::Path) -> SharedPluginManager {
    SharedPluginManager::new(PluginManager::with_config(DiscoveryConfig::with_path(dir)))
}

#[test]
fn test_deeply_nested_plugin_fails_to_load_and_host_survives() {
    let dir = tempfile::tempdir().unwrap();
    let depth = 100_000;
    let body = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    write_plugin(
        dir.path(),
        "nested",
        &format!("let operations = #{{ deep: || {} }};", body),
    );
    write_plugin(dir.path(), "fine", "let operations = #{ twice: |x| x * 2.0 };");
    let runtime = host(dir.path());

    let report = runtime.discover().unwrap();

    assert_eq!(report.loaded, vec!["core", "fine"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "nested");
    assert!(matches!(report.failures[0].1, PluginError::LoadFailure { .. }));
    assert_eq!(as_number(runtime.dispatch("twice", &numbers(&[21.0])).unwrap()), 42.0);
    assert_eq!(as_number(runtime.dispatch("+", &numbers(&[2.0, 3.0])).unwrap()), 5.0);
}

#[test]
fn test_huge_factorial_terminates() {
    let runtime = host(tempfile::tempdir().unwrap().path());
    runtime.discover().unwrap();

    let huge = as_number(runtime.dispatch("!", &numbers(&[1e20])).unwrap());
    assert!(huge.is_infinite());
    let largest = as_number(runtime.dispatch("!", &numbers(&[170.0])).unwrap());
    assert!(largest.is_finite());
}

#[test]
fn test_runaway_operations_fail_without_hanging() {
    let dir = tempfile::tempdir().unwrap();
    write_plugin(dir.path(), "runaway", RUNAWAY);
    let runtime = host(dir.path());
    assert!(runtime.discover().unwrap().is_clean());

    for (name, arg) in [("spin", 0.0), ("grow", 1e15)] {
        assert!(matches!(
            runtime.dispatch(name, &numbers(&[arg])),
            Err(PluginError::OperationFailed { .. })
        ));
    }
    assert_eq!(as_number(runtime.dispatch("*", &numbers(&[6.0, 7.0])).unwrap()), 42.0);
}
