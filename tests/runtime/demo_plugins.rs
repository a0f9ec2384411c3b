//! The shipped demo plugins, discovered next to the builtin core

use crate::common::{as_number, assert_close, demo_plugin_dir, numbers};
use plugcalc::operation::Value;
use plugcalc::plugin::api::{DiscoveryConfig, PluginError, PluginManager, SharedPluginManager};

fn demo_runtime() -> SharedPluginManager {
    let runtime = SharedPluginManager::new(PluginManager::with_config(
        DiscoveryConfig::with_path(demo_plugin_dir()),
    ));
    let report = runtime.discover().unwrap();
    assert!(report.is_clean(), "demo plugins failed: {}", report);
    runtime
}

fn call(runtime: &SharedPluginManager, name: &str, args: &[f64]) -> f64 {
    as_number(runtime.dispatch(name, &numbers(args)).unwrap())
}

fn domain_error(runtime: &SharedPluginManager, name: &str, args: Vec<Value>) -> String {
    match runtime.dispatch(name, &args) {
        Err(PluginError::OperationFailed { cause, .. }) => cause.message().to_string(),
        other => panic!("expected a domain error from {}, got {:?}", name, other),
    }
}

#[test]
fn test_discovers_all_demo_plugins() {
    let runtime = demo_runtime();
    let plugins = runtime.list_plugins();
    for id in ["core", "finance", "linear_algebra", "statistics", "units"] {
        assert!(plugins.iter().any(|p| p == id), "missing plugin {}", id);
    }
    // underscore files are templates, not plugins
    assert!(!plugins.iter().any(|p| p.starts_with('_')));

    let operations = runtime.operations();
    assert_eq!(operations.get("mean").map(String::as_str), Some("statistics"));
    assert_eq!(operations.get("+").map(String::as_str), Some("core"));
    assert_eq!(operations.get("npv").map(String::as_str), Some("finance"));
}

#[test]
fn test_statistics_operations() {
    let runtime = demo_runtime();
    assert_close(call(&runtime, "mean", &[1.0, 2.0, 3.0, 4.0]), 2.5);
    assert_close(call(&runtime, "median", &[5.0, 1.0, 3.0]), 3.0);
    assert_close(call(&runtime, "median", &[4.0, 1.0, 3.0, 2.0]), 2.5);
    assert_close(call(&runtime, "variance", &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 32.0 / 7.0);
    assert_close(call(&runtime, "range_stat", &[3.0, -2.0, 8.0]), 10.0);

    // a list argument is flattened the same as separate numbers
    let listed = runtime
        .dispatch("mean", &[Value::List(vec![1.0, 2.0]), Value::Number(6.0)])
        .unwrap();
    assert_close(as_number(listed), 3.0);

    assert_eq!(
        domain_error(&runtime, "mean", vec![]),
        "Cannot calculate mean of empty list"
    );
    assert_eq!(
        domain_error(&runtime, "stddev", numbers(&[1.0])),
        "Sample variance requires at least 2 values"
    );
}

#[test]
fn test_unit_conversions() {
    let runtime = demo_runtime();
    assert_close(call(&runtime, "meters_to_feet", &[10.0]), 32.8084);
    assert_close(call(&runtime, "inches_to_cm", &[2.0]), 5.08);
    assert_close(call(&runtime, "celsius_to_fahrenheit", &[100.0]), 212.0);
    assert_close(call(&runtime, "fahrenheit_to_celsius", &[32.0]), 0.0);

    assert_eq!(
        domain_error(&runtime, "meters_to_feet", numbers(&[-1.0])),
        "Length cannot be negative"
    );
    assert!(matches!(
        runtime.dispatch("meters_to_feet", &numbers(&[1.0, 2.0])),
        Err(PluginError::OperationFailed { .. })
    ));
}

#[test]
fn test_finance_operations() {
    let runtime = demo_runtime();
    assert_close(
        call(&runtime, "compound_interest", &[1000.0, 0.05, 10.0, 12.0]),
        1000.0 * (1.0_f64 + 0.05 / 12.0).powf(120.0),
    );
    assert_close(call(&runtime, "present_value", &[110.0, 0.1, 1.0]), 100.0);
    assert_close(call(&runtime, "loan_payment", &[1200.0, 0.0, 12.0]), 100.0);

    let growth = 1.01_f64.powf(12.0);
    assert_close(
        call(&runtime, "loan_payment", &[1000.0, 0.01, 12.0]),
        1000.0 * 0.01 * growth / (growth - 1.0),
    );

    let npv = runtime
        .dispatch(
            "npv",
            &[Value::Number(0.1), Value::List(vec![-100.0, 110.0])],
        )
        .unwrap();
    assert_close(as_number(npv), 0.0);

    assert_eq!(
        domain_error(&runtime, "compound_interest", numbers(&[-1.0, 0.05, 1.0, 1.0])),
        "Principal must be non-negative"
    );
}

#[test]
fn test_excluded_demo_plugin_is_not_loaded() {
    let runtime = SharedPluginManager::new(PluginManager::with_config(
        DiscoveryConfig::with_path(demo_plugin_dir()).excluding(["finance"]),
    ));
    runtime.discover().unwrap();
    assert!(!runtime.list_plugins().iter().any(|p| p == "finance"));
    assert!(matches!(
        runtime.dispatch("npv", &numbers(&[0.1, 1.0])),
        Err(PluginError::UnknownOperation { .. })
    ));
}
