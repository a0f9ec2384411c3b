//! The process-wide runtime is shared by every handle

use crate::common::{as_number, demo_plugin_dir, numbers};
use plugcalc::app::cli::args::Command;
use plugcalc::app::startup::run_command;
use plugcalc::plugin::api::{plugin_runtime, DiscoveryConfig};
use serial_test::serial;

#[test]
#[serial]
fn test_handles_share_one_runtime() {
    let first = plugin_runtime();
    first.shutdown();
    first
        .write()
        .set_config(DiscoveryConfig::with_path(demo_plugin_dir()).excluding(["finance", "units"]));
    first.discover().unwrap();

    let second = plugin_runtime();
    assert!(second.list_plugins().iter().any(|id| id == "statistics"));
    let mean = second.dispatch("mean", &numbers(&[1.0, 2.0, 6.0])).unwrap();
    assert_eq!(as_number(mean), 3.0);

    second.shutdown();
    assert!(first.list_plugins().is_empty());
}

#[test]
#[serial]
fn test_call_command_exit_codes() {
    let runtime = plugin_runtime();
    runtime.shutdown();
    runtime
        .write()
        .set_config(DiscoveryConfig::with_path(demo_plugin_dir()));
    runtime.discover().unwrap();

    let call = |operation: &str, arguments: &[&str]| {
        run_command(
            Command::Call {
                operation: operation.to_string(),
                arguments: arguments.iter().map(|a| a.to_string()).collect(),
            },
            &runtime,
            false,
        )
    };
    assert_eq!(call("mean", &["1", "[2, 3]"]), 0);
    assert_eq!(call("mean", &["one"]), 2);
    assert_eq!(call("/", &["1", "0"]), 1);
    assert_eq!(call("nope", &[]), 1);

    runtime.shutdown();
}
