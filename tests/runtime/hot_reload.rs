//! Editing plugin sources while the host keeps running

use crate::common::{as_number, assert_close, numbers, write_plugin};
use plugcalc::app::repl::Repl;
use plugcalc::notifications::api::{EventFilter, EventKind, ObserverResult, PluginEvent};
use plugcalc::plugin::api::{
    DiscoveryConfig, PluginError, PluginManager, PluginState, ReloadOutcome, SharedPluginManager,
};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

const STATS_V1: &str = r#"
fn mean(args) { sum(args) / args.len() }

let operations = #{ mean: Fn("mean") };
"#;

const STATS_V2: &str = r#"
let plugin_version = "2.0";

fn mean(args) { sum(args) / args.len() }
fn spread(args) { max(args) - min(args) }

let operations = #{ mean: Fn("mean"), spread: Fn("spread") };
"#;

fn scripts_only(dir: &std::path::Path) -> SharedPluginManager {
    SharedPluginManager::new(PluginManager::with_config(
        DiscoveryConfig::with_path(dir).without_builtins(),
    ))
}

#[test]
fn test_edit_then_reload_swaps_operations() {
    let dir = tempfile::tempdir().unwrap();
    write_plugin(dir.path(), "stats", STATS_V1);
    let runtime = scripts_only(dir.path());
    runtime.discover().unwrap();

    assert!(matches!(
        runtime.dispatch("spread", &numbers(&[1.0, 4.0])),
        Err(PluginError::UnknownOperation { .. })
    ));

    write_plugin(dir.path(), "stats", STATS_V2);
    let outcome = runtime.reload("stats").unwrap();
    assert_eq!(
        outcome,
        ReloadOutcome::Reloaded {
            added: vec!["spread".to_string()],
            removed: vec![],
        }
    );
    assert_close(as_number(runtime.dispatch("spread", &numbers(&[1.0, 4.0])).unwrap()), 3.0);
    assert_eq!(runtime.plugin_info("stats").unwrap().version.as_deref(), Some("2.0"));

    // identical content is not reloaded again
    assert_eq!(runtime.reload("stats").unwrap(), ReloadOutcome::Unchanged);
}

#[test]
fn test_broken_edit_leaves_plugin_unloaded_until_fixed() {
    let dir = tempfile::tempdir().unwrap();
    write_plugin(dir.path(), "stats", STATS_V1);
    let runtime = scripts_only(dir.path());
    runtime.discover().unwrap();

    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    runtime.subscribe(
        EventFilter::only([EventKind::Error]),
        Arc::new(move |event: &PluginEvent| -> ObserverResult {
            sink.lock().unwrap().push(event.plugin.clone());
            Ok(())
        }),
    );

    write_plugin(dir.path(), "stats", "fn mean(args) { sum(args }\n");
    assert!(matches!(
        runtime.reload("stats"),
        Err(PluginError::LoadFailure { .. })
    ));
    assert_eq!(runtime.read().state("stats"), PluginState::Unloaded);
    assert!(runtime.operations().is_empty());
    assert_eq!(*errors.lock().unwrap(), vec!["stats".to_string()]);

    // the next discovery picks the repaired file up again
    write_plugin(dir.path(), "stats", STATS_V1);
    let report = runtime.discover().unwrap();
    assert_eq!(report.loaded, vec!["stats".to_string()]);
    assert_close(as_number(runtime.dispatch("mean", &numbers(&[2.0, 4.0])).unwrap()), 3.0);
}

#[test]
fn test_repl_session_drives_the_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    write_plugin(dir.path(), "stats", STATS_V1);
    let runtime = SharedPluginManager::new(PluginManager::with_config(
        DiscoveryConfig::with_path(dir.path()),
    ));
    runtime.discover().unwrap();

    write_plugin(dir.path(), "stats", STATS_V2);
    let script = "mean 1 2 3\n!reload stats\nspread [1, 5]\n2 + 3\n!unload stats\nmean 1\n";
    let mut output = Vec::new();
    Repl::new(runtime.clone(), false)
        .run(&mut Cursor::new(script), &mut output, false)
        .unwrap();

    let output = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Result: 2",
            "Plugin 'stats' reloaded. Added: spread.",
            "Result: 4",
            "Result: 5",
            "Plugin 'stats' unloaded.",
            "Error: Unknown operation: mean",
        ]
    );
}
