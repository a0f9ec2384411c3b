//! Plugin Test Utilities
//!
//! Helpers for writing script plugins into temporary directories and for
//! recording the events a manager emits.

use crate::notifications::api::{EventFilter, EventKind, ObserverResult, PluginEvent};
use crate::operation::Value;
use crate::plugin::api::{DiscoveryConfig, PluginManager};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

pub const MEAN_PLUGIN: &str = r#"
let plugin_description = "Descriptive statistics";

fn mean(args) { sum(args) / args.len() }

let operations = #{ mean: Fn("mean") };
"#;

pub const MEAN_AND_MEDIAN_PLUGIN: &str = r#"
let plugin_description = "Descriptive statistics";

fn mean(args) { sum(args) / args.len() }

fn median(args) {
    let s = args;
    s.sort();
    let n = s.len();
    if n % 2 == 1 { s[n / 2] } else { (s[n / 2 - 1] + s[n / 2]) / 2.0 }
}

let operations = #{ mean: Fn("mean"), median: Fn("median") };
"#;

/// A plugin exporting `name` as a zero-argument operation returning `value`
pub fn constant_plugin(name: &str, value: f64) -> String {
    format!(
        "fn {name}() {{ {value:?} }}\nlet operations = #{{ {name}: Fn(\"{name}\") }};\n"
    )
}

/// Write `content` to `<dir>/<name>.rhai` and return the path
pub fn write_plugin(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(format!("{}.rhai", name));
    fs::write(&path, content).unwrap();
    path
}

/// Push the file's modification time forward so it differs from the last read
pub fn touch(path: &Path) {
    let file = fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(5))
        .unwrap();
}

/// A manager discovering only the scripts in `dir`
pub fn script_manager(dir: &Path) -> PluginManager {
    PluginManager::with_config(DiscoveryConfig::with_path(dir).without_builtins())
}

pub fn numbers(values: &[f64]) -> Vec<Value> {
    values.iter().map(|v| Value::Number(*v)).collect()
}

/// Records every event a manager emits
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<PluginEvent>>>,
}

impl EventLog {
    pub fn attach(&self, manager: &mut PluginManager) {
        let events = Arc::clone(&self.events);
        manager.subscribe(
            EventFilter::all(),
            Arc::new(move |event: &PluginEvent| -> ObserverResult {
                events.lock().unwrap().push(event.clone());
                Ok(())
            }),
        );
    }

    pub fn labels(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| format!("{}:{}", event.kind, event.plugin))
            .collect()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<PluginEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.kind == kind)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}
