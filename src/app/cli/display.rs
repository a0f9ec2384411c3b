//! CLI display utilities for formatting output

use crate::core::styles::StyleRole;
use crate::notifications::api::{EventKind, PluginEvent};
use crate::plugin::api::{DiscoveryReport, PluginInfo, ReloadOutcome};
use prettytable::{format, Cell, Row, Table};
use std::collections::BTreeMap;

fn styled_cell(text: &str, role: StyleRole, use_color: bool) -> Cell {
    let cell = Cell::new(text);
    match role.to_prettytable_spec().filter(|_| use_color) {
        Some(spec) => cell.style_spec(spec),
        None => cell,
    }
}

/// Table of loaded plugins: one row per plugin, description on the row below
pub fn plugin_table(plugins: &[PluginInfo], use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(Row::new(vec![
        styled_cell("Plugin", StyleRole::Header, use_color),
        styled_cell("Status", StyleRole::Header, use_color),
        styled_cell("Operations / Description", StyleRole::Header, use_color),
    ]));

    for plugin in plugins {
        let (status, role) = if plugin.enabled {
            ("enabled", StyleRole::Operation)
        } else {
            ("disabled", StyleRole::Disabled)
        };
        table.add_row(Row::new(vec![
            styled_cell(&plugin.id, StyleRole::Plugin, use_color),
            styled_cell(status, role, use_color),
            Cell::new(&plugin.operations.join(", ")),
        ]));

        let mut details = vec![plugin.kind.to_string()];
        if let Some(version) = &plugin.version {
            details.push(format!("v{}", version));
        }
        if let Some(description) = &plugin.description {
            details.push(sanitize(description));
        }
        table.add_row(Row::new(vec![
            Cell::new(""),
            Cell::new(""),
            styled_cell(&details.join(" - "), StyleRole::Disabled, use_color),
        ]));
    }
    table
}

/// Control characters in plugin-provided text would break the table layout
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

pub fn display_plugin_table(plugins: &[PluginInfo], use_color: bool) {
    if plugins.is_empty() {
        println!("No plugins loaded.");
        return;
    }
    plugin_table(plugins, use_color).printstd();
}

/// Operation names with their owning plugin, one per line
pub fn format_operations(operations: &BTreeMap<String, String>, use_color: bool) -> String {
    let width = operations.keys().map(|name| name.len()).max().unwrap_or(0);
    operations
        .iter()
        .map(|(name, owner)| {
            format!(
                "  {}  {}",
                StyleRole::Operation.paint(&format!("{:<width$}", name, width = width), use_color),
                StyleRole::Plugin.paint(owner, use_color)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_reload(id: &str, outcome: &ReloadOutcome) -> String {
    match outcome {
        ReloadOutcome::Unchanged => format!("Plugin '{}' is unchanged.", id),
        ReloadOutcome::Reloaded { added, removed } => {
            let mut text = format!("Plugin '{}' reloaded.", id);
            if !added.is_empty() {
                text.push_str(&format!(" Added: {}.", added.join(", ")));
            }
            if !removed.is_empty() {
                text.push_str(&format!(" Removed: {}.", removed.join(", ")));
            }
            text
        }
    }
}

pub fn format_discovery(report: &DiscoveryReport) -> String {
    let mut lines = vec![report.to_string()];
    for (id, error) in &report.failures {
        lines.push(format!("  {}: {}", id, error));
    }
    lines.join("\n")
}

/// One-line notice for a lifecycle event, or None for events the user
/// does not need to see
pub fn format_event_notice(event: &PluginEvent, use_color: bool) -> Option<String> {
    let plugin = StyleRole::Plugin.paint(&event.plugin, use_color);
    match event.kind {
        EventKind::Reloaded if event.changed == Some(true) => Some(format!(
            "{} plugin {} reloaded ({})",
            StyleRole::Notice.paint("*", use_color),
            plugin,
            event.operations.join(", ")
        )),
        EventKind::Error => Some(format!(
            "{} plugin {}: {}",
            StyleRole::Error.paint("!", use_color),
            plugin,
            event.message.as_deref().unwrap_or("unknown error")
        )),
        _ => None,
    }
}
