//! Event types for the notification system

use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumIter, EnumString};

/// Lifecycle transitions observers can subscribe to
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EventKind {
    Loaded,
    Unloaded,
    Reloaded,
    Enabled,
    Disabled,
    Error,
}

/// A lifecycle notification about one plugin
#[derive(Clone, Debug)]
pub struct PluginEvent {
    pub kind: EventKind,
    pub timestamp: DateTime<Local>,
    pub plugin: String,
    pub message: Option<String>,
    /// Operation names owned by the plugin after the transition
    pub operations: Vec<String>,
    /// For `reloaded`: whether the source content actually changed
    pub changed: Option<bool>,
}

impl PluginEvent {
    pub fn new(kind: EventKind, plugin: impl Into<String>) -> Self {
        Self {
            kind,
            timestamp: Local::now(),
            plugin: plugin.into(),
            message: None,
            operations: Vec::new(),
            changed: None,
        }
    }

    pub fn with_message(
        kind: EventKind,
        plugin: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(kind, plugin)
        }
    }

    pub fn operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operations = operations.into_iter().map(Into::into).collect();
        self
    }

    pub fn changed(mut self, changed: bool) -> Self {
        self.changed = Some(changed);
        self
    }
}

/// Set of event kinds a subscriber wants to receive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventFilter {
    kinds: BTreeSet<EventKind>,
}

impl EventFilter {
    pub fn all() -> Self {
        use strum::IntoEnumIterator;
        Self {
            kinds: EventKind::iter().collect(),
        }
    }

    pub fn only<I: IntoIterator<Item = EventKind>>(kinds: I) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &PluginEvent) -> bool {
        self.kinds.contains(&event.kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.kinds.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl From<EventKind> for EventFilter {
    fn from(kind: EventKind) -> Self {
        Self::only([kind])
    }
}

impl<const N: usize> From<[EventKind; N]> for EventFilter {
    fn from(kinds: [EventKind; N]) -> Self {
        Self::only(kinds)
    }
}
