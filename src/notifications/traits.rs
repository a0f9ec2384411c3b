//! Traits for the notification system

use crate::notifications::event::PluginEvent;
use std::fmt;

/// Result returned by an observer callback
pub type ObserverResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Opaque token identifying one subscription
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionHandle(pub(crate) u64);

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Trait for lifecycle event observers
///
/// Observers run synchronously on the thread that triggered the transition,
/// while the runtime holds its write lock. They must not call back into the
/// runtime, not even to dispatch.
pub trait Observer: Send + Sync {
    /// Handle an incoming event
    fn on_event(&self, event: &PluginEvent) -> ObserverResult;

    /// Get the source identifier for debugging
    fn source(&self) -> &str {
        "anonymous"
    }
}

impl<F> Observer for F
where
    F: Fn(&PluginEvent) -> ObserverResult + Send + Sync,
{
    fn on_event(&self, event: &PluginEvent) -> ObserverResult {
        self(event)
    }
}
