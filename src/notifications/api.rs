//! Public API for the notification system
//!
//! External modules should import from here rather than directly from internal modules.

pub use crate::notifications::error::NotificationError;
pub use crate::notifications::event::{EventFilter, EventKind, PluginEvent};
pub use crate::notifications::hub::ObserverHub;
pub use crate::notifications::traits::{Observer, ObserverResult, SubscriptionHandle};
