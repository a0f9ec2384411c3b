//! Error types for the notification system

use crate::notifications::event::EventKind;
use crate::notifications::traits::SubscriptionHandle;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// An observer returned an error or panicked while handling an event
    ObserverFailure {
        handle: SubscriptionHandle,
        event: EventKind,
        cause: String,
    },
    UnknownSubscription(SubscriptionHandle),
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationError::ObserverFailure {
                handle,
                event,
                cause,
            } => {
                write!(f, "Observer {handle} failed handling '{event}' event: {cause}")
            }
            NotificationError::UnknownSubscription(handle) => {
                write!(f, "Unknown subscription: {handle}")
            }
        }
    }
}

impl std::error::Error for NotificationError {}

impl crate::core::error_handling::ContextualError for NotificationError {
    fn is_user_actionable(&self) -> bool {
        false // Observer failures are reported, never shown as fatal
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}
