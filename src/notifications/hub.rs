//! ObserverHub implementation

use crate::core::error_handling::panic_message;
use crate::notifications::error::NotificationError;
use crate::notifications::event::{EventFilter, PluginEvent};
use crate::notifications::traits::{Observer, SubscriptionHandle};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Observer failures kept for `take_failures`; older ones are dropped
const MAX_RETAINED_FAILURES: usize = 256;

struct Subscription {
    handle: SubscriptionHandle,
    filter: EventFilter,
    observer: Arc<dyn Observer>,
}

/// Ordered list of observers notified synchronously on every transition
#[derive(Default)]
pub struct ObserverHub {
    subscriptions: Vec<Subscription>,
    next_handle: u64,
    failures: Vec<NotificationError>,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        filter: impl Into<EventFilter>,
        observer: Arc<dyn Observer>,
    ) -> SubscriptionHandle {
        self.next_handle += 1;
        let handle = SubscriptionHandle(self.next_handle);
        let filter = filter.into();

        if filter.is_empty() {
            log::warn!(
                "Observer {} ({}) subscribed with an empty filter and will receive nothing",
                handle,
                observer.source()
            );
        }
        log::trace!(
            "Observer {} ({}) subscribed to {:?}",
            handle,
            observer.source(),
            filter.kinds().collect::<Vec<_>>()
        );

        self.subscriptions.push(Subscription {
            handle,
            filter,
            observer,
        });
        handle
    }

    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> Result<(), NotificationError> {
        let position = self
            .subscriptions
            .iter()
            .position(|subscription| subscription.handle == handle)
            .ok_or(NotificationError::UnknownSubscription(handle))?;
        // remove, not swap_remove: delivery order is subscription order
        self.subscriptions.remove(position);
        log::trace!("Observer {} unsubscribed", handle);
        Ok(())
    }

    /// Deliver `event` to every matching observer in subscription order
    ///
    /// A failing observer never stops later deliveries. The failures of
    /// this round are returned and also retained for [`take_failures`].
    ///
    /// [`take_failures`]: ObserverHub::take_failures
    pub fn notify(&mut self, event: &PluginEvent) -> Vec<NotificationError> {
        let mut round = Vec::new();

        for subscription in &self.subscriptions {
            if !subscription.filter.accepts(event) {
                continue;
            }
            let observer = Arc::clone(&subscription.observer);
            let outcome = catch_unwind(AssertUnwindSafe(|| observer.on_event(event)));
            let cause = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(payload) => format!("observer panicked: {}", panic_message(payload.as_ref())),
            };
            round.push(NotificationError::ObserverFailure {
                handle: subscription.handle,
                event: event.kind,
                cause,
            });
        }

        self.failures.extend(round.iter().cloned());
        if self.failures.len() > MAX_RETAINED_FAILURES {
            let excess = self.failures.len() - MAX_RETAINED_FAILURES;
            self.failures.drain(..excess);
        }
        round
    }

    /// Drain the observer failures collected so far
    pub fn take_failures(&mut self) -> Vec<NotificationError> {
        std::mem::take(&mut self.failures)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn has_subscriber(&self, handle: SubscriptionHandle) -> bool {
        self.subscriptions.iter().any(|s| s.handle == handle)
    }

    /// Drop every subscription and retained failure
    pub fn clear(&mut self) {
        self.subscriptions.clear();
        self.failures.clear();
    }
}
