//! # Event Subscriber
//!
//! Defines the subscription side of the confirmation listener.

use crate::events::{EventFilter, LedgerEvent};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors from subscription operations.
///
/// Both are terminal: a subscription that returned one will not yield the
/// event it was waiting for.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,

    /// The subscriber fell behind and events were dropped unseen.
    #[error("Subscriber lagged, {0} events dropped")]
    Lagged(u64),
}

/// Trait for subscribing to events from the listener.
///
/// Injected into the transaction service so a deterministic bus can stand
/// in for a node connection.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching a filter.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

impl<T: EventSubscriber + ?Sized> EventSubscriber for Arc<T> {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        (**self).subscribe(filter)
    }
}

/// A subscription handle for receiving events.
///
/// When dropped, the correlation is released from the bus.
pub struct Subscription {
    /// Unique id, for log correlation.
    id: Uuid,

    /// The broadcast receiver.
    receiver: broadcast::Receiver<LedgerEvent>,

    /// Filter for this subscription.
    filter: EventFilter,

    /// Reference to subscription tracking (for cleanup).
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Correlation key for this subscription.
    correlation_key: String,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(
        receiver: broadcast::Receiver<LedgerEvent>,
        filter: EventFilter,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        correlation_key: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            receiver,
            filter,
            subscriptions,
            correlation_key,
        }
    }

    /// Receive the next event that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Ok(event)` - The next matching event
    /// - `Err(SubscriptionError::Closed)` - The bus was dropped
    /// - `Err(SubscriptionError::Lagged(n))` - `n` events were dropped before
    ///   this subscriber saw them; any of them may have matched
    pub async fn recv(&mut self) -> Result<LedgerEvent, SubscriptionError> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return Err(SubscriptionError::Closed),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(
                        subscription_id = %self.id,
                        correlation = %self.correlation_key,
                        lagged = count,
                        "Subscriber lagged, some events dropped"
                    );
                    return Err(SubscriptionError::Lagged(count));
                }
            };

            if self.filter.matches(&event) {
                return Ok(event);
            }
            // Event belongs to another correlation, continue waiting
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Get the subscription id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the correlation key this subscription is tracked under.
    #[must_use]
    pub fn correlation_key(&self) -> &str {
        &self.correlation_key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        let Some(count) = subs.get_mut(&self.correlation_key) else {
            debug!(subscription_id = %self.id, "Subscription dropped");
            return;
        };

        *count = count.saturating_sub(1);
        if *count == 0 {
            subs.remove(&self.correlation_key);
        }
        debug!(
            subscription_id = %self.id,
            correlation = %self.correlation_key,
            "Subscription dropped"
        );
    }
}
