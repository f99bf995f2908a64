//! # Event Publisher
//!
//! Defines the publishing side of the confirmation listener.

use crate::events::{EventFilter, LedgerEvent};
use crate::subscriber::{EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing ledger events to the listener.
///
/// The websocket side of a node connection feeds notifications through
/// this interface; tests use it to script confirmations.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the event.
    async fn publish(&self, event: LedgerEvent) -> usize;
}

/// In-memory implementation of the confirmation listener.
///
/// Uses `tokio::sync::broadcast` so every subscription sees its own copy of
/// each event: one waiter filtering an event out never hides it from
/// another waiter.
pub struct InMemoryEventBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<LedgerEvent>,

    /// Active subscription count by correlation key.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Returns a `Subscription` handle that can be used to receive events.
    /// The correlation is released when the handle is dropped.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let correlation_key = filter.correlation_key();

        {
            if let Ok(mut subs) = self.subscriptions.write() {
                *subs.entry(correlation_key.clone()).or_insert(0) += 1;
            }
        }

        let subscription = Subscription::new(
            receiver,
            filter,
            self.subscriptions.clone(),
            correlation_key,
        );
        debug!(
            subscription_id = %subscription.id(),
            correlation = %subscription.correlation_key(),
            "New subscription created"
        );
        subscription
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the number of distinct correlations with at least one live
    /// subscription.
    #[must_use]
    pub fn active_correlations(&self) -> usize {
        self.subscriptions.read().map(|subs| subs.len()).unwrap_or(0)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        InMemoryEventBus::subscribe(self, filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LedgerEvent) -> usize {
        let kind = event.kind();
        let hash = shared_types::to_hex(&event.hash);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    kind = ?kind,
                    hash = %hash,
                    receivers = receiver_count,
                    "Event published"
                );
                receiver_count
            }
            Err(e) => {
                // No receivers - event is dropped
                warn!(
                    kind = ?kind,
                    hash = %hash,
                    error = %e,
                    "Event dropped (no receivers)"
                );
                0
            }
        }
    }
}
