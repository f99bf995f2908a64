//! # Ledger Events
//!
//! Defines the lifecycle notifications a node pushes for announced
//! transactions, and the correlation filter a waiter uses to pick its own.

use serde::{Deserialize, Serialize};
use shared_types::entities::{to_hex, Address, Hash, Transaction, TransactionStatus};

/// A lifecycle notification for one (address, hash) pair.
///
/// Events are ephemeral: they are delivered to every live subscription and
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Address the notification channel was opened for.
    pub address: Address,
    /// Hash of the transaction the notification is about.
    pub hash: Hash,
    /// What happened.
    pub payload: EventPayload,
}

/// Event body, one variant per listener channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    /// The transaction was included in a block.
    Confirmed(Transaction),

    /// A bonded aggregate entered the partial (cosignature) cache.
    AggregateBondedAdded(Transaction),

    /// The node rejected the transaction after announcement.
    Error(TransactionStatus),
}

impl LedgerEvent {
    /// Create a `Confirmed` event.
    #[must_use]
    pub fn confirmed(address: Address, hash: Hash, transaction: Transaction) -> Self {
        Self {
            address,
            hash,
            payload: EventPayload::Confirmed(transaction),
        }
    }

    /// Create an `AggregateBondedAdded` event.
    #[must_use]
    pub fn aggregate_bonded_added(address: Address, hash: Hash, transaction: Transaction) -> Self {
        Self {
            address,
            hash,
            payload: EventPayload::AggregateBondedAdded(transaction),
        }
    }

    /// Create an `Error` event from a status pushed by the node.
    #[must_use]
    pub fn error(address: Address, status: TransactionStatus) -> Self {
        Self {
            address,
            hash: status.hash,
            payload: EventPayload::Error(status),
        }
    }

    /// Get the kind of this event (for filtering).
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::Confirmed(_) => EventKind::Confirmed,
            EventPayload::AggregateBondedAdded(_) => EventKind::AggregateBondedAdded,
            EventPayload::Error(_) => EventKind::Error,
        }
    }
}

/// Listener channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Confirmed transactions.
    Confirmed,
    /// Bonded aggregates added to the partial cache.
    AggregateBondedAdded,
    /// Transaction status errors.
    Error,
}

/// Filter for subscribing to specific events.
///
/// `None` / empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Address to correlate on.
    pub address: Option<Address>,
    /// Transaction hash to correlate on.
    pub hash: Option<Hash>,
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<EventKind>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self {
            kinds,
            ..Self::default()
        }
    }

    /// Create a filter for one (address, hash) correlation.
    #[must_use]
    pub fn correlation(address: Address, hash: Hash, kinds: Vec<EventKind>) -> Self {
        Self {
            address: Some(address),
            hash: Some(hash),
            kinds,
        }
    }

    /// Key identifying this correlation in the bus's tracking table.
    #[must_use]
    pub fn correlation_key(&self) -> String {
        let address = self
            .address
            .map_or_else(|| "*".to_string(), hex::encode_upper);
        let hash = self.hash.map_or_else(|| "*".to_string(), |h| to_hex(&h));
        format!("{address}/{hash}/{:?}", self.kinds)
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let address_match = self.address.map_or(true, |a| a == event.address);
        let hash_match = self.hash.map_or(true, |h| h == event.hash);
        let kind_match = self.kinds.is_empty() || self.kinds.contains(&event.kind());

        address_match && hash_match && kind_match
    }
}
