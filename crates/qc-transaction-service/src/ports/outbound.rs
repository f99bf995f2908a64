//! # Outbound Ports
//!
//! Traits for external dependencies (node transport, reference resolution,
//! receipt lookup), plus scripted implementations for tests.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use shared_bus::{EventPublisher, InMemoryEventBus, LedgerEvent};
use shared_types::entities::{
    Hash, ResolvedTransaction, SignedTransaction, Statement, Transaction,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{FetchError, ResolutionError, SubmissionError};

/// Acknowledgement returned by a node when it accepts a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnounceAck {
    /// Node message.
    pub message: String,
}

/// Node transport - outbound port.
///
/// Request/response calls against a ledger node. Retries and timeouts
/// belong to implementations.
#[async_trait]
pub trait TransactionGateway: Send + Sync {
    /// Get confirmed transactions by hash, in one call.
    ///
    /// Fails with `UnknownTransaction` if any hash is unknown.
    async fn fetch_transactions(&self, hashes: &[Hash]) -> Result<Vec<Transaction>, FetchError>;

    /// Announce a signed transaction.
    async fn announce(&self, signed: &SignedTransaction) -> Result<AnnounceAck, SubmissionError>;

    /// Announce a signed bonded aggregate to the partial-transaction
    /// endpoint.
    async fn announce_aggregate_bonded(
        &self,
        signed: &SignedTransaction,
    ) -> Result<AnnounceAck, SubmissionError>;
}

/// Reference resolution - outbound port.
///
/// Replaces every alias of one transaction with the concrete value.
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    /// Resolve all aliases of `transaction`.
    async fn resolve_references(
        &self,
        transaction: Transaction,
    ) -> Result<ResolvedTransaction, ResolutionError>;
}

/// Receipt lookup - outbound port.
#[async_trait]
pub trait ReceiptLookup: Send + Sync {
    /// Get the resolution receipts of the block at `height`.
    async fn block_statement(&self, height: u64) -> Result<Statement, ResolutionError>;
}

#[async_trait]
impl<T: TransactionGateway + ?Sized> TransactionGateway for Arc<T> {
    async fn fetch_transactions(&self, hashes: &[Hash]) -> Result<Vec<Transaction>, FetchError> {
        (**self).fetch_transactions(hashes).await
    }

    async fn announce(&self, signed: &SignedTransaction) -> Result<AnnounceAck, SubmissionError> {
        (**self).announce(signed).await
    }

    async fn announce_aggregate_bonded(
        &self,
        signed: &SignedTransaction,
    ) -> Result<AnnounceAck, SubmissionError> {
        (**self).announce_aggregate_bonded(signed).await
    }
}

#[async_trait]
impl<T: ReferenceResolver + ?Sized> ReferenceResolver for Arc<T> {
    async fn resolve_references(
        &self,
        transaction: Transaction,
    ) -> Result<ResolvedTransaction, ResolutionError> {
        (**self).resolve_references(transaction).await
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Events to push after the mock node accepts a payload.
pub type AnnounceReaction = Box<dyn Fn(&SignedTransaction) -> Vec<LedgerEvent> + Send + Sync>;

/// Mock node for testing.
///
/// Serves transactions from memory, counts calls, and can push scripted
/// listener events once it accepts an announcement.
#[derive(Default)]
pub struct MockTransactionGateway {
    /// Known transactions by hash.
    transactions: RwLock<HashMap<Hash, Transaction>>,
    /// Fail every fetch with this error.
    fetch_failure: RwLock<Option<FetchError>>,
    /// Hashes the node refuses, with the reason.
    rejections: RwLock<HashMap<Hash, String>>,
    /// Accepted hashes, in order.
    announced: Mutex<Vec<Hash>>,
    /// Bus and reaction for accepted announcements.
    reaction: Option<(Arc<InMemoryEventBus>, AnnounceReaction)>,
    fetch_calls: AtomicUsize,
    announce_calls: AtomicUsize,
    announce_bonded_calls: AtomicUsize,
}

impl MockTransactionGateway {
    /// Create an empty mock node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock node that knows `transactions`.
    #[must_use]
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        let gateway = Self::new();
        for transaction in transactions {
            gateway.insert(transaction);
        }
        gateway
    }

    /// Push the events returned by `reaction` to `bus` whenever an
    /// announcement is accepted.
    #[must_use]
    pub fn with_reaction<F>(mut self, bus: Arc<InMemoryEventBus>, reaction: F) -> Self
    where
        F: Fn(&SignedTransaction) -> Vec<LedgerEvent> + Send + Sync + 'static,
    {
        self.reaction = Some((bus, Box::new(reaction)));
        self
    }

    /// Add a transaction. Transactions without chain info are ignored.
    pub fn insert(&self, transaction: Transaction) {
        if let Some(hash) = transaction.hash() {
            self.transactions.write().insert(hash, transaction);
        }
    }

    /// Make every fetch fail with `error`.
    pub fn fail_fetch(&self, error: FetchError) {
        *self.fetch_failure.write() = Some(error);
    }

    /// Refuse announcements of `hash`.
    pub fn reject(&self, hash: Hash, reason: &str) {
        self.rejections.write().insert(hash, reason.to_string());
    }

    /// Number of fetch calls.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of `announce` calls.
    pub fn announce_calls(&self) -> usize {
        self.announce_calls.load(Ordering::SeqCst)
    }

    /// Number of `announce_aggregate_bonded` calls.
    pub fn announce_aggregate_bonded_calls(&self) -> usize {
        self.announce_bonded_calls.load(Ordering::SeqCst)
    }

    /// Accepted hashes, in order.
    pub fn announced(&self) -> Vec<Hash> {
        self.announced.lock().clone()
    }

    async fn accept(&self, signed: &SignedTransaction) -> Result<AnnounceAck, SubmissionError> {
        if let Some(reason) = self.rejections.read().get(&signed.hash).cloned() {
            return Err(SubmissionError::Rejected {
                hash: signed.hash,
                reason,
            });
        }

        self.announced.lock().push(signed.hash);

        if let Some((bus, reaction)) = &self.reaction {
            for event in reaction(signed) {
                bus.publish(event).await;
            }
        }

        Ok(AnnounceAck {
            message: "packet 9 was pushed to the network via /transactions".to_string(),
        })
    }
}

#[async_trait]
impl TransactionGateway for MockTransactionGateway {
    async fn fetch_transactions(&self, hashes: &[Hash]) -> Result<Vec<Transaction>, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.fetch_failure.read().clone() {
            return Err(error);
        }

        let known = self.transactions.read();
        hashes
            .iter()
            .map(|hash| {
                known
                    .get(hash)
                    .cloned()
                    .ok_or(FetchError::UnknownTransaction(*hash))
            })
            .collect()
    }

    async fn announce(&self, signed: &SignedTransaction) -> Result<AnnounceAck, SubmissionError> {
        self.announce_calls.fetch_add(1, Ordering::SeqCst);
        self.accept(signed).await
    }

    async fn announce_aggregate_bonded(
        &self,
        signed: &SignedTransaction,
    ) -> Result<AnnounceAck, SubmissionError> {
        self.announce_bonded_calls.fetch_add(1, Ordering::SeqCst);
        self.accept(signed).await
    }
}

/// Mock reference resolver for testing.
///
/// Passes alias-free transactions through; can delay or fail per hash.
#[derive(Default)]
pub struct MockReferenceResolver {
    failures: RwLock<HashMap<Hash, ResolutionError>>,
    delays: RwLock<HashMap<Hash, Duration>>,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl MockReferenceResolver {
    /// Create a pass-through resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail resolution of `hash` with `error`.
    pub fn fail(&self, hash: Hash, error: ResolutionError) {
        self.failures.write().insert(hash, error);
    }

    /// Sleep for `delay` before resolving `hash`.
    pub fn delay(&self, hash: Hash, delay: Duration) {
        self.delays.write().insert(hash, delay);
    }

    /// Number of resolutions that started.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of resolutions that ran to completion.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReferenceResolver for MockReferenceResolver {
    async fn resolve_references(
        &self,
        transaction: Transaction,
    ) -> Result<ResolvedTransaction, ResolutionError> {
        self.started.fetch_add(1, Ordering::SeqCst);

        let hash = transaction.hash();
        let delay = hash.and_then(|h| self.delays.read().get(&h).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = hash.and_then(|h| self.failures.read().get(&h).cloned());
        let result = match failure {
            Some(error) => Err(error),
            None => ResolvedTransaction::try_from_transaction(transaction)
                .map_err(|_| ResolutionError::Receipts("mock resolver cannot resolve aliases".to_string())),
        };

        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}
