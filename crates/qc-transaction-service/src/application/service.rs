//! # Transaction Service
//!
//! Application service orchestrating alias resolution and confirmed
//! announcement.
//!
//! Every announcement subscribes to its correlation before the payload is
//! handed to the node, so a confirmation pushed immediately after
//! acceptance is never missed. The subscription is dropped on every exit
//! path, which releases the correlation on the listener.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use shared_bus::{
    EventFilter, EventKind, EventPayload, EventSubscriber, Subscription, SubscriptionError,
};
use shared_types::entities::{
    to_hex, Hash, ResolvedTransaction, SignedTransaction, Transaction, TransactionKind,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::TransactionServiceConfig;
use crate::domain::{
    ConfirmationError, FetchError, HashLockFlow, SubmissionError, TransactionServiceError,
};
use crate::ports::{ReferenceResolver, TransactionGateway, TransactionServiceApi};

/// Which node endpoint a payload goes to, and which event completes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnnounceMode {
    /// Plain announcement, completed by `Confirmed`.
    Standard,
    /// Partial announcement, completed by `AggregateBondedAdded`.
    AggregateBonded,
}

impl AnnounceMode {
    fn awaited(self) -> EventKind {
        match self {
            Self::Standard => EventKind::Confirmed,
            Self::AggregateBonded => EventKind::AggregateBondedAdded,
        }
    }
}

/// Transaction Service - orchestrates resolution and announcement.
pub struct TransactionService<G, R, L>
where
    G: TransactionGateway,
    R: ReferenceResolver,
    L: EventSubscriber,
{
    /// Configuration.
    config: TransactionServiceConfig,
    /// Node transport.
    gateway: Arc<G>,
    /// Per-transaction alias resolution.
    resolver: Arc<R>,
    /// Confirmation listener.
    listener: Arc<L>,
}

impl<G, R, L> TransactionService<G, R, L>
where
    G: TransactionGateway,
    R: ReferenceResolver,
    L: EventSubscriber,
{
    /// Create a new transaction service.
    pub fn new(
        config: TransactionServiceConfig,
        gateway: Arc<G>,
        resolver: Arc<R>,
        listener: Arc<L>,
    ) -> Self {
        Self {
            config,
            gateway,
            resolver,
            listener,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &TransactionServiceConfig {
        &self.config
    }

    /// Internal: open the correlation for `signed`, accepting the awaited
    /// kind and status errors.
    fn correlate(&self, signed: &SignedTransaction, mode: AnnounceMode) -> Subscription {
        let filter = EventFilter::correlation(
            signed.signer_address(),
            signed.hash,
            vec![mode.awaited(), EventKind::Error],
        );
        let subscription = self.listener.subscribe(filter);
        debug!(
            hash = %to_hex(&signed.hash),
            subscription_id = %subscription.id(),
            "Correlation opened"
        );
        subscription
    }

    /// Internal: hand the payload to the node.
    async fn submit(
        &self,
        signed: &SignedTransaction,
        mode: AnnounceMode,
    ) -> Result<(), SubmissionError> {
        let ack = match mode {
            AnnounceMode::Standard => self.gateway.announce(signed).await?,
            AnnounceMode::AggregateBonded => self.gateway.announce_aggregate_bonded(signed).await?,
        };
        debug!(
            hash = %to_hex(&signed.hash),
            message = %ack.message,
            "Payload accepted by node"
        );
        Ok(())
    }

    /// Internal: wait for the first outcome on a correlation.
    ///
    /// A lagged listener ends the wait: the dropped events may have held
    /// the outcome.
    async fn await_outcome(
        mut subscription: Subscription,
        hash: Hash,
    ) -> Result<Transaction, ConfirmationError> {
        match subscription.recv().await {
            Ok(event) => match event.payload {
                EventPayload::Confirmed(transaction)
                | EventPayload::AggregateBondedAdded(transaction) => Ok(transaction),
                EventPayload::Error(status) => Err(ConfirmationError::Rejected { hash, status }),
            },
            Err(SubscriptionError::Closed) => Err(ConfirmationError::ListenerClosed { hash }),
            Err(SubscriptionError::Lagged(missed)) => {
                Err(ConfirmationError::ListenerLagged { hash, missed })
            }
        }
    }

    /// Internal: subscribe, submit, wait.
    async fn announce_and_wait(
        &self,
        signed: &SignedTransaction,
        mode: AnnounceMode,
    ) -> Result<Transaction, TransactionServiceError> {
        let subscription = self.correlate(signed, mode);
        self.submit(signed, mode).await?;
        let transaction = Self::await_outcome(subscription, signed.hash).await?;
        Ok(transaction)
    }

    /// Internal: check that a payload is the kind an operation announces.
    fn expect_kind(
        signed: &SignedTransaction,
        expected: TransactionKind,
    ) -> Result<(), SubmissionError> {
        if signed.kind == expected {
            Ok(())
        } else {
            Err(SubmissionError::InvalidKind {
                hash: signed.hash,
                expected,
                actual: signed.kind,
            })
        }
    }

    /// Internal: run the hash-lock flow to completion or first failure.
    async fn run_hash_lock(
        &self,
        flow: &mut HashLockFlow,
        lock: &SignedTransaction,
        aggregate: &SignedTransaction,
    ) -> Result<Transaction, TransactionServiceError> {
        Self::expect_kind(lock, TransactionKind::HashLock).map_err(|e| flow.fail(e))?;
        Self::expect_kind(aggregate, TransactionKind::AggregateBonded)
            .map_err(|e| flow.fail(e))?;
        flow.advance();

        let lock_subscription = self.correlate(lock, AnnounceMode::Standard);
        self.submit(lock, AnnounceMode::Standard)
            .await
            .map_err(|e| flow.fail(e))?;
        flow.advance();

        Self::await_outcome(lock_subscription, lock.hash)
            .await
            .map_err(|e| flow.fail(e))?;
        debug!(lock = %to_hex(&lock.hash), "Hash lock confirmed");
        flow.advance();

        let aggregate_subscription = self.correlate(aggregate, AnnounceMode::AggregateBonded);
        self.submit(aggregate, AnnounceMode::AggregateBonded)
            .await
            .map_err(|e| flow.fail(e))?;
        flow.advance();

        let transaction = Self::await_outcome(aggregate_subscription, aggregate.hash)
            .await
            .map_err(|e| flow.fail(e))?;
        flow.advance();

        Ok(transaction)
    }

    /// Internal: a fetch must return exactly the requested transactions.
    fn check_fetched(ids: &[Hash], fetched: &[Transaction]) -> Result<(), FetchError> {
        let returned: HashSet<Hash> = fetched.iter().filter_map(Transaction::hash).collect();
        if let Some(missing) = ids.iter().find(|id| !returned.contains(*id)) {
            return Err(FetchError::UnknownTransaction(*missing));
        }
        if fetched.len() != ids.len() {
            return Err(FetchError::Transport(format!(
                "expected {} transactions, node returned {}",
                ids.len(),
                fetched.len()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<G, R, L> TransactionServiceApi for TransactionService<G, R, L>
where
    G: TransactionGateway,
    R: ReferenceResolver,
    L: EventSubscriber,
{
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn resolve_aliases(
        &self,
        ids: &[Hash],
    ) -> Result<Vec<ResolvedTransaction>, TransactionServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = self.gateway.fetch_transactions(ids).await?;
        Self::check_fetched(ids, &fetched)?;

        let limit = self.config.resolution_concurrency(fetched.len());
        debug!(limit, "Resolving aliases");

        // First failure drops the in-flight resolutions
        let resolved: Vec<ResolvedTransaction> = stream::iter(fetched)
            .map(|transaction| self.resolver.resolve_references(transaction))
            .buffer_unordered(limit)
            .try_collect()
            .await
            .map_err(|e| {
                warn!(error = %e, "Alias resolution failed");
                e
            })?;

        info!(resolved = resolved.len(), "Aliases resolved");
        Ok(resolved)
    }

    #[instrument(skip(self, signed), fields(hash = %to_hex(&signed.hash)))]
    async fn announce(
        &self,
        signed: &SignedTransaction,
    ) -> Result<Transaction, TransactionServiceError> {
        match self.announce_and_wait(signed, AnnounceMode::Standard).await {
            Ok(transaction) => {
                info!("Transaction confirmed");
                Ok(transaction)
            }
            Err(e) => {
                warn!(error = %e, "Announcement failed");
                Err(e)
            }
        }
    }

    #[instrument(skip(self, signed), fields(hash = %to_hex(&signed.hash)))]
    async fn announce_aggregate_bonded(
        &self,
        signed: &SignedTransaction,
    ) -> Result<Transaction, TransactionServiceError> {
        match self.announce_and_wait(signed, AnnounceMode::AggregateBonded).await {
            Ok(transaction) => {
                info!("Aggregate bonded added");
                Ok(transaction)
            }
            Err(e) => {
                warn!(error = %e, "Aggregate bonded announcement failed");
                Err(e)
            }
        }
    }

    #[instrument(
        skip(self, lock, aggregate),
        fields(lock = %to_hex(&lock.hash), aggregate = %to_hex(&aggregate.hash))
    )]
    async fn announce_hash_lock_aggregate_bonded(
        &self,
        lock: &SignedTransaction,
        aggregate: &SignedTransaction,
    ) -> Result<Transaction, TransactionServiceError> {
        let mut flow = HashLockFlow::new();

        match self.run_hash_lock(&mut flow, lock, aggregate).await {
            Ok(transaction) => {
                info!("Hash lock confirmed and aggregate bonded added");
                Ok(transaction)
            }
            Err(e) => {
                warn!(phase = ?flow.failed_at(), error = %e, "Hash lock flow failed");
                Err(e)
            }
        }
    }
}
