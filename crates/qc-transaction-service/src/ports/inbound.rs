//! # Inbound Ports
//!
//! API trait defining what the Transaction Service can do.

use async_trait::async_trait;
use shared_types::entities::{Hash, ResolvedTransaction, SignedTransaction, Transaction};

use crate::domain::TransactionServiceError;

/// Transaction Service API - inbound port.
///
/// Every operation yields exactly one terminal value.
#[async_trait]
pub trait TransactionServiceApi: Send + Sync {
    /// Fetch the given transactions and resolve every alias they carry.
    ///
    /// Returns one resolved transaction per identifier, in no particular
    /// order, or the first error; never a partial list.
    async fn resolve_aliases(
        &self,
        ids: &[Hash],
    ) -> Result<Vec<ResolvedTransaction>, TransactionServiceError>;

    /// Announce a transaction and wait until it is confirmed.
    async fn announce(
        &self,
        signed: &SignedTransaction,
    ) -> Result<Transaction, TransactionServiceError>;

    /// Announce a bonded aggregate and wait until it reaches the partial
    /// cache.
    async fn announce_aggregate_bonded(
        &self,
        signed: &SignedTransaction,
    ) -> Result<Transaction, TransactionServiceError>;

    /// Announce a hash lock, wait for its confirmation, then announce the
    /// bonded aggregate it guarantees and wait until it is added.
    async fn announce_hash_lock_aggregate_bonded(
        &self,
        lock: &SignedTransaction,
        aggregate: &SignedTransaction,
    ) -> Result<Transaction, TransactionServiceError>;
}
