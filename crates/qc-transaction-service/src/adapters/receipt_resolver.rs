//! # Receipt Alias Resolver
//!
//! Resolves namespace aliases through the resolution receipts of the block
//! a transaction was included in.
//!
//! A namespace can be re-linked inside a block, so the value that applies
//! to a transaction is the latest resolution whose source position is not
//! after the transaction's own position.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::entities::{
    ReceiptSource, ResolvedTransaction, Statement, Transaction, TransactionBody,
    UnresolvedAddress, UnresolvedMosaic, UnresolvedMosaicId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::domain::ResolutionError;
use crate::ports::{ReceiptLookup, ReferenceResolver};

/// Resolves aliases from block receipts.
pub struct ReceiptAliasResolver<S: ReceiptLookup> {
    receipts: Arc<S>,
}

impl<S: ReceiptLookup> ReceiptAliasResolver<S> {
    /// Create a resolver reading receipts from `receipts`.
    pub fn new(receipts: Arc<S>) -> Self {
        Self { receipts }
    }
}

#[async_trait]
impl<S: ReceiptLookup> ReferenceResolver for ReceiptAliasResolver<S> {
    async fn resolve_references(
        &self,
        transaction: Transaction,
    ) -> Result<ResolvedTransaction, ResolutionError> {
        let transaction = match ResolvedTransaction::try_from_transaction(transaction) {
            Ok(resolved) => return Ok(resolved),
            Err(transaction) => transaction,
        };

        let info = transaction
            .info
            .ok_or(ResolutionError::MissingTransactionInfo)?;
        let position = ReceiptSource::top_level(info.index)
            .ok_or_else(|| out_of_range(format!("transaction index {}", info.index)))?;
        let statement = self.receipts.block_statement(info.height).await?;

        let context = BlockContext {
            statement: &statement,
            height: info.height,
            index: info.index,
        };
        let resolved = context.transaction(transaction, position)?;

        debug!(height = info.height, index = info.index, "Aliases resolved from receipts");
        ResolvedTransaction::try_from_transaction(resolved).map_err(|_| {
            ResolutionError::Receipts("aliases left after resolution".to_string())
        })
    }
}

fn out_of_range(what: String) -> ResolutionError {
    ResolutionError::Receipts(format!("{what} has no receipt position"))
}

/// Receipts of one block, and where the top-level transaction sits in it.
struct BlockContext<'a> {
    statement: &'a Statement,
    height: u64,
    index: u32,
}

impl BlockContext<'_> {
    fn transaction(
        &self,
        mut transaction: Transaction,
        position: ReceiptSource,
    ) -> Result<Transaction, ResolutionError> {
        transaction.body = match transaction.body {
            TransactionBody::Transfer {
                recipient,
                mosaics,
                message,
            } => TransactionBody::Transfer {
                recipient: self.address(recipient, position)?,
                mosaics: mosaics
                    .into_iter()
                    .map(|mosaic| self.mosaic(mosaic, position))
                    .collect::<Result<_, _>>()?,
                message,
            },
            TransactionBody::HashLock {
                mosaic,
                duration,
                aggregate_hash,
            } => TransactionBody::HashLock {
                mosaic: self.mosaic(mosaic, position)?,
                duration,
                aggregate_hash,
            },
            TransactionBody::Aggregate {
                kind,
                inner,
                cosignatures,
            } => TransactionBody::Aggregate {
                kind,
                inner: inner
                    .into_iter()
                    .enumerate()
                    .map(|(i, embedded)| {
                        let position = u32::try_from(i)
                            .ok()
                            .and_then(|inner| ReceiptSource::embedded(self.index, inner))
                            .ok_or_else(|| out_of_range(format!("inner index {i}")))?;
                        self.transaction(embedded, position)
                    })
                    .collect::<Result<_, _>>()?,
                cosignatures,
            },
        };
        Ok(transaction)
    }

    fn address(
        &self,
        address: UnresolvedAddress,
        position: ReceiptSource,
    ) -> Result<UnresolvedAddress, ResolutionError> {
        let Some(namespace) = address.alias() else {
            return Ok(address);
        };
        self.statement
            .resolve_address(namespace, position)
            .map(UnresolvedAddress::Address)
            .ok_or(ResolutionError::UnresolvedAlias {
                namespace,
                height: self.height,
            })
    }

    fn mosaic(
        &self,
        mosaic: UnresolvedMosaic,
        position: ReceiptSource,
    ) -> Result<UnresolvedMosaic, ResolutionError> {
        let Some(namespace) = mosaic.id.alias() else {
            return Ok(mosaic);
        };
        let id = self
            .statement
            .resolve_mosaic(namespace, position)
            .ok_or(ResolutionError::UnresolvedAlias {
                namespace,
                height: self.height,
            })?;
        Ok(UnresolvedMosaic {
            id: UnresolvedMosaicId::Mosaic(id),
            amount: mosaic.amount,
        })
    }
}

/// Block statements held in memory, keyed by height.
#[derive(Default)]
pub struct InMemoryReceiptStore {
    statements: RwLock<HashMap<u64, Statement>>,
    lookups: AtomicUsize,
}

impl InMemoryReceiptStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `statement`, replacing any statement at the same height.
    pub fn insert(&self, statement: Statement) {
        self.statements.write().insert(statement.height, statement);
    }

    /// Number of lookups served.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReceiptLookup for InMemoryReceiptStore {
    async fn block_statement(&self, height: u64) -> Result<Statement, ResolutionError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.statements
            .read()
            .get(&height)
            .cloned()
            .ok_or_else(|| ResolutionError::Receipts(format!("no statement at height {height}")))
    }
}
