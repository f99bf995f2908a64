//! # Domain Errors
//!
//! Error types for the Transaction Service.
//!
//! The taxonomy separates where a failure happened: reading transactions
//! from the node, resolving their aliases, handing a payload to the node,
//! or the ledger rejecting it afterwards.

use shared_types::entities::{to_hex, Hash, NamespaceId, TransactionKind, TransactionStatus};
use thiserror::Error;

/// Batch lookup of transactions failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The node does not know one of the requested transactions.
    #[error("Unknown transaction: {}", to_hex(.0))]
    UnknownTransaction(Hash),

    /// The request itself failed, or the response was malformed.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Reference resolution of a single transaction failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No receipt resolves the alias for the transaction's position.
    #[error("Namespace {:016X} has no resolution at height {height}", .namespace.0)]
    UnresolvedAlias {
        /// The alias.
        namespace: NamespaceId,
        /// Height of the block searched.
        height: u64,
    },

    /// The transaction carries aliases but no chain position to look
    /// receipts up with.
    #[error("Transaction has no chain info")]
    MissingTransactionInfo,

    /// The receipt lookup failed.
    #[error("Receipt lookup failed: {0}")]
    Receipts(String),
}

/// The node refused a signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The node answered and rejected the payload.
    #[error("Transaction {} rejected by node: {reason}", to_hex(.hash))]
    Rejected {
        /// Announced hash.
        hash: Hash,
        /// Node message.
        reason: String,
    },

    /// The request did not complete.
    #[error("Transport error announcing {}: {reason}", to_hex(.hash))]
    Transport {
        /// Announced hash.
        hash: Hash,
        /// Transport message.
        reason: String,
    },

    /// The payload is not the transaction type this operation announces.
    #[error("Transaction {} is {actual:?}, expected {expected:?}", to_hex(.hash))]
    InvalidKind {
        /// Offending hash.
        hash: Hash,
        /// Required type.
        expected: TransactionKind,
        /// Actual type.
        actual: TransactionKind,
    },
}

impl SubmissionError {
    /// Hash of the transaction that could not be submitted.
    #[must_use]
    pub fn hash(&self) -> Hash {
        match self {
            Self::Rejected { hash, .. }
            | Self::Transport { hash, .. }
            | Self::InvalidKind { hash, .. } => *hash,
        }
    }
}

/// The ledger rejected an accepted transaction, or the wait could not
/// complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmationError {
    /// A status error was pushed for the transaction.
    #[error("Transaction {} rejected by ledger: {}", to_hex(.hash), .status.code)]
    Rejected {
        /// Rejected hash.
        hash: Hash,
        /// Status pushed by the node.
        status: TransactionStatus,
    },

    /// The listener shut down before any outcome arrived.
    #[error("Listener closed while waiting for {}", to_hex(.hash))]
    ListenerClosed {
        /// Awaited hash.
        hash: Hash,
    },

    /// The listener fell behind and dropped events; the outcome may have
    /// been among them.
    #[error("Listener dropped {missed} events while waiting for {}", to_hex(.hash))]
    ListenerLagged {
        /// Awaited hash.
        hash: Hash,
        /// Events dropped.
        missed: u64,
    },
}

impl ConfirmationError {
    /// Hash of the transaction that was being awaited.
    #[must_use]
    pub fn hash(&self) -> Hash {
        match self {
            Self::Rejected { hash, .. }
            | Self::ListenerClosed { hash }
            | Self::ListenerLagged { hash, .. } => *hash,
        }
    }
}

/// Transaction Service error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionServiceError {
    /// Batch fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Alias resolution failed.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Announcement failed.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Ledger-level rejection or interrupted wait.
    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),
}

impl TransactionServiceError {
    /// Hash of the transaction the error is about, when one is known.
    ///
    /// In a hash-lock flow this tells whether the lock or the aggregate
    /// failed.
    #[must_use]
    pub fn transaction_hash(&self) -> Option<Hash> {
        match self {
            Self::Fetch(FetchError::UnknownTransaction(hash)) => Some(*hash),
            Self::Fetch(FetchError::Transport(_)) | Self::Resolution(_) => None,
            Self::Submission(e) => Some(e.hash()),
            Self::Confirmation(e) => Some(e.hash()),
        }
    }
}
