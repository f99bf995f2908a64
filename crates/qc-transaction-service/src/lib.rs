//! # QC Transaction Service
//!
//! Client-side coordination of ledger transactions.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Fetch transactions in one batch and resolve their namespace aliases
//!   concurrently, failing the whole batch on the first error
//! - Announce a signed transaction and wait for its confirmation (or its
//!   addition to the partial cache, for bonded aggregates)
//! - Announce a hash lock, wait for it, then announce the bonded aggregate
//!   it guarantees
//!
//! ## Outcomes
//!
//! | Operation | Success | Failure |
//! |-----------|---------|---------|
//! | `resolve_aliases` | every transaction resolved | first fetch or resolution error |
//! | `announce` | `Confirmed` for (signer, hash) | submission error or status error |
//! | `announce_aggregate_bonded` | `AggregateBondedAdded` for (signer, hash) | submission error or status error |
//! | `announce_hash_lock_aggregate_bonded` | aggregate added | first error; aggregate never sent if the lock failed |
//!
//! ## Module Structure
//!
//! ```text
//! qc-transaction-service/
//! ├── domain/          # Error taxonomy, hash-lock flow state machine
//! ├── ports/           # API trait (inbound) + gateway/resolver/receipts (outbound)
//! ├── application/     # TransactionService orchestrating everything
//! ├── adapters/        # Receipt-backed alias resolver
//! └── config.rs        # TransactionServiceConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{InMemoryReceiptStore, ReceiptAliasResolver};
pub use application::TransactionService;
pub use config::TransactionServiceConfig;
pub use domain::{
    ConfirmationError, FetchError, HashLockFlow, HashLockPhase, ResolutionError,
    SubmissionError, TransactionServiceError,
};
pub use ports::{
    AnnounceAck, AnnounceReaction, MockReferenceResolver, MockTransactionGateway, ReceiptLookup,
    ReferenceResolver, TransactionGateway, TransactionServiceApi,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
