//! # Shared Types Crate
//!
//! This crate contains the ledger entities used by every crate of the
//! transaction service: hashes and addresses, transactions with their
//! unresolved references, signed payloads, status errors and receipt
//! resolution statements.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Resolved by Construction**: A `ResolvedTransaction` can only be built
//!   from a transaction without aliases.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
