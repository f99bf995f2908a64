//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for reference resolution.

mod receipt_resolver;

pub use receipt_resolver::{InMemoryReceiptStore, ReceiptAliasResolver};
