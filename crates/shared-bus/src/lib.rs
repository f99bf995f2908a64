//! # Shared Bus - Confirmation Listener
//!
//! Multiplexes ledger lifecycle notifications (confirmed, aggregate bonded
//! added, status errors) from one node connection to any number of
//! correlated waiters.
//!
//! ## Correlation Pattern
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Node socket  │                    │ Announcement │
//! │              │    publish()       │   waiter     │
//! │              │ ──────┐            │ (addr, hash) │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe(filter)
//! ```
//!
//! ## Guarantees
//!
//! - **No Cross-Delivery:** each subscription only yields events matching
//!   its own (address, hash, kind) filter
//! - **No Suppression:** broadcast semantics; filtering an event out never
//!   hides it from another waiter
//! - **Release on Drop:** dropping a `Subscription` releases its correlation

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventKind, EventPayload, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
