//! # Hash-Lock Flow
//!
//! State machine for announcing a bonded aggregate behind a hash lock.
//!
//! ```text
//! Validate ─▶ SubmitLock ─▶ AwaitLockConfirm ─▶ SubmitAggregate ─▶ AwaitAggregateAdded ─▶ Done
//!    │            │                │                   │                    │
//!    └────────────┴────────────────┴───────────────────┴────────────────────┴──▶ Failed
//! ```
//!
//! Both payloads are checked in `Validate`, before anything reaches the
//! node.
//!
//! The aggregate is never submitted unless the lock reached `Confirmed`.
//! A failure after the lock confirmed leaves the lock on the ledger; no
//! compensating transaction is sent.

/// Phases of the hash-lock flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashLockPhase {
    /// Checking the lock and aggregate types.
    Validate,
    /// Announcing the lock transaction.
    SubmitLock,
    /// Waiting for the lock to be confirmed.
    AwaitLockConfirm,
    /// Announcing the bonded aggregate.
    SubmitAggregate,
    /// Waiting for the aggregate to reach the partial cache.
    AwaitAggregateAdded,
    /// Aggregate added.
    Done,
    /// Stopped on the first error.
    Failed,
}

impl HashLockPhase {
    /// The phase that follows a successful step, or `None` if terminal.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Validate => Some(Self::SubmitLock),
            Self::SubmitLock => Some(Self::AwaitLockConfirm),
            Self::AwaitLockConfirm => Some(Self::SubmitAggregate),
            Self::SubmitAggregate => Some(Self::AwaitAggregateAdded),
            Self::AwaitAggregateAdded => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// True for `Done` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Progress of one hash-lock announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashLockFlow {
    phase: HashLockPhase,
    failed_at: Option<HashLockPhase>,
}

impl HashLockFlow {
    /// Start a flow in `Validate`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: HashLockPhase::Validate,
            failed_at: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> HashLockPhase {
        self.phase
    }

    /// Phase the flow was in when it failed.
    #[must_use]
    pub fn failed_at(&self) -> Option<HashLockPhase> {
        self.failed_at
    }

    /// Move to the next phase after a successful step.
    ///
    /// Terminal flows do not move; the returned phase is the one the flow
    /// is in afterwards.
    pub fn advance(&mut self) -> HashLockPhase {
        if let Some(next) = self.phase.next() {
            self.phase = next;
        }
        self.phase
    }

    /// Record a failure in the current phase and hand the error back, so
    /// it can be used inside `map_err`.
    pub fn fail<E>(&mut self, error: E) -> E {
        if !self.phase.is_terminal() {
            self.failed_at = Some(self.phase);
            self.phase = HashLockPhase::Failed;
        }
        error
    }
}

impl Default for HashLockFlow {
    fn default() -> Self {
        Self::new()
    }
}
