//! # Transaction Service Configuration
//!
//! Configuration for the Transaction Service.

use serde::{Deserialize, Serialize};
use std::env;

/// Default bound on concurrent alias resolutions in one batch.
pub const DEFAULT_MAX_CONCURRENT_RESOLUTIONS: usize = 16;

/// Transaction service configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionServiceConfig {
    /// Maximum alias resolutions in flight per `resolve_aliases` call.
    /// Zero means one per transaction in the batch.
    pub max_concurrent_resolutions: usize,

    /// Buffer size of the confirmation listener channel.
    pub listener_capacity: usize,
}

impl Default for TransactionServiceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_resolutions: DEFAULT_MAX_CONCURRENT_RESOLUTIONS,
            listener_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl TransactionServiceConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            max_concurrent_resolutions: 4,
            listener_capacity: 64,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_TX_MAX_CONCURRENT_RESOLUTIONS`: resolution bound (default: 16, 0 = unbounded)
    /// - `QC_TX_LISTENER_CAPACITY`: listener buffer size (default: 1000)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_concurrent_resolutions: env::var("QC_TX_MAX_CONCURRENT_RESOLUTIONS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_concurrent_resolutions),

            listener_capacity: env::var("QC_TX_LISTENER_CAPACITY")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.listener_capacity),
        }
    }

    /// Effective concurrency for a batch of `batch_len` transactions.
    ///
    /// Never zero, never more than the batch.
    #[must_use]
    pub fn resolution_concurrency(&self, batch_len: usize) -> usize {
        let batch_len = batch_len.max(1);
        match self.max_concurrent_resolutions {
            0 => batch_len,
            limit => limit.min(batch_len),
        }
    }
}
