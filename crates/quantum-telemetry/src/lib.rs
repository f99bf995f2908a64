//! # Quantum Telemetry
//!
//! Structured logging for the transaction service crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quantum_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config).expect("Failed to init logging");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QC_SERVICE_NAME` | `qc-transaction-service` | Service name in logs |
//! | `QC_LOG_LEVEL` | `info` | Log level filter |
//! | `QC_JSON_LOGS` | `false` | JSON output |
//! | `QC_NETWORK` | `testnet` | Network name |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    /// The log filter could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
