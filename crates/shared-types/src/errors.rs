//! # Error Types
//!
//! Defines error types shared across crates.

use thiserror::Error;

/// Errors from parsing a hex transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashParseError {
    /// Input is not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes.
    #[error("Invalid hash length: got {got} bytes, expected 32")]
    InvalidLength { got: usize },
}
