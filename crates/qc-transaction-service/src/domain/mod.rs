//! # Domain Module
//!
//! Error taxonomy and the hash-lock announcement state machine.

pub mod errors;
pub mod flow;

pub use errors::*;
pub use flow::*;
