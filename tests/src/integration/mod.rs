//! # Integration Tests
//!
//! The transaction service wired to the real confirmation listener and a
//! simulated node.


mod announce_flows;
mod resolution_flows;
