//! Readiness checks for running networks.
//!
//! The orchestrator only forwards liveness probes; this module is the one
//! place that sends them.

mod checker;
mod jsonrpc;
mod readiness;

pub use checker::*;
pub use jsonrpc::*;
pub use readiness::*;
