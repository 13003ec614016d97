mod builder;
mod core;
mod network;

pub use builder::{OrchestratorBuilder, DEFAULT_HOSTNAME_PREFIX};
pub use core::*;
pub use network::*;
