//! Configuration parsing and types.
//!
//! - `types` - Config structure (`NetworkConfig`, `NetworkSettings`, `ServiceConfig`)
//! - `duration` - Human-readable durations
//! - `parser` - YAML config discovery and parsing
//! - `validation` - Config validation
//! - `graph` - Turning a config into a `ServiceGraph`

mod duration;
mod graph;
mod parser;
mod types;
mod validation;

pub use duration::*;
pub use graph::*;
pub use parser::*;
pub use types::*;
