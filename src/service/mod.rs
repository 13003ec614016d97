//! Service identity and definition types.
//!
//! This module provides the [`ServiceDefinition`] trait the orchestrator consumes,
//! the shared identity/socket types, and [`TemplateService`], a definition driven
//! by a command template from the network config.
//!
//! # Example
//!
//! ```ignore
//! use testnet::service::{ServiceDefinition, ServiceIdentity};
//!
//! fn describe(definition: &dyn ServiceDefinition, identity: &ServiceIdentity) {
//!     println!("{} runs {} on port {}", identity.hostname, definition.image(), definition.primary_port());
//! }
//! ```

mod definition;
mod template;
mod types;

pub use definition::*;
pub use template::*;
pub use types::*;
