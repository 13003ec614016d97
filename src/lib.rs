//! # testnet
//!
//! Orchestrates a set of inter-dependent containerized JSON-RPC services into a
//! running test network.
//!
//! ## Features
//!
//! - **Dependency Graph**: Services are registered against already-registered
//!   dependencies, so registration order is always a valid start order
//! - **Port Leasing**: Host ports are leased from a bounded range under a mutex,
//!   so concurrent orchestrations never share a port
//! - **Endpoint Wiring**: Each service's start command is rendered with the
//!   endpoints and liveness probes of its already-running dependencies
//! - **Partial Failure Visibility**: A failed start returns every container that
//!   did come up, so the caller decides how to clean up
//! - **Readiness**: Terminal services are polled with their JSON-RPC liveness probe
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use testnet::{NetworkOrchestrator, Parser, PortAllocator};
//! use testnet::docker::DockerRuntime;
//!
//! # async fn example() -> Result<(), testnet::Error> {
//! let config = Parser::new().load_config("testnet.yaml")?;
//! let named = config.build_graph()?;
//!
//! let orchestrator = NetworkOrchestrator::builder()
//!     .runtime(Arc::new(DockerRuntime::from_settings(&config.network)))
//!     .port_allocator(Arc::new(PortAllocator::new(
//!         config.network.port_range.start,
//!         config.network.port_range.end,
//!     )?))
//!     .hostname_prefix(config.network.hostname_prefix.clone())
//!     .build()?;
//!
//! let network = orchestrator.create_and_run(&named.graph).await?;
//! for service in network.iter() {
//!     println!("{} -> {}", service.hostname, service.endpoint());
//! }
//!
//! orchestrator.teardown(network).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! - `create_and_run` starts one service at a time, in start order
//! - A built [`ServiceGraph`] is immutable and can be shared freely
//! - [`PortAllocator`] is the only state shared between orchestrations

pub mod config;
pub mod dependency;
pub mod docker;
pub mod error;
pub mod healthcheck;
pub mod orchestrator;
pub mod port;
pub mod runtime;
pub mod service;

// Re-export commonly used types
pub use config::{NamedGraph, NetworkConfig, Parser};
pub use dependency::{ServiceGraph, ServiceGraphBuilder};
pub use error::{Error, Result};
pub use orchestrator::{NetworkOrchestrator, OrchestratorBuilder, RunningNetwork, RunningService};
pub use port::PortAllocator;
pub use runtime::{ContainerHandle, ContainerRuntime, ContainerSpec, RuntimeError};
pub use service::{Endpoint, LivenessProbe, ServiceDefinition, ServiceId, ServiceIdentity};
