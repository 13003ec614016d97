use super::NetworkOrchestrator;
use crate::error::{Error, Result};
use crate::port::PortAllocator;
use crate::runtime::ContainerRuntime;
use std::sync::Arc;

/// Default hostname prefix; service `n` gets hostname `service-n`.
pub const DEFAULT_HOSTNAME_PREFIX: &str = "service";

/// Builder for constructing a [`NetworkOrchestrator`] with a fluent API.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use testnet::docker::DockerRuntime;
/// use testnet::{NetworkOrchestrator, PortAllocator};
///
/// # fn example() -> Result<(), testnet::Error> {
/// let orchestrator = NetworkOrchestrator::builder()
///     .runtime(Arc::new(DockerRuntime::new("local")))
///     .port_allocator(Arc::new(PortAllocator::new(20000, 20999)?))
///     .hostname_prefix("node")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct OrchestratorBuilder {
    runtime: Option<Arc<dyn ContainerRuntime>>,
    ports: Option<Arc<PortAllocator>>,
    hostname_prefix: Option<String>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the container runtime.
    ///
    /// This is required to build the orchestrator.
    pub fn runtime(mut self, runtime: Arc<dyn ContainerRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Set the host port allocator. Share one allocator between orchestrators
    /// that run networks side by side.
    ///
    /// This is required to build the orchestrator.
    pub fn port_allocator(mut self, ports: Arc<PortAllocator>) -> Self {
        self.ports = Some(ports);
        self
    }

    /// Set the prefix of generated hostnames.
    ///
    /// If not set, defaults to [`DEFAULT_HOSTNAME_PREFIX`].
    pub fn hostname_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.hostname_prefix = Some(prefix.into());
        self
    }

    /// Build the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the runtime or the port allocator is
    /// not set, or the hostname prefix is empty.
    pub fn build(self) -> Result<NetworkOrchestrator> {
        let runtime = self
            .runtime
            .ok_or_else(|| Error::Validation("container runtime is required".to_string()))?;
        let ports = self
            .ports
            .ok_or_else(|| Error::Validation("port allocator is required".to_string()))?;

        let prefix = self
            .hostname_prefix
            .unwrap_or_else(|| DEFAULT_HOSTNAME_PREFIX.to_string());
        if prefix.trim().is_empty() {
            return Err(Error::Validation(
                "hostname prefix must not be empty".to_string(),
            ));
        }

        Ok(NetworkOrchestrator::new(runtime, ports, prefix))
    }
}
