//! Container runtime seam.
//!
//! The orchestrator talks to containers only through [`ContainerRuntime`].
//! [`crate::docker::DockerRuntime`] drives the docker CLI; tests plug in
//! in-memory fakes.

mod error;

pub use error::RuntimeError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque reference to a started container (the container id for Docker).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a runtime needs to create and start one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub hostname: String,
    pub image: String,
    /// Container-internal ports, primary port first
    pub exposed_ports: Vec<u16>,
    /// Container-internal port -> leased host port
    pub port_bindings: BTreeMap<u16, u16>,
    pub command: Vec<String>,
}

/// Create, inspect and tear down containers.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create and start a container, returning its handle once it is running.
    async fn create_and_start(&self, spec: &ContainerSpec) -> Result<ContainerHandle, RuntimeError>;

    /// Network address other containers reach this container on.
    async fn inspect(&self, handle: &ContainerHandle) -> Result<String, RuntimeError>;

    /// Stop and remove a container. While starting a network the orchestrator
    /// only calls this for a container it could not inspect; running services
    /// are removed by explicit teardown.
    async fn stop_and_remove(&self, handle: &ContainerHandle) -> Result<(), RuntimeError>;
}
