use super::{OrchestratorBuilder, RunningNetwork, RunningService};
use crate::dependency::ServiceGraph;
use crate::error::{Error, Result};
use crate::port::PortAllocator;
use crate::runtime::{ContainerRuntime, ContainerSpec};
use crate::service::{Endpoint, LivenessProbe, ServiceDefinition, ServiceId, ServiceIdentity};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Instrument;

/// Starts the services of a [`ServiceGraph`] as containers.
///
/// Services are started strictly one at a time in the graph's start order.
/// Each service is launched only after every one of its dependencies has a
/// running container, and its start command sees the endpoint and liveness
/// probe of each direct dependency.
///
/// The orchestrator holds no per-network state, so one instance can start any
/// number of graphs. Host ports come from the shared [`PortAllocator`].
pub struct NetworkOrchestrator {
    runtime: Arc<dyn ContainerRuntime>,
    ports: Arc<PortAllocator>,
    hostname_prefix: String,
}

impl NetworkOrchestrator {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        ports: Arc<PortAllocator>,
        hostname_prefix: impl Into<String>,
    ) -> Self {
        Self {
            runtime,
            ports,
            hostname_prefix: hostname_prefix.into(),
        }
    }

    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Hostname assigned to a service: `<prefix>-<id>`.
    pub fn hostname_for(&self, id: ServiceId) -> String {
        format!("{}-{}", self.hostname_prefix, id)
    }

    pub fn port_allocator(&self) -> &Arc<PortAllocator> {
        &self.ports
    }

    /// Start every service of `graph` and return the running network.
    ///
    /// # Errors
    ///
    /// The first failing service aborts the run with
    /// [`Error::ServiceStartFailed`], which carries the failing id, the
    /// underlying cause and the network of services already started. Those
    /// containers keep running; pass the network to [`teardown`](Self::teardown)
    /// to remove them. Ports leased for the failing service are released.
    pub async fn create_and_run(&self, graph: &ServiceGraph) -> Result<RunningNetwork> {
        let mut network = RunningNetwork::new(graph.terminal_service_ids().clone());
        let probes: BTreeMap<ServiceId, LivenessProbe> = graph
            .definitions()
            .map(|(id, definition)| (id, definition.liveness_probe()))
            .collect();
        tracing::info!("Starting {} service(s)", graph.len());

        for &id in graph.start_order() {
            let started = self
                .start_service(graph, id, &probes, &network)
                .instrument(tracing::info_span!("start_service", service.id = %id))
                .await;

            match started {
                Ok(service) => {
                    tracing::info!(
                        "Service {} running as {} at {} (ports {:?})",
                        id,
                        service.hostname,
                        service.address,
                        service.port_bindings
                    );
                    network.insert(service);
                }
                Err(cause) => {
                    tracing::error!(
                        "Service {} failed to start after {} running service(s): {}",
                        id,
                        network.len(),
                        cause
                    );
                    return Err(Error::ServiceStartFailed {
                        service: id,
                        network: Box::new(network),
                        cause: Box::new(cause),
                    });
                }
            }
        }

        Ok(network)
    }

    /// Lease host ports for one service and launch it. Leases are returned to
    /// the allocator if the launch fails.
    async fn start_service(
        &self,
        graph: &ServiceGraph,
        id: ServiceId,
        probes: &BTreeMap<ServiceId, LivenessProbe>,
        network: &RunningNetwork,
    ) -> Result<RunningService> {
        let definition = graph.definition(id).ok_or(Error::ServiceNotFound(id))?;
        let probe = probes.get(&id).ok_or(Error::ServiceNotFound(id))?;

        let mut dependencies: BTreeMap<Endpoint, LivenessProbe> = BTreeMap::new();
        for &dependency in graph.dependencies(id).into_iter().flatten() {
            let running = network.get(dependency)?;
            dependencies.insert(running.endpoint(), running.liveness_probe.clone());
        }

        let container_ports = definition.container_ports();
        let host_ports = self.ports.lease_many(container_ports.len())?;
        let port_bindings: BTreeMap<u16, u16> = container_ports
            .iter()
            .copied()
            .zip(host_ports.iter().copied())
            .collect();

        let identity = ServiceIdentity {
            id,
            hostname: self.hostname_for(id),
        };

        let launched = self
            .launch(
                definition.as_ref(),
                &identity,
                probe,
                &container_ports,
                port_bindings,
                &dependencies,
            )
            .await;

        if launched.is_err() {
            for port in host_ports {
                self.ports.release(port);
            }
        }
        launched
    }

    async fn launch(
        &self,
        definition: &dyn ServiceDefinition,
        identity: &ServiceIdentity,
        probe: &LivenessProbe,
        container_ports: &[u16],
        port_bindings: BTreeMap<u16, u16>,
        dependencies: &BTreeMap<Endpoint, LivenessProbe>,
    ) -> Result<RunningService> {
        let id = identity.id;
        let command = definition.render_start_command(identity, dependencies)?;

        let spec = ContainerSpec {
            hostname: identity.hostname.clone(),
            image: definition.image().to_string(),
            exposed_ports: container_ports.to_vec(),
            port_bindings,
            command,
        };

        let handle = self
            .runtime
            .create_and_start(&spec)
            .await
            .map_err(|source| Error::ContainerLaunchFailed {
                service: id,
                source,
            })?;

        let address = match self.runtime.inspect(&handle).await {
            Ok(address) => address,
            Err(source) => {
                // The container exists but nothing could reach it
                if let Err(e) = self.runtime.stop_and_remove(&handle).await {
                    tracing::warn!("Failed to remove uninspectable container {}: {}", handle, e);
                }
                return Err(Error::ContainerInspectFailed {
                    service: id,
                    source,
                });
            }
        };

        Ok(RunningService {
            id,
            hostname: spec.hostname,
            address,
            primary_port: definition.primary_port(),
            port_bindings: spec.port_bindings,
            liveness_probe: probe.clone(),
            handle,
        })
    }

    /// Stop and remove every container of `network` in reverse start order and
    /// release the host ports of each container that was removed.
    ///
    /// Teardown continues past individual failures; a single failure is
    /// returned as is, several as [`Error::Multiple`]. A container that could
    /// not be removed may still be bound to its host ports, so those stay
    /// leased and are listed on its [`Error::ContainerTeardownFailed`]. Release
    /// them through [`port_allocator`](Self::port_allocator) once the container
    /// is gone.
    pub async fn teardown(&self, network: RunningNetwork) -> Result<()> {
        let mut errors = Vec::new();

        for service in network.iter().rev() {
            tracing::debug!("Removing service {} ({})", service.id, service.handle);
            let ports: Vec<u16> = service.port_bindings.values().copied().collect();
            match self.runtime.stop_and_remove(&service.handle).await {
                Ok(()) => {
                    for &port in &ports {
                        self.ports.release(port);
                    }
                }
                Err(source) => {
                    tracing::warn!(
                        "Failed to remove service {}, keeping host ports {:?} leased: {}",
                        service.id,
                        ports,
                        source
                    );
                    errors.push(Error::ContainerTeardownFailed {
                        service: service.id,
                        ports,
                        source,
                    });
                }
            }
        }

        tracing::info!("Tore down {} service(s)", network.len());

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Multiple(errors)),
        }
    }
}

impl std::fmt::Debug for NetworkOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkOrchestrator")
            .field("ports", &self.ports)
            .field("hostname_prefix", &self.hostname_prefix)
            .finish_non_exhaustive()
    }
}
