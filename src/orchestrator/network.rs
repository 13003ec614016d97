use crate::error::{Error, Result};
use crate::runtime::ContainerHandle;
use crate::service::{Endpoint, LivenessProbe, ServiceId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A service whose container the runtime confirmed as started.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunningService {
    pub id: ServiceId,
    pub hostname: String,
    /// Address other containers reach this service on
    pub address: String,
    /// Container-internal JSON-RPC port
    pub primary_port: u16,
    /// Container-internal port -> leased host port
    pub port_bindings: BTreeMap<u16, u16>,
    pub liveness_probe: LivenessProbe,
    pub handle: ContainerHandle,
}

impl RunningService {
    /// Endpoint dependents use to reach this service.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.address.clone(), self.primary_port)
    }

    /// Host port bound to a container-internal port.
    pub fn host_port(&self, internal: u16) -> Option<u16> {
        self.port_bindings.get(&internal).copied()
    }

    /// Host port bound to the primary port.
    pub fn primary_host_port(&self) -> Option<u16> {
        self.host_port(self.primary_port)
    }
}

/// Services started from one [`ServiceGraph`](crate::ServiceGraph).
///
/// A network returned by a successful `create_and_run` covers every service
/// of its graph; the one inside [`Error::ServiceStartFailed`] covers the
/// services started before the failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunningNetwork {
    services: BTreeMap<ServiceId, RunningService>,
    start_order: Vec<ServiceId>,
    terminal: BTreeSet<ServiceId>,
}

impl RunningNetwork {
    pub(crate) fn new(terminal: BTreeSet<ServiceId>) -> Self {
        Self {
            services: BTreeMap::new(),
            start_order: Vec::new(),
            terminal,
        }
    }

    pub(crate) fn insert(&mut self, service: RunningService) {
        self.start_order.push(service.id);
        self.services.insert(service.id, service);
    }

    pub fn get(&self, id: ServiceId) -> Result<&RunningService> {
        self.services.get(&id).ok_or(Error::ServiceNotFound(id))
    }

    /// Terminal services of the source graph. The network is ready once each
    /// of these passes its own liveness probe.
    pub fn terminal_service_ids(&self) -> &BTreeSet<ServiceId> {
        &self.terminal
    }

    /// Ids in the order their containers were started.
    pub fn start_order(&self) -> &[ServiceId] {
        &self.start_order
    }

    /// Running services in start order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &RunningService> {
        self.start_order
            .iter()
            .filter_map(|id| self.services.get(id))
    }

    pub fn contains(&self, id: ServiceId) -> bool {
        self.services.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Every host port leased for this network.
    pub fn leased_host_ports(&self) -> Vec<u16> {
        self.iter()
            .flat_map(|service| service.port_bindings.values().copied())
            .collect()
    }
}
