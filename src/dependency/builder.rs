use super::ServiceGraph;
use crate::error::{Error, Result};
use crate::service::{ServiceDefinition, ServiceId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Accumulates service definitions and their dependency sets.
///
/// A dependency must already be registered when a service declaring it is
/// added. A service can therefore only depend on services added before it,
/// which rules out cycles and makes registration order a valid start order.
///
/// The builder is owned by a single caller; it is not meant for concurrent mutation.
#[derive(Debug, Default)]
pub struct ServiceGraphBuilder {
    definitions: BTreeMap<ServiceId, Arc<dyn ServiceDefinition>>,
    /// `dependencies[A] = {B, C}` means A needs B and C started first
    dependencies: BTreeMap<ServiceId, BTreeSet<ServiceId>>,
    start_order: Vec<ServiceId>,
    /// Services nothing depends on (yet); the network is ready once all of these are live
    terminal: BTreeSet<ServiceId>,
    next_id: usize,
}

impl ServiceGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service and return its id.
    ///
    /// Pass an empty iterator for a service without dependencies. Fails with
    /// [`Error::InvalidDependency`] if any dependency is not registered; a
    /// rejected call leaves the builder untouched and does not consume an id.
    pub fn add_service<I>(
        &mut self,
        definition: Arc<dyn ServiceDefinition>,
        dependencies: I,
    ) -> Result<ServiceId>
    where
        I: IntoIterator<Item = ServiceId>,
    {
        let dependencies: BTreeSet<ServiceId> = dependencies.into_iter().collect();
        if let Some(&missing) = dependencies
            .iter()
            .find(|id| !self.definitions.contains_key(id))
        {
            return Err(Error::InvalidDependency {
                dependency: missing,
            });
        }

        let id = ServiceId::new(self.next_id);
        self.next_id += 1;

        self.terminal.insert(id);
        for dependency in &dependencies {
            // Safe even if an earlier service already removed it
            self.terminal.remove(dependency);
        }

        tracing::debug!(
            "Registered service {} ({}) with dependencies {:?}",
            id,
            definition.image(),
            dependencies
        );

        self.definitions.insert(id, definition);
        self.dependencies.insert(id, dependencies);
        self.start_order.push(id);
        Ok(id)
    }

    /// Snapshot the accumulated state into an immutable graph.
    ///
    /// Every call copies the builder's collections, so later `add_service`
    /// calls never show up in a graph that was already built.
    pub fn build(&self) -> ServiceGraph {
        ServiceGraph::new(
            self.definitions.clone(),
            self.dependencies.clone(),
            self.start_order.clone(),
            self.terminal.clone(),
        )
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.start_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_order.is_empty()
    }

    pub fn contains(&self, id: ServiceId) -> bool {
        self.definitions.contains_key(&id)
    }
}
