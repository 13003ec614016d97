use crate::service::{ServiceDefinition, ServiceId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Immutable snapshot produced by [`ServiceGraphBuilder::build`](super::ServiceGraphBuilder::build).
///
/// Invariants (established by the builder):
/// - every id in a dependency set is a registered service
/// - `start_order` lists each service after all of its dependencies
/// - a service is terminal iff no dependency set contains it
#[derive(Debug, Clone)]
pub struct ServiceGraph {
    definitions: BTreeMap<ServiceId, Arc<dyn ServiceDefinition>>,
    dependencies: BTreeMap<ServiceId, BTreeSet<ServiceId>>,
    start_order: Vec<ServiceId>,
    terminal: BTreeSet<ServiceId>,
}

impl ServiceGraph {
    pub(super) fn new(
        definitions: BTreeMap<ServiceId, Arc<dyn ServiceDefinition>>,
        dependencies: BTreeMap<ServiceId, BTreeSet<ServiceId>>,
        start_order: Vec<ServiceId>,
        terminal: BTreeSet<ServiceId>,
    ) -> Self {
        Self {
            definitions,
            dependencies,
            start_order,
            terminal,
        }
    }

    pub fn definition(&self, id: ServiceId) -> Option<&Arc<dyn ServiceDefinition>> {
        self.definitions.get(&id)
    }

    /// Direct dependencies of a service.
    pub fn dependencies(&self, id: ServiceId) -> Option<&BTreeSet<ServiceId>> {
        self.dependencies.get(&id)
    }

    /// Services that list `id` as a direct dependency.
    pub fn dependents(&self, id: ServiceId) -> Vec<ServiceId> {
        self.dependencies
            .iter()
            .filter(|(_, deps)| deps.contains(&id))
            .map(|(&dependent, _)| dependent)
            .collect()
    }

    /// Topological start order (dependencies first).
    pub fn start_order(&self) -> &[ServiceId] {
        &self.start_order
    }

    /// Services no other service depends on.
    pub fn terminal_service_ids(&self) -> &BTreeSet<ServiceId> {
        &self.terminal
    }

    pub fn definitions(&self) -> impl Iterator<Item = (ServiceId, &Arc<dyn ServiceDefinition>)> {
        self.definitions.iter().map(|(&id, def)| (id, def))
    }

    pub fn contains(&self, id: ServiceId) -> bool {
        self.definitions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.start_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_order.is_empty()
    }

    /// Group services by dependency depth.
    ///
    /// Every service in wave `n` depends only on services in waves `< n`, so a
    /// wave could be started concurrently. The orchestrator still starts
    /// services one at a time; this is informational.
    pub fn start_waves(&self) -> Vec<Vec<ServiceId>> {
        let mut depth: BTreeMap<ServiceId, usize> = BTreeMap::new();
        let mut waves: Vec<Vec<ServiceId>> = Vec::new();

        // start_order is topological, so every dependency's depth is known here
        for &id in &self.start_order {
            let level = self
                .dependencies
                .get(&id)
                .into_iter()
                .flatten()
                .filter_map(|dep| depth.get(dep))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(id, level);

            if waves.len() <= level {
                waves.resize_with(level + 1, Vec::new);
            }
            waves[level].push(id);
        }

        waves
    }
}
