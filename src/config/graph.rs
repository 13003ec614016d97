use super::NetworkConfig;
use crate::dependency::{declaration_order, ServiceGraph, ServiceGraphBuilder};
use crate::error::{Error, Result};
use crate::service::{ServiceId, TemplateService};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A graph built from a config, with the id assigned to each service name.
#[derive(Debug, Clone)]
pub struct NamedGraph {
    pub graph: ServiceGraph,
    pub ids: BTreeMap<String, ServiceId>,
}

impl NamedGraph {
    /// Config name of a service id.
    pub fn name_of(&self, id: ServiceId) -> Option<&str> {
        self.ids
            .iter()
            .find(|(_, &candidate)| candidate == id)
            .map(|(name, _)| name.as_str())
    }

    pub fn id_of(&self, name: &str) -> Option<ServiceId> {
        self.ids.get(name).copied()
    }
}

impl NetworkConfig {
    /// Register every service with a [`ServiceGraphBuilder`] in dependency
    /// order and build the graph.
    pub fn build_graph(&self) -> Result<NamedGraph> {
        let depends_on: BTreeMap<String, Vec<String>> = self
            .services
            .iter()
            .map(|(name, service)| (name.clone(), service.depends_on.clone()))
            .collect();

        let mut builder = ServiceGraphBuilder::new();
        let mut ids: BTreeMap<String, ServiceId> = BTreeMap::new();

        for name in declaration_order(&depends_on)? {
            let service = self
                .services
                .get(&name)
                .ok_or_else(|| Error::Config(format!("Service '{}' vanished from config", name)))?;

            let dependencies = service
                .depends_on
                .iter()
                .map(|dep| {
                    ids.get(dep).copied().ok_or_else(|| {
                        Error::Validation(format!(
                            "Service '{}' depends on undeclared service '{}'",
                            name, dep
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let definition = Arc::new(TemplateService::from_config(name.clone(), service));
            let id = builder.add_service(definition, dependencies)?;
            tracing::debug!("Service '{}' registered as {}", name, id);
            ids.insert(name, id);
        }

        Ok(NamedGraph {
            graph: builder.build(),
            ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Parser;

    #[test]
    fn test_build_graph_orders_dependencies_first() {
        let yaml = r#"
services:
  zeta:
    image: geth
    rpc_port: 8545
    liveness: { method: net_version }
    command: [geth]
  alpha:
    image: geth
    rpc_port: 8545
    liveness: { method: net_version }
    command: [geth]
    depends_on: [zeta]
  beta:
    image: geth
    rpc_port: 8545
    liveness: { method: net_version }
    command: [geth]
    depends_on: [zeta]
"#;
        let named = Parser::new().parse_config(yaml).unwrap().build_graph().unwrap();

        let zeta = named.id_of("zeta").unwrap();
        let alpha = named.id_of("alpha").unwrap();
        let beta = named.id_of("beta").unwrap();

        assert_eq!(named.graph.start_order(), &[zeta, alpha, beta]);
        assert_eq!(named.graph.dependencies(alpha).unwrap().len(), 1);
        assert!(named.graph.terminal_service_ids().contains(&alpha));
        assert!(named.graph.terminal_service_ids().contains(&beta));
        assert!(!named.graph.terminal_service_ids().contains(&zeta));
        assert_eq!(named.name_of(beta), Some("beta"));
    }
}
