use super::NetworkConfig;
use crate::dependency::declaration_order;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashSet};

impl NetworkConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.services.is_empty() {
            return Err(Error::Validation(
                "No services declared. Add at least one entry under 'services'".to_string(),
            ));
        }

        let range = self.network.port_range;
        if range.start == 0 {
            return Err(Error::Validation(
                "network.port_range.start must be greater than 0".to_string(),
            ));
        }
        if range.start > range.end {
            return Err(Error::Validation(format!(
                "network.port_range start {} is after end {}",
                range.start, range.end
            )));
        }

        if self.network.hostname_prefix.trim().is_empty() {
            return Err(Error::Validation(
                "network.hostname_prefix must not be empty".to_string(),
            ));
        }

        self.network.readiness.policy()?;

        for (name, service) in &self.services {
            if service.image.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "Service '{}' has an empty image",
                    name
                )));
            }
            if service.command.is_empty() {
                return Err(Error::Validation(format!(
                    "Service '{}' has an empty command",
                    name
                )));
            }
            if service.liveness.method.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "Service '{}' has a liveness probe without a method",
                    name
                )));
            }
            if service.rpc_port == 0 || service.ports.contains(&0) {
                return Err(Error::Validation(format!(
                    "Service '{}' uses container port 0",
                    name
                )));
            }

            let mut seen = HashSet::new();
            for port in &service.ports {
                if !seen.insert(port) {
                    return Err(Error::Validation(format!(
                        "Service '{}' lists container port {} more than once",
                        name, port
                    )));
                }
            }

            if service.depends_on.iter().any(|dep| dep == name) {
                return Err(Error::Validation(format!(
                    "Service '{}' depends on itself",
                    name
                )));
            }
        }

        // Undeclared dependencies and cycles
        let depends_on: BTreeMap<String, Vec<String>> = self
            .services
            .iter()
            .map(|(name, service)| (name.clone(), service.depends_on.clone()))
            .collect();
        declaration_order(&depends_on)?;

        let needed: usize = self.services.values().map(|s| s.port_count()).sum();
        if needed > range.len() {
            tracing::warn!(
                "network.port_range {}-{} holds {} port(s) but the services need {}; starting will run out of ports",
                range.start,
                range.end,
                range.len(),
                needed
            );
        }

        Ok(())
    }
}
