use super::{Endpoint, LivenessProbe, ServiceIdentity};
use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;

/// Capability describing how to run one logical service in a container.
///
/// Definitions are owned by the caller and shared read-only with every graph
/// built from them, so implementations must be `Send + Sync`.
pub trait ServiceDefinition: Send + Sync + fmt::Debug {
    /// Image reference passed to the container runtime.
    fn image(&self) -> &str;

    /// Container-internal JSON-RPC port. Dependents reach the service on this port.
    fn primary_port(&self) -> u16;

    /// Further container-internal ports that need a host binding.
    fn additional_ports(&self) -> &[u16];

    /// Probe dependents (and the readiness checker) use to detect liveness.
    fn liveness_probe(&self) -> LivenessProbe;

    /// Render the container start command.
    ///
    /// `dependencies` maps every dependency's endpoint to its liveness probe,
    /// so the container's own bootstrap can wait on them before declaring
    /// itself live.
    fn render_start_command(
        &self,
        identity: &ServiceIdentity,
        dependencies: &BTreeMap<Endpoint, LivenessProbe>,
    ) -> Result<Vec<String>>;

    /// Primary port followed by the additional ports, duplicates removed.
    fn container_ports(&self) -> Vec<u16> {
        let mut ports = vec![self.primary_port()];
        for &port in self.additional_ports() {
            if !ports.contains(&port) {
                ports.push(port);
            }
        }
        ports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed;

    impl ServiceDefinition for Fixed {
        fn image(&self) -> &str {
            "example/node"
        }

        fn primary_port(&self) -> u16 {
            9650
        }

        fn additional_ports(&self) -> &[u16] {
            &[9651, 9650, 9652]
        }

        fn liveness_probe(&self) -> LivenessProbe {
            LivenessProbe::new("health", serde_json::Value::Null)
        }

        fn render_start_command(
            &self,
            _identity: &ServiceIdentity,
            _dependencies: &BTreeMap<Endpoint, LivenessProbe>,
        ) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_container_ports_primary_first_without_duplicates() {
        assert_eq!(Fixed.container_ports(), vec![9650, 9651, 9652]);
    }
}
