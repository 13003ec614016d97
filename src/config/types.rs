use super::parse_duration_string;
use crate::error::{Error, Result};
use crate::healthcheck::ReadinessPolicy;
use crate::service::LivenessProbe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level config file: network-wide settings plus services by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub network: NetworkSettings,

    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Prefix for container names
    #[serde(default = "default_name")]
    pub name: String,

    /// Service `n` gets hostname `<hostname_prefix>-<n>`
    #[serde(default = "default_hostname_prefix")]
    pub hostname_prefix: String,

    /// Optional user-defined docker network to attach containers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_network: Option<String>,

    /// Host address port bindings attach to
    #[serde(default = "default_host_ip")]
    pub host_ip: String,

    #[serde(default)]
    pub port_range: PortRange,

    #[serde(default)]
    pub readiness: ReadinessSettings,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            hostname_prefix: default_hostname_prefix(),
            docker_network: None,
            host_ip: default_host_ip(),
            port_range: PortRange::default(),
            readiness: ReadinessSettings::default(),
        }
    }
}

fn default_name() -> String {
    "testnet".to_string()
}

fn default_hostname_prefix() -> String {
    crate::orchestrator::DEFAULT_HOSTNAME_PREFIX.to_string()
}

fn default_host_ip() -> String {
    crate::docker::DEFAULT_HOST_IP.to_string()
}

/// Inclusive range of host ports leased to containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl Default for PortRange {
    fn default() -> Self {
        Self {
            start: 20000,
            end: 20999,
        }
    }
}

impl PortRange {
    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            usize::from(self.end - self.start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessSettings {
    #[serde(default = "default_retries")]
    pub retries: usize,

    /// Delay before the second probe, e.g. "1s"; doubles per attempt
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Per-probe timeout, e.g. "5s"
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            interval: default_interval(),
            timeout: default_timeout(),
        }
    }
}

fn default_retries() -> usize {
    30
}

fn default_interval() -> String {
    "1s".to_string()
}

fn default_timeout() -> String {
    "5s".to_string()
}

impl ReadinessSettings {
    pub fn policy(&self) -> Result<ReadinessPolicy> {
        let parse = |field: &str, value: &str| {
            parse_duration_string(value).ok_or_else(|| {
                Error::Validation(format!(
                    "network.readiness.{} has invalid duration '{}'. Use formats like '5s', '1m', '500ms'",
                    field, value
                ))
            })
        };

        Ok(ReadinessPolicy {
            retries: self.retries,
            interval: parse("interval", &self.interval)?,
            timeout: parse("timeout", &self.timeout)?,
        })
    }
}

/// One service as declared in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub image: String,

    /// Container-internal JSON-RPC port
    pub rpc_port: u16,

    /// Further container-internal ports to publish
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<u16>,

    pub liveness: LivenessProbe,

    /// Start command tokens; each may contain `{{placeholders}}`
    pub command: Vec<String>,

    /// Format of one entry in `{{dependencies}}`, default `{{address}}:{{port}}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_format: Option<String>,

    /// Separator between `{{dependencies}}` entries, default `,`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_separator: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ServiceConfig {
    /// Number of host ports this service leases.
    pub fn port_count(&self) -> usize {
        let mut ports = vec![self.rpc_port];
        for &port in &self.ports {
            if !ports.contains(&port) {
                ports.push(port);
            }
        }
        ports.len()
    }
}
