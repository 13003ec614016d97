//! Docker-backed container runtime.
//!
//! [`DockerClient`] wraps every `docker` subprocess with a timeout and maps
//! failures to [`RuntimeError`]; [`DockerRuntime`] turns a [`ContainerSpec`]
//! into a `docker run` invocation.

pub mod client;

pub use client::DockerClient;

use crate::config::NetworkSettings;
use crate::runtime::{ContainerHandle, ContainerRuntime, ContainerSpec, RuntimeError};
use async_trait::async_trait;
use std::time::Duration;

// Docker operation timeouts
const DOCKER_START_TIMEOUT: Duration = Duration::from_secs(60);
const DOCKER_INSPECT_TIMEOUT: Duration = Duration::from_secs(10);
const DOCKER_STOP_TIMEOUT: Duration = Duration::from_secs(30);
const DOCKER_STOP_GRACE_SECS: u32 = 5;

/// Label marking every container started by this crate.
pub const MANAGED_LABEL: &str = "io.testnet.managed=true";

/// Default host address port bindings attach to.
pub const DEFAULT_HOST_IP: &str = "0.0.0.0";

/// [`ContainerRuntime`] backed by the docker CLI.
///
/// Every instance draws a random run id that goes into its container names,
/// so two runs from the same settings never address each other's containers.
/// Launching never removes an existing container; a name clash is reported as
/// a launch failure.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    client: DockerClient,
    /// Prefix for container names and the value of the network label
    name_prefix: String,
    run_id: String,
    docker_network: Option<String>,
    host_ip: String,
}

impl DockerRuntime {
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            client: DockerClient::new(),
            name_prefix: name_prefix.into(),
            run_id: format!("{:08x}", rand::random::<u32>()),
            docker_network: None,
            host_ip: DEFAULT_HOST_IP.to_string(),
        }
    }

    pub fn from_settings(settings: &NetworkSettings) -> Self {
        let mut runtime = Self::new(settings.name.clone()).with_host_ip(settings.host_ip.clone());
        if let Some(ref network) = settings.docker_network {
            runtime = runtime.with_network(network.clone());
        }
        runtime
    }

    /// Attach containers to a user-defined docker network.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.docker_network = Some(network.into());
        self
    }

    pub fn with_host_ip(mut self, host_ip: impl Into<String>) -> Self {
        self.host_ip = host_ip.into();
        self
    }

    /// Replace the random run id.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Id shared by every container this runtime starts, also set as the
    /// `io.testnet.run` label.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Container name: `<prefix>-<run id>-<hostname>`, sanitized for Docker.
    pub fn container_name(&self, hostname: &str) -> String {
        format!(
            "{}-{}-{}",
            sanitize_container_name_component(&self.name_prefix),
            sanitize_container_name_component(&self.run_id),
            sanitize_container_name_component(hostname)
        )
    }

    /// Arguments after `docker` for starting `spec` detached.
    pub fn run_args(&self, spec: &ContainerSpec) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.container_name(&spec.hostname),
            "--hostname".to_string(),
            spec.hostname.clone(),
            "--label".to_string(),
            MANAGED_LABEL.to_string(),
            "--label".to_string(),
            format!("io.testnet.network={}", self.name_prefix),
            "--label".to_string(),
            format!("io.testnet.run={}", self.run_id),
        ];

        if let Some(ref network) = self.docker_network {
            args.push("--network".to_string());
            args.push(network.clone());
        }

        for port in &spec.exposed_ports {
            args.push("--expose".to_string());
            args.push(format!("{}/tcp", port));
        }

        for (internal, host) in &spec.port_bindings {
            args.push("-p".to_string());
            args.push(format!("{}:{}:{}/tcp", self.host_ip, host, internal));
        }

        args.push(spec.image.clone());
        args.extend(spec.command.iter().cloned());
        args
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn create_and_start(
        &self,
        spec: &ContainerSpec,
    ) -> Result<ContainerHandle, RuntimeError> {
        let name = self.container_name(&spec.hostname);
        let id = self
            .client
            .run_detached(&self.run_args(spec), DOCKER_START_TIMEOUT)
            .await?;
        tracing::debug!("Started container {} ({}) from {}", name, id, spec.image);
        Ok(ContainerHandle::new(id))
    }

    async fn inspect(&self, handle: &ContainerHandle) -> Result<String, RuntimeError> {
        self.client
            .inspect_address(handle.as_str(), DOCKER_INSPECT_TIMEOUT)
            .await
    }

    async fn stop_and_remove(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        let stopped = self
            .client
            .stop_and_remove(handle.as_str(), DOCKER_STOP_GRACE_SECS, DOCKER_STOP_TIMEOUT)
            .await?;
        if !stopped {
            tracing::debug!("Container {} was not running before removal", handle);
        }
        Ok(())
    }
}

/// Sanitize a string for use in Docker container names.
///
/// Docker container names must match `[a-zA-Z0-9][a-zA-Z0-9_.-]*`. Invalid
/// characters become underscores, the result is capped at 32 characters, and a
/// non-alphanumeric first character is replaced with `x`.
pub(crate) fn sanitize_container_name_component(input: &str) -> String {
    const MAX_COMPONENT_LEN: usize = 32;

    let sanitized: String = input
        .chars()
        .take(MAX_COMPONENT_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        return "unnamed".to_string();
    }

    // All chars are ASCII after the map, so byte offset 1 is a char boundary
    if sanitized.starts_with(|c: char| !c.is_ascii_alphanumeric()) {
        format!("x{}", &sanitized[1..])
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn spec() -> ContainerSpec {
        ContainerSpec {
            hostname: "node-1".to_string(),
            image: "avaplatform/avalanchego:v1.10.0".to_string(),
            exposed_ports: vec![9650, 9651],
            port_bindings: BTreeMap::from([(9650, 20001), (9651, 20002)]),
            command: vec!["/avalanchego".to_string(), "--http-host=node-1".to_string()],
        }
    }

    #[test]
    fn test_run_args_layout() {
        let runtime = DockerRuntime::new("local net").with_run_id("0a1b2c3d");
        let args = runtime.run_args(&spec());

        assert_eq!(&args[..4], &["run", "-d", "--name", "local_net-0a1b2c3d-node-1"]);
        assert!(args.windows(2).any(|w| w == ["--label", "io.testnet.run=0a1b2c3d"]));
        assert!(args.windows(2).any(|w| w == ["--hostname", "node-1"]));
        assert!(args.windows(2).any(|w| w == ["--expose", "9651/tcp"]));
        assert!(args.windows(2).any(|w| w == ["-p", "0.0.0.0:20001:9650/tcp"]));
        assert!(!args.contains(&"--network".to_string()));

        // Image followed by the command tokens, in order
        let image_at = args
            .iter()
            .position(|a| a == "avaplatform/avalanchego:v1.10.0")
            .unwrap();
        assert_eq!(&args[image_at + 1..], &["/avalanchego", "--http-host=node-1"]);
    }

    #[test]
    fn test_run_args_with_network_and_host_ip() {
        let runtime = DockerRuntime::new("t")
            .with_network("testnet-bridge")
            .with_host_ip("127.0.0.1");
        let args = runtime.run_args(&spec());

        assert!(args.windows(2).any(|w| w == ["--network", "testnet-bridge"]));
        assert!(args.windows(2).any(|w| w == ["-p", "127.0.0.1:20002:9651/tcp"]));
    }

    #[test]
    fn test_runs_from_the_same_settings_get_distinct_names() {
        let first = DockerRuntime::new("testnet");
        let second = DockerRuntime::new("testnet");
        assert_ne!(first.run_id(), second.run_id());
        assert_ne!(first.container_name("service-0"), second.container_name("service-0"));
        assert_ne!(first.run_args(&spec())[3], second.run_args(&spec())[3]);

        // A clone drives the same run
        assert_eq!(first.clone().container_name("service-0"), first.container_name("service-0"));
    }

    #[test]
    fn test_sanitize_container_name() {
        assert_eq!(sanitize_container_name_component("my-service"), "my-service");
        assert_eq!(sanitize_container_name_component("my service!"), "my_service_");
        assert_eq!(sanitize_container_name_component("-leading"), "xleading");
        assert_eq!(sanitize_container_name_component(""), "unnamed");
        assert_eq!(sanitize_container_name_component(&"a".repeat(50)).len(), 32);
    }
}
