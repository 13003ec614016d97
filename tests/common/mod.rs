//! Test doubles shared by the integration tests. No Docker daemon required.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use testnet::{
    ContainerHandle, ContainerRuntime, ContainerSpec, Endpoint, Error, LivenessProbe, Result,
    RuntimeError, ServiceDefinition, ServiceIdentity,
};

#[derive(Default)]
struct FakeState {
    /// Every spec passed to `create_and_start`, including rejected ones
    attempts: Vec<ContainerSpec>,
    addresses: BTreeMap<ContainerHandle, String>,
    running: BTreeSet<ContainerHandle>,
    removed: Vec<ContainerHandle>,
}

/// In-memory container runtime.
///
/// The n-th successful launch gets handle `fake-n` and address `10.0.0.n`.
#[derive(Default)]
pub struct FakeRuntime {
    state: Mutex<FakeState>,
    fail_launch_at: Option<usize>,
    fail_inspect_at: Option<usize>,
    fail_remove: BTreeSet<String>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `attempt`-th launch (1-based).
    pub fn failing_launch(attempt: usize) -> Self {
        Self {
            fail_launch_at: Some(attempt),
            ..Self::default()
        }
    }

    /// Launch every container but fail to inspect the `attempt`-th one.
    pub fn failing_inspect(attempt: usize) -> Self {
        Self {
            fail_inspect_at: Some(attempt),
            ..Self::default()
        }
    }

    /// Fail `stop_and_remove` for the given handles.
    pub fn failing_remove(handles: &[&str]) -> Self {
        Self {
            fail_remove: handles.iter().map(|h| h.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> Vec<ContainerSpec> {
        self.state.lock().attempts.clone()
    }

    pub fn removed(&self) -> Vec<ContainerHandle> {
        self.state.lock().removed.clone()
    }

    pub fn running(&self) -> BTreeSet<ContainerHandle> {
        self.state.lock().running.clone()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn create_and_start(
        &self,
        spec: &ContainerSpec,
    ) -> std::result::Result<ContainerHandle, RuntimeError> {
        let mut state = self.state.lock();
        state.attempts.push(spec.clone());
        let attempt = state.attempts.len();

        if self.fail_launch_at == Some(attempt) {
            return Err(RuntimeError::rejected(format!(
                "image {} not found",
                spec.image
            )));
        }

        let handle = ContainerHandle::new(format!("fake-{}", attempt));
        state
            .addresses
            .insert(handle.clone(), format!("10.0.0.{}", attempt));
        state.running.insert(handle.clone());
        Ok(handle)
    }

    async fn inspect(&self, handle: &ContainerHandle) -> std::result::Result<String, RuntimeError> {
        let state = self.state.lock();
        if self.fail_inspect_at == Some(state.attempts.len()) {
            return Err(RuntimeError::NoAddress {
                container: handle.to_string(),
            });
        }
        state
            .addresses
            .get(handle)
            .cloned()
            .ok_or_else(|| RuntimeError::ContainerNotFound {
                container: handle.to_string(),
            })
    }

    async fn stop_and_remove(
        &self,
        handle: &ContainerHandle,
    ) -> std::result::Result<(), RuntimeError> {
        let mut state = self.state.lock();
        if self.fail_remove.contains(handle.as_str()) {
            return Err(RuntimeError::rejected("device or resource busy"));
        }
        state.running.remove(handle);
        state.removed.push(handle.clone());
        Ok(())
    }
}

/// Service definition that records the dependency map it is rendered with.
#[derive(Debug)]
pub struct RecordingService {
    pub image: String,
    pub primary_port: u16,
    pub additional_ports: Vec<u16>,
    pub probe_method: String,
    pub fail_render: bool,
    pub seen: Mutex<Vec<BTreeMap<Endpoint, LivenessProbe>>>,
}

impl RecordingService {
    pub fn new(image: &str, primary_port: u16) -> Arc<Self> {
        Arc::new(Self::build(image, primary_port))
    }

    pub fn with_ports(image: &str, primary_port: u16, additional_ports: &[u16]) -> Arc<Self> {
        Arc::new(Self {
            additional_ports: additional_ports.to_vec(),
            ..Self::build(image, primary_port)
        })
    }

    pub fn failing_render(image: &str, primary_port: u16) -> Arc<Self> {
        Arc::new(Self {
            fail_render: true,
            ..Self::build(image, primary_port)
        })
    }

    fn build(image: &str, primary_port: u16) -> Self {
        Self {
            image: image.to_string(),
            primary_port,
            additional_ports: Vec::new(),
            probe_method: format!("{}.ping", image),
            fail_render: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Dependency map of the last render.
    pub fn last_seen(&self) -> Option<BTreeMap<Endpoint, LivenessProbe>> {
        self.seen.lock().last().cloned()
    }
}

impl ServiceDefinition for RecordingService {
    fn image(&self) -> &str {
        &self.image
    }

    fn primary_port(&self) -> u16 {
        self.primary_port
    }

    fn additional_ports(&self) -> &[u16] {
        &self.additional_ports
    }

    fn liveness_probe(&self) -> LivenessProbe {
        LivenessProbe::new(self.probe_method.clone(), serde_json::json!([]))
    }

    fn render_start_command(
        &self,
        identity: &ServiceIdentity,
        dependencies: &BTreeMap<Endpoint, LivenessProbe>,
    ) -> Result<Vec<String>> {
        self.seen.lock().push(dependencies.clone());
        if self.fail_render {
            return Err(Error::CommandRender {
                service: identity.id,
                reason: "template broken".to_string(),
            });
        }

        let mut command = vec![format!("--hostname={}", identity.hostname)];
        command.extend(dependencies.keys().map(|e| format!("--peer={}", e)));
        Ok(command)
    }
}
