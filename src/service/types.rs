use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle for a logical service within one graph.
///
/// Ids are assigned sequentially from 0 by
/// [`ServiceGraphBuilder`](crate::dependency::ServiceGraphBuilder) and stay stable
/// for the lifetime of any network started from that graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(usize);

impl ServiceId {
    pub(crate) fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Position of this service in registration order.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address and container-internal port a dependent uses to reach a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Identity handed to a definition when its start command is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub id: ServiceId,
    pub hostname: String,
}

/// Service-specific readiness descriptor: a JSON-RPC request that succeeds once
/// the service is live.
///
/// The orchestrator forwards probes to dependents untouched; only the readiness
/// checker in [`crate::healthcheck`] ever sends one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessProbe {
    pub method: String,
    #[serde(default = "default_params")]
    pub params: serde_json::Value,
}

fn default_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl LivenessProbe {
    pub fn new(method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// JSON-RPC 2.0 request body for this probe.
    pub fn request_body(&self, request_id: u64) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": request_id,
            "method": self.method,
            "params": self.params,
        })
    }
}
