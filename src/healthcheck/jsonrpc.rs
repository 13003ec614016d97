use super::LivenessChecker;
use crate::error::Result;
use crate::service::LivenessProbe;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

/// Global shared HTTP client for liveness probes.
///
/// One pooled client serves every checker. Individual requests apply their own
/// timeout, so the client's timeout is only a fallback.
static SHARED_HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

fn shared_client() -> &'static Client {
    SHARED_HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            })
    })
}

/// Sends a service's [`LivenessProbe`] as a JSON-RPC 2.0 request.
///
/// A probe passes on a 2xx reply whose JSON body carries no `error` member.
/// Connection failures and timeouts count as "not live yet".
pub struct JsonRpcChecker {
    url: String,
    body: serde_json::Value,
    client: Client,
    timeout: Duration,
}

impl JsonRpcChecker {
    pub fn new(url: impl Into<String>, probe: &LivenessProbe, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            body: probe.request_body(1),
            client: shared_client().clone(),
            timeout,
        }
    }

    /// Checker for a JSON-RPC port published on the local host.
    pub fn local(host_port: u16, probe: &LivenessProbe, timeout: Duration) -> Self {
        Self::new(format!("http://127.0.0.1:{}", host_port), probe, timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LivenessChecker for JsonRpcChecker {
    async fn check(&self) -> Result<bool> {
        let response = match self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&self.body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Probe to {} not answered: {}", self.url, e);
                return Ok(false);
            }
        };

        if !response.status().is_success() {
            return Ok(false);
        }

        match response.json::<serde_json::Value>().await {
            Ok(reply) => Ok(reply.get("error").map_or(true, serde_json::Value::is_null)),
            Err(_) => Ok(false),
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
